//! Searcher trait defining the interface for video search operations.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ServiceError;

/// API-assigned qualitative bucket for a clip match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// A scored, time-bounded segment of a video.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    pub score: f64,
    pub confidence: Confidence,
}

/// All clips of one video matching a query, in API order.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMatch {
    pub video_id: String,
    pub clips: Vec<Clip>,
}

/// One entry of a search page.
///
/// The API returns either grouped-by-video entries or flat clip matches
/// depending on `group_by`; both are accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchItem {
    GroupedByVideo(VideoMatch),
    Flat { video_id: String, clip: Clip },
}

impl SearchItem {
    pub fn video_id(&self) -> &str {
        match self {
            SearchItem::GroupedByVideo(m) => &m.video_id,
            SearchItem::Flat { video_id, .. } => video_id,
        }
    }
}

/// Result of one search query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// Matches in ranked order
    pub items: Vec<SearchItem>,
    /// Total matches reported by the API, when provided
    pub total_results: Option<u64>,
    /// Index the search ran against, when echoed back
    pub index_id: Option<String>,
}

/// Search modalities sent as `search_options`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Visual,
    Audio,
}

impl Modality {
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Visual => "visual",
            Modality::Audio => "audio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Video,
    Clip,
}

impl GroupBy {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupBy::Video => "video",
            GroupBy::Clip => "clip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    High,
    Medium,
    Low,
}

impl Threshold {
    pub fn as_str(self) -> &'static str {
        match self {
            Threshold::High => "high",
            Threshold::Medium => "medium",
            Threshold::Low => "low",
        }
    }
}

/// How multiple modalities are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Or,
    And,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Or => "or",
            Operator::And => "and",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOption {
    Score,
    ClipCount,
}

impl SortOption {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::Score => "score",
            SortOption::ClipCount => "clip_count",
        }
    }
}

/// Query parameters sent with every search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub modalities: Vec<Modality>,
    pub group_by: GroupBy,
    pub threshold: Threshold,
    pub operator: Operator,
    pub page_limit: u32,
    pub sort: SortOption,
}

impl Default for SearchParams {
    /// visual+audio, grouped by video, medium threshold, OR, 5 per page, by score.
    fn default() -> Self {
        Self {
            modalities: vec![Modality::Visual, Modality::Audio],
            group_by: GroupBy::Video,
            threshold: Threshold::Medium,
            operator: Operator::Or,
            page_limit: 5,
            sort: SortOption::Score,
        }
    }
}

/// A single text-to-video search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query_text: String,
    pub params: SearchParams,
}

impl SearchRequest {
    pub fn new(query_text: impl Into<String>, params: SearchParams) -> Self {
        Self {
            query_text: query_text.into(),
            params,
        }
    }
}

/// Trait defining the interface for video search operations.
///
/// Implementations include:
/// - `MockSearcher` - Returns generated or scripted results for testing
/// - `TwelveLabsSearcher` - Real Twelve Labs API integration
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Run one text-to-video search against the configured index.
    ///
    /// # Returns
    /// One page of matches in the API's ranked order
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ServiceError>;

    /// Look up the playable HLS URL of a video.
    ///
    /// Returns `Ok(None)` when the video exists but carries no stream URL.
    async fn video_url(&self, video_id: &str) -> Result<Option<String>, ServiceError>;

    /// Get the index identifier searches run against.
    fn index_id(&self) -> &str;

    /// Check if the searcher is ready to handle requests.
    fn is_ready(&self) -> bool;
}
