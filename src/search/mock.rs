//! Mock searcher implementation for running without the Twelve Labs API.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::info;

use super::searcher::{
    Clip, Confidence, SearchItem, SearchPage, SearchRequest, Searcher, VideoMatch,
};
use crate::error::ServiceError;

/// Sample video library the generated results draw from.
const SAMPLE_VIDEOS: &[&str] = &[
    "mock-olympics-0001",
    "mock-olympics-0002",
    "mock-olympics-0003",
    "mock-olympics-0004",
    "mock-olympics-0005",
    "mock-olympics-0006",
];

/// Mock searcher that returns deterministic results for testing.
///
/// Without scripting, every query yields two grouped matches drawn from a
/// small sample library, so overlapping videos show up across prompts. Tests
/// can script exact responses, failures and missing stream URLs per prompt or
/// video.
pub struct MockSearcher {
    index_id: String,
    responses: HashMap<String, Vec<SearchItem>>,
    failing_prompts: HashSet<String>,
    missing_urls: HashSet<String>,
    failing_lookups: HashSet<String>,
    queries: Mutex<Vec<String>>,
}

impl MockSearcher {
    /// Create a new mock searcher.
    pub fn new() -> Self {
        info!("Initializing MockSearcher with sample video library");
        Self {
            index_id: "mock-index".to_string(),
            responses: HashMap::new(),
            failing_prompts: HashSet::new(),
            missing_urls: HashSet::new(),
            failing_lookups: HashSet::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Return exactly `items` for `prompt`.
    pub fn with_response(mut self, prompt: &str, items: Vec<SearchItem>) -> Self {
        self.responses.insert(prompt.to_string(), items);
        self
    }

    /// Fail every search for `prompt`.
    pub fn with_failure(mut self, prompt: &str) -> Self {
        self.failing_prompts.insert(prompt.to_string());
        self
    }

    /// Report `video_id` as having no stream URL.
    pub fn with_missing_url(mut self, video_id: &str) -> Self {
        self.missing_urls.insert(video_id.to_string());
        self
    }

    /// Fail the URL lookup for `video_id`.
    pub fn with_lookup_failure(mut self, video_id: &str) -> Self {
        self.failing_lookups.insert(video_id.to_string());
        self
    }

    /// Query texts received so far, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    /// Build a grouped match with clips given as `(start, end, score, confidence)`.
    pub fn grouped(video_id: &str, clips: &[(f64, f64, f64, Confidence)]) -> SearchItem {
        SearchItem::GroupedByVideo(VideoMatch {
            video_id: video_id.to_string(),
            clips: clips
                .iter()
                .map(|&(start, end, score, confidence)| Clip {
                    start,
                    end,
                    score,
                    confidence,
                })
                .collect(),
        })
    }

    /// Generate results from the sample library based on the query text.
    fn generate_results(&self, query: &str, page_limit: u32) -> Vec<SearchItem> {
        let seed = query.bytes().map(usize::from).sum::<usize>();
        let count = (page_limit as usize).min(2);

        (0..count)
            .map(|i| {
                let video_id = SAMPLE_VIDEOS[(seed + i) % SAMPLE_VIDEOS.len()];
                let offset = ((seed + i * 37) % 240) as f64;
                let confidence = match (seed + i) % 3 {
                    0 => Confidence::High,
                    1 => Confidence::Medium,
                    _ => Confidence::Low,
                };
                Self::grouped(
                    video_id,
                    &[
                        (offset, offset + 8.5, 88.0 - i as f64 * 6.0, confidence),
                        (offset + 30.0, offset + 36.25, 71.5 - i as f64 * 6.0, Confidence::Low),
                    ],
                )
            })
            .collect()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Searcher for MockSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ServiceError> {
        let query = request.query_text.as_str();

        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }

        // Validate inputs
        if query.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("Query cannot be empty".into()));
        }

        if self.failing_prompts.contains(query) {
            return Err(ServiceError::Search(format!(
                "mock failure for '{}'",
                query
            )));
        }

        let items = match self.responses.get(query) {
            Some(items) => items.clone(),
            None => self.generate_results(query, request.params.page_limit),
        };

        info!(query = %query, items = items.len(), "Mock search completed");

        Ok(SearchPage {
            total_results: Some(items.len() as u64),
            index_id: Some(self.index_id.clone()),
            items,
        })
    }

    async fn video_url(&self, video_id: &str) -> Result<Option<String>, ServiceError> {
        if self.failing_lookups.contains(video_id) {
            return Err(ServiceError::VideoLookup(format!(
                "mock lookup failure for '{}'",
                video_id
            )));
        }

        if self.missing_urls.contains(video_id) {
            return Ok(None);
        }

        Ok(Some(format!(
            "https://stream.mock.invalid/{}/stream.m3u8",
            video_id
        )))
    }

    fn index_id(&self) -> &str {
        &self.index_id
    }

    fn is_ready(&self) -> bool {
        true
    }
}
