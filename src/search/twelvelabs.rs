//! Real searcher implementation backed by the Twelve Labs HTTP API.
//!
//! Search runs against `POST {base}/search` with a multipart form; stream URLs
//! come from `GET {base}/indexes/{index_id}/videos/{video_id}`.

use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::error::ServiceError;
use crate::search::searcher::{
    Clip, Confidence, SearchItem, SearchPage, SearchRequest, Searcher, VideoMatch,
};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.twelvelabs.io/v1.3";

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Deserialize)]
struct WireSearchResponse {
    #[serde(default)]
    data: Vec<WireItem>,
    #[serde(default)]
    page_info: Option<WirePageInfo>,
    #[serde(default)]
    search_pool: Option<WireSearchPool>,
}

#[derive(Debug, Deserialize)]
struct WirePageInfo {
    #[serde(default)]
    total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WireSearchPool {
    #[serde(default)]
    index_id: Option<String>,
    #[serde(default)]
    total_count: Option<u64>,
}

/// Grouped entries carry `id` + `clips`; flat entries carry `video_id`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireItem {
    Grouped { id: String, clips: Vec<WireClip> },
    Flat(WireFlatMatch),
}

#[derive(Debug, Deserialize)]
struct WireClip {
    start: f64,
    end: f64,
    #[serde(default)]
    score: f64,
    confidence: Confidence,
}

#[derive(Debug, Deserialize)]
struct WireFlatMatch {
    video_id: String,
    start: f64,
    end: f64,
    #[serde(default)]
    score: f64,
    confidence: Confidence,
}

impl From<WireClip> for Clip {
    fn from(c: WireClip) -> Self {
        Clip {
            start: c.start,
            end: c.end,
            score: c.score,
            confidence: c.confidence,
        }
    }
}

impl From<WireItem> for SearchItem {
    fn from(item: WireItem) -> Self {
        match item {
            WireItem::Grouped { id, clips } => SearchItem::GroupedByVideo(VideoMatch {
                video_id: id,
                clips: clips.into_iter().map(Clip::from).collect(),
            }),
            WireItem::Flat(m) => SearchItem::Flat {
                video_id: m.video_id,
                clip: Clip {
                    start: m.start,
                    end: m.end,
                    score: m.score,
                    confidence: m.confidence,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireVideo {
    #[serde(default)]
    hls: Option<WireHls>,
}

#[derive(Debug, Deserialize)]
struct WireHls {
    #[serde(default)]
    video_url: Option<String>,
}

/// Searcher that talks to the Twelve Labs API over HTTPS.
pub struct TwelveLabsSearcher {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    index_id: String,
}

impl std::fmt::Debug for TwelveLabsSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwelveLabsSearcher")
            .field("base_url", &self.base_url)
            .field("index_id", &self.index_id)
            .finish_non_exhaustive()
    }
}

impl TwelveLabsSearcher {
    /// Create a searcher for `index_id`.
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. [`DEFAULT_BASE_URL`]
    /// * `api_key` - Sent as the `x-api-key` header on every call
    /// * `index_id` - Index all searches and video lookups run against
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        index_id: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ServiceError::Internal(format!("HTTP client error: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let index_id = index_id.into();

        info!(base_url = %base_url, index_id = %index_id, "Twelve Labs searcher configured");

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            index_id,
        })
    }

    fn search_form(&self, request: &SearchRequest) -> Form {
        let params = &request.params;
        let mut form = Form::new()
            .text("index_id", self.index_id.clone())
            .text("query_text", request.query_text.clone());

        for modality in &params.modalities {
            form = form.text("search_options", modality.as_str());
        }

        form.text("group_by", params.group_by.as_str())
            .text("threshold", params.threshold.as_str())
            .text("operator", params.operator.as_str())
            .text("page_limit", params.page_limit.to_string())
            .text("sort_option", params.sort.as_str())
    }
}

#[async_trait]
impl Searcher for TwelveLabsSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ServiceError> {
        let start = Instant::now();

        if request.query_text.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("Query cannot be empty".into()));
        }

        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(self.search_form(request))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, query = %request.query_text, "Search request failed");
                ServiceError::Search(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, query = %request.query_text, "Search API returned an error");
            return Err(ServiceError::Search(format!("{}: {}", status, body)));
        }

        let wire: WireSearchResponse = response.json().await.map_err(|e| {
            error!(error = %e, query = %request.query_text, "Failed to decode search response");
            ServiceError::Decode(e.to_string())
        })?;

        let total_results = wire.page_info.as_ref().and_then(|p| p.total_results);
        let (index_id, pool_count) = match wire.search_pool {
            Some(pool) => (pool.index_id, pool.total_count),
            None => (None, None),
        };

        debug!(
            query = %request.query_text,
            total_results = ?total_results,
            index_id = ?index_id,
            pool_count = ?pool_count,
            "Search response received"
        );

        let items: Vec<SearchItem> = wire.data.into_iter().map(SearchItem::from).collect();

        info!(
            query = %request.query_text,
            items = items.len(),
            took_ms = start.elapsed().as_millis() as u64,
            "Twelve Labs search completed"
        );

        Ok(SearchPage {
            items,
            total_results,
            index_id,
        })
    }

    async fn video_url(&self, video_id: &str) -> Result<Option<String>, ServiceError> {
        let url = format!(
            "{}/indexes/{}/videos/{}",
            self.base_url, self.index_id, video_id
        );

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!(error = %e, video_id = %video_id, "Video lookup failed");
                ServiceError::VideoLookup(e.to_string())
            })?;

        let video: WireVideo = response.json().await.map_err(|e| {
            error!(error = %e, video_id = %video_id, "Failed to decode video response");
            ServiceError::VideoLookup(e.to_string())
        })?;

        Ok(video.hls.and_then(|h| h.video_url))
    }

    fn index_id(&self) -> &str {
        &self.index_id
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty() && !self.index_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::searcher::SearchParams;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn searcher(server: &MockServer) -> TwelveLabsSearcher {
        TwelveLabsSearcher::new(server.uri(), "test-key", "idx-1").unwrap()
    }

    fn request(text: &str) -> SearchRequest {
        SearchRequest::new(text, SearchParams::default())
    }

    #[tokio::test]
    async fn test_search_decodes_grouped_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "search_pool": {"index_id": "idx-1", "total_count": 12},
                "data": [
                    {"id": "vid-a", "clips": [
                        {"start": 12.0, "end": 20.5, "score": 84.3, "confidence": "high", "video_id": "vid-a"},
                        {"start": 40.0, "end": 45.0, "score": 70.1, "confidence": "medium", "video_id": "vid-a"}
                    ]},
                    {"id": "vid-b", "clips": []}
                ],
                "page_info": {"limit_per_page": 5, "total_results": 2}
            })))
            .mount(&server)
            .await;

        let page = searcher(&server)
            .search(&request("swimming competition"))
            .await
            .unwrap();

        assert_eq!(page.total_results, Some(2));
        assert_eq!(page.index_id.as_deref(), Some("idx-1"));
        assert_eq!(page.items.len(), 2);
        match &page.items[0] {
            SearchItem::GroupedByVideo(m) => {
                assert_eq!(m.video_id, "vid-a");
                assert_eq!(m.clips.len(), 2);
                assert_eq!(m.clips[0].confidence, Confidence::High);
                assert_eq!(m.clips[1].start, 40.0);
            }
            other => panic!("expected grouped item, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_decodes_flat_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"video_id": "vid-c", "start": 1.0, "end": 3.0, "score": 55.0, "confidence": "low"}
                ]
            })))
            .mount(&server)
            .await;

        let page = searcher(&server).search(&request("judo")).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert!(matches!(
            &page.items[0],
            SearchItem::Flat { video_id, clip } if video_id == "vid-c" && clip.confidence == Confidence::Low
        ));
    }

    #[tokio::test]
    async fn test_search_rejects_unknown_confidence() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "vid-a", "clips": [
                        {"start": 0.0, "end": 1.0, "score": 1.0, "confidence": "extreme"}
                    ]}
                ]
            })))
            .mount(&server)
            .await;

        let result = searcher(&server).search(&request("boxing match")).await;
        assert!(matches!(result, Err(ServiceError::Decode(_))));
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let result = searcher(&server).search(&request("tennis match")).await;
        match result {
            Err(ServiceError::Search(msg)) => assert!(msg.contains("rate limited")),
            other => panic!("expected search error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_query_error() {
        let server = MockServer::start().await;
        let result = searcher(&server).search(&request("  ")).await;
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_video_url_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/idx-1/videos/vid-a"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "vid-a",
                "hls": {"video_url": "https://cdn.example/vid-a.m3u8", "status": "COMPLETE"}
            })))
            .mount(&server)
            .await;

        let url = searcher(&server).video_url("vid-a").await.unwrap();
        assert_eq!(url.as_deref(), Some("https://cdn.example/vid-a.m3u8"));
    }

    #[tokio::test]
    async fn test_video_url_missing_hls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/idx-1/videos/vid-b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "vid-b"})))
            .mount(&server)
            .await;

        let url = searcher(&server).video_url("vid-b").await.unwrap();
        assert!(url.is_none());
    }

    #[tokio::test]
    async fn test_video_url_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/idx-1/videos/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = searcher(&server).video_url("gone").await;
        assert!(matches!(result, Err(ServiceError::VideoLookup(_))));
    }

    #[test]
    fn test_readiness_and_debug() {
        let s = TwelveLabsSearcher::new("https://api.example/v1.3/", "secret-key", "idx-9").unwrap();
        assert!(s.is_ready());
        assert_eq!(s.index_id(), "idx-9");

        let debug = format!("{:?}", s);
        assert!(debug.contains("https://api.example/v1.3"));
        assert!(!debug.contains("secret-key"));
    }
}
