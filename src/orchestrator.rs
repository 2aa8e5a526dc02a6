//! Search orchestration: one query per selected prompt, then stream URL
//! resolution for every video that came back.
//!
//! Calls run one after another. A failed prompt or lookup becomes a notice
//! and is left out of the results; the remaining calls still run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::catalog::PromptQuery;
use crate::metrics;
use crate::notice::Notice;
use crate::search::{SearchPage, SearchParams, SearchRequest, Searcher};

/// Results for one prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptResult {
    pub prompt: String,
    /// Category the prompt was resolved to
    pub category: String,
    pub page: SearchPage,
}

/// Everything one search pass produced.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Number of queries issued, failed ones included
    pub prompts_issued: usize,
    /// One entry per distinct prompt, in first-issued order
    pub results: Vec<PromptResult>,
    pub notices: Vec<Notice>,
}

impl SearchOutcome {
    /// Distinct video ids across all results, in first-seen order.
    pub fn unique_video_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.results
            .iter()
            .flat_map(|r| r.page.items.iter())
            .map(|item| item.video_id())
            .filter(|id| seen.insert(id.to_string()))
            .map(String::from)
            .collect()
    }
}

/// Stream URLs for the videos that resolved. Lives for one request.
#[derive(Debug, Clone, Default)]
pub struct VideoUrlMap {
    pub urls: HashMap<String, String>,
    pub notices: Vec<Notice>,
}

impl VideoUrlMap {
    pub fn get(&self, video_id: &str) -> Option<&str> {
        self.urls.get(video_id).map(String::as_str)
    }
}

/// Drives a [`Searcher`] through a batch of prompts.
pub struct SearchOrchestrator {
    searcher: Arc<dyn Searcher>,
    params: SearchParams,
}

impl SearchOrchestrator {
    /// Create an orchestrator using the default search parameters.
    pub fn new(searcher: Arc<dyn Searcher>) -> Self {
        Self {
            searcher,
            params: SearchParams::default(),
        }
    }

    /// Issue one search per query, in order.
    ///
    /// Every occurrence of a prompt is queried. Results are keyed by prompt
    /// text: a repeated prompt keeps its first position and takes the latest
    /// result.
    #[instrument(skip(self, queries), fields(prompts = queries.len()))]
    pub async fn search_all(&self, queries: &[PromptQuery]) -> SearchOutcome {
        let mut outcome = SearchOutcome {
            prompts_issued: queries.len(),
            ..Default::default()
        };

        for query in queries {
            let request = SearchRequest::new(query.prompt.clone(), self.params.clone());
            let start = Instant::now();

            metrics::increment_search_count();
            let result = self.searcher.search(&request).await;
            metrics::record_search_latency(start.elapsed().as_secs_f64() * 1000.0);

            match result {
                Ok(page) => {
                    info!(
                        prompt = %query.prompt,
                        category = %query.category,
                        items = page.items.len(),
                        total_results = ?page.total_results,
                        "Prompt search succeeded"
                    );
                    let entry = PromptResult {
                        prompt: query.prompt.clone(),
                        category: query.category.clone(),
                        page,
                    };
                    match outcome.results.iter_mut().find(|r| r.prompt == entry.prompt) {
                        Some(existing) => *existing = entry,
                        None => outcome.results.push(entry),
                    }
                }
                Err(e) => {
                    metrics::increment_search_errors();
                    warn!(prompt = %query.prompt, error = %e, "Prompt search failed");
                    outcome.notices.push(Notice::error(format!(
                        "API Error for prompt '{}': {}",
                        query.prompt, e
                    )));
                }
            }
        }

        outcome
    }

    /// Look up the stream URL of each video, one call per id.
    #[instrument(skip(self, video_ids), fields(videos = video_ids.len()))]
    pub async fn resolve_urls(&self, video_ids: &[String]) -> VideoUrlMap {
        let mut map = VideoUrlMap::default();

        for video_id in video_ids {
            metrics::increment_url_lookups();
            match self.searcher.video_url(video_id).await {
                Ok(Some(url)) => {
                    map.urls.insert(video_id.clone(), url);
                }
                Ok(None) => {
                    metrics::increment_url_lookup_errors();
                    warn!(video_id = %video_id, "Video has no stream URL");
                    map.notices.push(Notice::warning(format!(
                        "No video URL found for video ID: {}",
                        video_id
                    )));
                }
                Err(e) => {
                    metrics::increment_url_lookup_errors();
                    warn!(video_id = %video_id, error = %e, "Video URL lookup failed");
                    map.notices.push(Notice::error(format!(
                        "Failed to get data for video ID: {}. Error: {}",
                        video_id, e
                    )));
                }
            }
        }

        info!(
            requested = video_ids.len(),
            resolved = map.urls.len(),
            "Video URL resolution finished"
        );

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::notice::NoticeLevel;
    use crate::search::{Confidence, MockSearcher};

    fn selected(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_issued_prompts_match_selection() {
        let searcher = Arc::new(MockSearcher::new());
        let orchestrator = SearchOrchestrator::new(searcher.clone());
        let catalog = Catalog::with_custom(&[]);
        let queries = catalog.expand(&selected(&["CombatSports", "AquaticSports"]));

        let outcome = orchestrator.search_all(&queries).await;

        let expected: Vec<String> = queries.iter().map(|q| q.prompt.clone()).collect();
        assert_eq!(searcher.queries(), expected);
        assert_eq!(outcome.prompts_issued, 10);
        assert_eq!(outcome.results.len(), 10);
        assert!(outcome.notices.is_empty());
    }

    #[tokio::test]
    async fn test_failed_prompt_is_reported_and_skipped() {
        let searcher = Arc::new(MockSearcher::new().with_failure("diving event"));
        let orchestrator = SearchOrchestrator::new(searcher.clone());
        let queries = Catalog::with_custom(&[]).expand(&selected(&["AquaticSports"]));

        let outcome = orchestrator.search_all(&queries).await;

        // Later prompts still ran
        assert_eq!(searcher.queries().len(), 5);
        assert_eq!(outcome.prompts_issued, 5);
        assert_eq!(outcome.results.len(), 4);
        assert!(outcome.results.iter().all(|r| r.prompt != "diving event"));

        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].level, NoticeLevel::Error);
        assert!(outcome.notices[0]
            .message
            .starts_with("API Error for prompt 'diving event':"));
    }

    #[tokio::test]
    async fn test_duplicate_prompt_queried_twice_kept_once() {
        let searcher = Arc::new(MockSearcher::new());
        let orchestrator = SearchOrchestrator::new(searcher.clone());
        let queries = vec![
            PromptQuery {
                prompt: "judo competition".into(),
                category: "CombatSports".into(),
            },
            PromptQuery {
                prompt: "boxing match".into(),
                category: "CombatSports".into(),
            },
            PromptQuery {
                prompt: "judo competition".into(),
                category: "Custom".into(),
            },
        ];

        let outcome = orchestrator.search_all(&queries).await;

        assert_eq!(searcher.queries().len(), 3);
        assert_eq!(outcome.prompts_issued, 3);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].prompt, "judo competition");
        assert_eq!(outcome.results[0].category, "Custom");
    }

    #[tokio::test]
    async fn test_unique_video_ids_dedupes_in_order() {
        let searcher = Arc::new(
            MockSearcher::new()
                .with_response(
                    "a",
                    vec![
                        MockSearcher::grouped("v1", &[(0.0, 1.0, 90.0, Confidence::High)]),
                        MockSearcher::grouped("v2", &[(0.0, 1.0, 80.0, Confidence::Low)]),
                    ],
                )
                .with_response(
                    "b",
                    vec![MockSearcher::grouped("v2", &[(5.0, 6.0, 70.0, Confidence::Medium)])],
                ),
        );
        let orchestrator = SearchOrchestrator::new(searcher);
        let queries: Vec<PromptQuery> = ["a", "b"]
            .iter()
            .map(|p| PromptQuery {
                prompt: p.to_string(),
                category: "X".into(),
            })
            .collect();

        let outcome = orchestrator.search_all(&queries).await;
        assert_eq!(outcome.unique_video_ids(), vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn test_resolve_urls_is_best_effort() {
        let searcher = Arc::new(
            MockSearcher::new()
                .with_missing_url("v-missing")
                .with_lookup_failure("v-broken"),
        );
        let orchestrator = SearchOrchestrator::new(searcher);
        let ids = selected(&["v-ok", "v-missing", "v-broken"]);

        let map = orchestrator.resolve_urls(&ids).await;

        assert!(map.get("v-ok").is_some());
        assert!(map.get("v-missing").is_none());
        assert!(map.get("v-broken").is_none());
        assert_eq!(map.notices.len(), 2);
        assert_eq!(map.notices[0].level, NoticeLevel::Warning);
        assert_eq!(
            map.notices[0].message,
            "No video URL found for video ID: v-missing"
        );
        assert_eq!(map.notices[1].level, NoticeLevel::Error);
        assert!(map.notices[1]
            .message
            .starts_with("Failed to get data for video ID: v-broken. Error:"));
    }
}
