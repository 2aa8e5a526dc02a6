//! Video search module: text-to-video queries against an indexed video pool.
//!
//! This module provides a `Searcher` trait and implementations:
//! - `MockSearcher` - Returns generated or scripted results for testing
//! - `TwelveLabsSearcher` - Real Twelve Labs API integration

mod mock;
mod searcher;
mod twelvelabs;

pub use mock::MockSearcher;
pub use searcher::{
    Clip, Confidence, GroupBy, Modality, Operator, SearchItem, SearchPage, SearchParams,
    SearchRequest, Searcher, SortOption, Threshold, VideoMatch,
};
pub use twelvelabs::{TwelveLabsSearcher, DEFAULT_BASE_URL};
