//! Result presentation: turns a search pass into a view model for the page.
//!
//! Sections are grouped by category, then prompt, in the order results came
//! in. Only grouped-by-video matches are displayed; at most three videos per
//! prompt and three clips per video.

use std::fmt;
use std::str::FromStr;

use crate::notice::Notice;
use crate::orchestrator::{SearchOutcome, VideoUrlMap};
use crate::search::{Clip, Confidence, SearchItem};

pub const MAX_VIDEOS_PER_PROMPT: usize = 3;
pub const MAX_CLIPS_PER_VIDEO: usize = 3;

/// How clip offsets are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeFormat {
    /// `m:ss`, truncated to whole seconds
    #[default]
    MinuteSecond,
    /// `12.50s`
    FractionalSeconds,
}

impl TimeFormat {
    pub fn format(self, seconds: f64) -> String {
        match self {
            TimeFormat::MinuteSecond => {
                let total = seconds.max(0.0).trunc() as u64;
                format!("{}:{:02}", total / 60, total % 60)
            }
            TimeFormat::FractionalSeconds => format!("{:.2}s", seconds),
        }
    }
}

impl FromStr for TimeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minutes" | "mm:ss" | "minute_second" => Ok(TimeFormat::MinuteSecond),
            "seconds" | "fractional" => Ok(TimeFormat::FractionalSeconds),
            other => Err(format!("unknown time format '{}'", other)),
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormat::MinuteSecond => write!(f, "minutes"),
            TimeFormat::FractionalSeconds => write!(f, "seconds"),
        }
    }
}

/// Display tier for a clip, taken straight from the API's confidence value.
pub fn confidence_class(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "confidence-high",
        Confidence::Medium => "confidence-medium",
        Confidence::Low => "confidence-low",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipLine {
    /// 1-based position within the video card
    pub ordinal: usize,
    pub start: String,
    pub end: String,
    /// Score with one decimal
    pub score: String,
    pub confidence: Confidence,
}

impl ClipLine {
    fn new(ordinal: usize, clip: &Clip, format: TimeFormat) -> Self {
        Self {
            ordinal,
            start: format.format(clip.start),
            end: format.format(clip.end),
            score: format!("{:.1}", clip.score),
            confidence: clip.confidence,
        }
    }

    pub fn confidence_class(&self) -> &'static str {
        confidence_class(self.confidence)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoCard {
    pub ordinal: usize,
    pub video_id: String,
    pub clips: Vec<ClipLine>,
    /// Present only when the URL lookup succeeded
    pub stream_url: Option<String>,
    /// DOM-safe identifier for the player element
    pub player_key: String,
}

impl VideoCard {
    pub fn is_playable(&self) -> bool {
        self.stream_url.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptSection {
    pub prompt: String,
    /// Empty means the prompt is shown with a "no videos" indicator
    pub videos: Vec<VideoCard>,
}

impl PromptSection {
    pub fn no_results_notice(&self) -> Option<Notice> {
        self.videos
            .is_empty()
            .then(|| Notice::info(format!("No videos found for prompt: {}", self.prompt)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySection {
    pub name: String,
    pub prompts: Vec<PromptSection>,
}

/// Everything the results view needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub summary: Notice,
    pub unique_videos: usize,
    pub categories: Vec<CategorySection>,
}

/// ASCII-only HTML id for a player.
///
/// The readable prefix may collide (case folding, non-ASCII prompts); the
/// trailing `seq` is unique within one results view.
fn player_key(category: &str, prompt: &str, seq: usize) -> String {
    let mut key: String = format!("{}-{}", category, prompt)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    key.push_str(&format!("-{}", seq));
    key
}

fn video_cards(
    category: &str,
    prompt: &str,
    items: &[SearchItem],
    urls: &VideoUrlMap,
    format: TimeFormat,
    next_player: &mut usize,
) -> Vec<VideoCard> {
    items
        .iter()
        .filter_map(|item| match item {
            SearchItem::GroupedByVideo(m) if !m.clips.is_empty() => Some(m),
            _ => None,
        })
        .take(MAX_VIDEOS_PER_PROMPT)
        .enumerate()
        .map(|(i, m)| {
            let seq = *next_player;
            *next_player += 1;
            VideoCard {
                ordinal: i + 1,
                video_id: m.video_id.clone(),
                clips: m
                    .clips
                    .iter()
                    .take(MAX_CLIPS_PER_VIDEO)
                    .enumerate()
                    .map(|(j, clip)| ClipLine::new(j + 1, clip, format))
                    .collect(),
                stream_url: urls.get(&m.video_id).map(String::from),
                player_key: player_key(category, prompt, seq),
            }
        })
        .collect()
}

/// Build the results view for one search pass.
pub fn present(outcome: &SearchOutcome, urls: &VideoUrlMap, format: TimeFormat) -> ResultsView {
    let unique_videos = outcome.unique_video_ids().len();

    if unique_videos == 0 {
        return ResultsView {
            summary: Notice::warning("No videos found matching your search criteria."),
            unique_videos,
            categories: Vec::new(),
        };
    }

    let mut categories: Vec<CategorySection> = Vec::new();
    let mut next_player = 0;
    for result in &outcome.results {
        let section = PromptSection {
            prompt: result.prompt.clone(),
            videos: video_cards(
                &result.category,
                &result.prompt,
                &result.page.items,
                urls,
                format,
                &mut next_player,
            ),
        };

        match categories.iter_mut().find(|c| c.name == result.category) {
            Some(existing) => existing.prompts.push(section),
            None => categories.push(CategorySection {
                name: result.category.clone(),
                prompts: vec![section],
            }),
        }
    }

    ResultsView {
        summary: Notice::success(format!(
            "Found {} unique videos across {} search prompts",
            unique_videos, outcome.prompts_issued
        )),
        unique_videos,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use crate::orchestrator::PromptResult;
    use crate::search::{MockSearcher, SearchPage};

    fn result(category: &str, prompt: &str, items: Vec<SearchItem>) -> PromptResult {
        PromptResult {
            prompt: prompt.into(),
            category: category.into(),
            page: SearchPage {
                items,
                ..Default::default()
            },
        }
    }

    fn urls(ids: &[&str]) -> VideoUrlMap {
        let mut map = VideoUrlMap::default();
        for id in ids {
            map.urls.insert(id.to_string(), format!("https://s/{}.m3u8", id));
        }
        map
    }

    fn clips(n: usize) -> Vec<(f64, f64, f64, Confidence)> {
        (0..n)
            .map(|i| (i as f64 * 10.0, i as f64 * 10.0 + 5.0, 90.0, Confidence::High))
            .collect()
    }

    #[test]
    fn test_minute_second_format() {
        let f = TimeFormat::MinuteSecond;
        assert_eq!(f.format(0.0), "0:00");
        assert_eq!(f.format(65.9), "1:05");
        assert_eq!(f.format(600.0), "10:00");
    }

    #[test]
    fn test_fractional_seconds_format() {
        let f = TimeFormat::FractionalSeconds;
        assert_eq!(f.format(12.5), "12.50s");
        assert_eq!(f.format(0.0), "0.00s");
    }

    #[test]
    fn test_time_format_parse() {
        assert_eq!("minutes".parse::<TimeFormat>(), Ok(TimeFormat::MinuteSecond));
        assert_eq!("SECONDS".parse::<TimeFormat>(), Ok(TimeFormat::FractionalSeconds));
        assert!("hours".parse::<TimeFormat>().is_err());
    }

    #[test]
    fn test_confidence_class_ignores_score() {
        let high_low_score = Clip {
            start: 0.0,
            end: 1.0,
            score: 1.0,
            confidence: Confidence::High,
        };
        let low_high_score = Clip {
            start: 0.0,
            end: 1.0,
            score: 99.0,
            confidence: Confidence::Low,
        };
        let a = ClipLine::new(1, &high_low_score, TimeFormat::default());
        let b = ClipLine::new(1, &low_high_score, TimeFormat::default());
        assert_eq!(a.confidence_class(), "confidence-high");
        assert_eq!(b.confidence_class(), "confidence-low");
        assert_eq!(confidence_class(Confidence::Medium), "confidence-medium");
    }

    #[test]
    fn test_no_videos_gives_warning() {
        let outcome = SearchOutcome {
            prompts_issued: 2,
            results: vec![result("A", "p1", vec![]), result("A", "p2", vec![])],
            notices: vec![],
        };
        let view = present(&outcome, &VideoUrlMap::default(), TimeFormat::default());

        assert_eq!(view.summary.level, NoticeLevel::Warning);
        assert_eq!(
            view.summary.message,
            "No videos found matching your search criteria."
        );
        assert!(view.categories.is_empty());
    }

    #[test]
    fn test_grouping_and_summary() {
        let outcome = SearchOutcome {
            prompts_issued: 4,
            results: vec![
                result("A", "p1", vec![MockSearcher::grouped("v1", &clips(1))]),
                result("B", "p2", vec![MockSearcher::grouped("v2", &clips(1))]),
                result("A", "p3", vec![MockSearcher::grouped("v1", &clips(2))]),
            ],
            notices: vec![],
        };
        let view = present(&outcome, &urls(&["v1", "v2"]), TimeFormat::default());

        assert_eq!(view.summary.level, NoticeLevel::Success);
        assert_eq!(
            view.summary.message,
            "Found 2 unique videos across 4 search prompts"
        );
        let names: Vec<&str> = view.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        let a_prompts: Vec<&str> = view.categories[0]
            .prompts
            .iter()
            .map(|p| p.prompt.as_str())
            .collect();
        assert_eq!(a_prompts, vec!["p1", "p3"]);
    }

    #[test]
    fn test_caps_videos_and_clips() {
        let items: Vec<SearchItem> = (0..5)
            .map(|i| MockSearcher::grouped(&format!("v{}", i), &clips(5)))
            .collect();
        let outcome = SearchOutcome {
            prompts_issued: 1,
            results: vec![result("A", "p", items)],
            notices: vec![],
        };
        let view = present(&outcome, &urls(&[]), TimeFormat::default());

        let videos = &view.categories[0].prompts[0].videos;
        assert_eq!(videos.len(), MAX_VIDEOS_PER_PROMPT);
        assert!(videos.iter().all(|v| v.clips.len() == MAX_CLIPS_PER_VIDEO));
        assert_eq!(videos[2].ordinal, 3);
        assert_eq!(videos[0].clips[1].start, "0:10");
        assert_eq!(videos[0].clips[1].score, "90.0");
    }

    #[test]
    fn test_prompt_without_videos_has_indicator() {
        let flat = SearchItem::Flat {
            video_id: "flat-1".into(),
            clip: Clip {
                start: 0.0,
                end: 1.0,
                score: 50.0,
                confidence: Confidence::Medium,
            },
        };
        let outcome = SearchOutcome {
            prompts_issued: 3,
            results: vec![
                result("A", "hit", vec![MockSearcher::grouped("v1", &clips(1))]),
                result("A", "empty", vec![]),
                // Flat and clip-less entries are not displayed
                result("A", "odd", vec![flat, MockSearcher::grouped("v9", &[])]),
            ],
            notices: vec![],
        };
        let view = present(&outcome, &urls(&["v1"]), TimeFormat::default());

        let prompts = &view.categories[0].prompts;
        assert!(prompts[0].no_results_notice().is_none());
        let notice = prompts[1].no_results_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(notice.message, "No videos found for prompt: empty");
        assert!(prompts[2].no_results_notice().is_some());
        // Flat and clip-less videos still count towards the summary
        assert_eq!(view.unique_videos, 3);
    }

    #[test]
    fn test_unresolved_video_is_not_playable() {
        let outcome = SearchOutcome {
            prompts_issued: 1,
            results: vec![result(
                "A",
                "p",
                vec![
                    MockSearcher::grouped("v-ok", &clips(1)),
                    MockSearcher::grouped("v-missing", &clips(1)),
                ],
            )],
            notices: vec![],
        };
        let view = present(&outcome, &urls(&["v-ok"]), TimeFormat::default());

        let videos = &view.categories[0].prompts[0].videos;
        assert!(videos[0].is_playable());
        assert!(!videos[1].is_playable());
        assert!(videos[1].stream_url.is_none());
    }

    #[test]
    fn test_player_key_is_dom_safe() {
        assert_eq!(
            player_key("TeamSports", "football (soccer) match", 0),
            "teamsports-football--soccer--match-0"
        );
    }

    #[test]
    fn test_player_keys_unique_for_colliding_prompts() {
        let outcome = SearchOutcome {
            prompts_issued: 3,
            results: vec![
                result("Winter", "滑雪", vec![MockSearcher::grouped("v1", &[(1.0, 2.0, 80.0, Confidence::High)])]),
                result("Winter", "滑冰", vec![MockSearcher::grouped("v2", &[(1.0, 2.0, 80.0, Confidence::High)])]),
                result("Winter", "Ski", vec![MockSearcher::grouped("v3", &[(1.0, 2.0, 80.0, Confidence::High)])]),
                result("Winter", "ski", vec![MockSearcher::grouped("v4", &[(1.0, 2.0, 80.0, Confidence::High)])]),
            ],
            notices: Vec::new(),
        };
        let view = present(&outcome, &urls(&["v1", "v2", "v3", "v4"]), TimeFormat::default());

        let keys: Vec<&str> = view.categories[0]
            .prompts
            .iter()
            .flat_map(|p| p.videos.iter().map(|v| v.player_key.as_str()))
            .collect();
        assert_eq!(keys.len(), 4);
        let distinct: std::collections::HashSet<&str> = keys.iter().copied().collect();
        assert_eq!(distinct.len(), 4);
        assert!(keys.iter().all(|k| k.is_ascii()));
    }
}
