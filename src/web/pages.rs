//! HTML rendering for the UI.
//!
//! Pages are assembled from strings; every piece of user or API text goes
//! through [`escape`].

use std::fmt::Write;

use crate::notice::Notice;
use crate::presenter::{PromptSection, ResultsView, VideoCard};

const TITLE: &str = "Olympics Classification";

const STYLE: &str = r#"
@import url('https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap');
body { font-family: 'Inter', sans-serif; background-color: #ffffff; color: #1a202c; max-width: 960px; margin: 0 auto; padding: 24px; }
.big-font { font-size: 48px; font-weight: 700; color: #667eea; text-align: center; margin-bottom: 8px; letter-spacing: -1px; }
.tagline { text-align: center; font-size: 18px; color: #4a5568; margin-bottom: 40px; }
.tabs { display: flex; gap: 30px; background-color: #f7fafc; padding: 10px 20px; border-radius: 15px; margin-bottom: 30px; }
.tabs a { padding: 15px 25px; border-radius: 12px; font-weight: 600; color: #4a5568; text-decoration: none; }
.tabs a.active { background-color: #667eea; color: white; }
.subheader { font-size: 28px; font-weight: 600; border-bottom: 3px solid #667eea; padding-bottom: 10px; display: inline-block; }
.category-header { font-size: 24px; font-weight: 600; color: #2d3748; background-color: #f7fafc; padding: 20px 25px; border-radius: 15px; margin: 30px 0 20px 0; border-left: 5px solid #667eea; }
.prompt-header { font-size: 20px; font-weight: 500; color: #2d3748; background-color: #f0fff4; padding: 15px 20px; border-radius: 12px; margin: 25px 0 15px 0; border-left: 4px solid #38a169; }
.video-card { border-radius: 20px; padding: 25px; margin-bottom: 20px; box-shadow: 0 8px 32px rgba(0, 0, 0, 0.08); border: 1px solid rgba(102, 126, 234, 0.1); }
.video-meta { font-size: 15px; color: #4a5568; background-color: #f7fafc; padding: 12px 16px; border-radius: 10px; margin: 8px 0; border-left: 3px solid #e2e8f0; }
.confidence-high { color: #38a169; font-weight: 700; background-color: rgba(56, 161, 105, 0.1); padding: 4px 8px; border-radius: 6px; }
.confidence-medium { color: #d69e2e; font-weight: 700; background-color: rgba(214, 158, 46, 0.1); padding: 4px 8px; border-radius: 6px; }
.confidence-low { color: #e53e3e; font-weight: 700; background-color: rgba(229, 62, 62, 0.1); padding: 4px 8px; border-radius: 6px; }
.player { width: 100%; border-radius: 10px; overflow: hidden; margin-bottom: 10px; position: relative; padding-top: 56.25%; }
.player video { position: absolute; top: 0; left: 0; width: 100%; height: 100%; object-fit: contain; }
.notice { padding: 12px 16px; border-radius: 10px; margin: 10px 0; }
.notice-info { background-color: #ebf8ff; color: #2b6cb0; }
.notice-success { background-color: #f0fff4; color: #276749; }
.notice-warning { background-color: #fffaf0; color: #c05621; }
.notice-error { background-color: #fff5f5; color: #c53030; }
label { font-weight: 600; font-size: 16px; display: block; margin: 12px 0 6px 0; }
select, input[type=text] { width: 100%; border-radius: 12px; border: 2px solid #e2e8f0; padding: 10px; box-sizing: border-box; }
button { width: 100%; background-color: #667eea; color: white; border: none; border-radius: 12px; padding: 15px 30px; font-weight: 600; font-size: 16px; margin-top: 16px; cursor: pointer; }
button:hover { background-color: #5a67d8; }
"#;

/// Which tab is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Search,
    AddCategory,
}

impl Tab {
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("custom") => Tab::AddCategory,
            _ => Tab::Search,
        }
    }
}

/// Everything needed to render the main page.
#[derive(Debug, Clone, Default)]
pub struct PageModel {
    pub category_names: Vec<String>,
    pub selected: Vec<String>,
    pub tab: Tab,
    pub notices: Vec<Notice>,
    pub results: Option<ResultsView>,
    /// Values echoed back into the custom-category form
    pub custom_name: String,
    pub custom_prompts: String,
}

/// Escape text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn shell(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{style}</style>\n\
         <script src=\"https://cdn.jsdelivr.net/npm/hls.js@latest\"></script>\n\
         </head>\n<body>\n\
         <p class=\"big-font\">{title}</p>\n\
         <p class=\"tagline\">Powered by Twelve Labs AI &bull; Discover Olympic moments with intelligent video search</p>\n\
         {body}\n</body>\n</html>\n",
        title = TITLE,
        style = STYLE,
        body = body,
    )
}

fn render_notice(out: &mut String, notice: &Notice) {
    let _ = write!(
        out,
        "<div class=\"notice {}\">{}</div>",
        notice.level.css_class(),
        escape(&notice.message)
    );
}

fn render_tabs(out: &mut String, tab: Tab) {
    let class = |t: Tab| if t == tab { " class=\"active\"" } else { "" };
    let _ = write!(
        out,
        "<nav class=\"tabs\"><a href=\"/\"{}>Search Videos</a><a href=\"/?tab=custom\"{}>Add Custom Class</a></nav>",
        class(Tab::Search),
        class(Tab::AddCategory)
    );
}

fn render_search_form(out: &mut String, model: &PageModel) {
    out.push_str("<p class=\"subheader\">Search Videos</p>");
    out.push_str("<form method=\"post\" action=\"/search\">");
    out.push_str("<label for=\"category\">Choose Olympic sports categories:</label>");
    let _ = write!(
        out,
        "<select id=\"category\" name=\"category\" multiple size=\"{}\" title=\"Select one or more categories to search for relevant video content\">",
        model.category_names.len().clamp(4, 12)
    );
    for name in &model.category_names {
        let selected = if model.selected.contains(name) { " selected" } else { "" };
        let _ = write!(
            out,
            "<option value=\"{0}\"{1}>{0}</option>",
            escape(name),
            selected
        );
    }
    out.push_str("</select><button type=\"submit\">Search Videos</button></form>");
}

fn render_custom_form(out: &mut String, model: &PageModel) {
    out.push_str("<p class=\"subheader\">Add Custom Class</p>");
    let _ = write!(
        out,
        "<form method=\"post\" action=\"/categories\">\
         <label for=\"name\">Enter custom class name</label>\
         <input type=\"text\" id=\"name\" name=\"name\" placeholder=\"e.g., WinterSports\" value=\"{}\">\
         <label for=\"prompts\">Enter custom class prompts (comma-separated)</label>\
         <input type=\"text\" id=\"prompts\" name=\"prompts\" placeholder=\"e.g., skiing, snowboarding, ice skating\" value=\"{}\">\
         <button type=\"submit\">Add Custom Class</button></form>",
        escape(&model.custom_name),
        escape(&model.custom_prompts)
    );
}

fn render_player(out: &mut String, key: &str, url: &str) {
    // The URL goes into a JS string literal; JSON encoding handles quoting.
    let src = serde_json::to_string(url).unwrap_or_else(|_| "\"\"".to_string());
    let _ = write!(
        out,
        "<div class=\"player\"><video id=\"video-{key}\" controls></video></div>\
         <script>(function() {{\
           var video = document.getElementById('video-{key}');\
           var videoSrc = {src};\
           if (Hls.isSupported()) {{\
             var hls = new Hls();\
             hls.loadSource(videoSrc);\
             hls.attachMedia(video);\
             hls.on(Hls.Events.MANIFEST_PARSED, function() {{ video.pause(); }});\
           }} else if (video.canPlayType('application/vnd.apple.mpegurl')) {{\
             video.src = videoSrc;\
             video.addEventListener('loadedmetadata', function() {{ video.pause(); }});\
           }}\
         }})();</script>",
        key = key,
        src = escape_script(&src),
    );
}

/// Keep `</script>` sequences out of inline scripts.
fn escape_script(js: &str) -> String {
    js.replace("</", "<\\/")
}

fn render_video(out: &mut String, video: &VideoCard) {
    let open = if video.ordinal == 1 { " open" } else { "" };
    let _ = write!(
        out,
        "<details{}><summary>Video {}: {}</summary><div class=\"video-card\">",
        open,
        video.ordinal,
        escape(&video.video_id)
    );
    for clip in &video.clips {
        let _ = write!(
            out,
            "<div class=\"video-meta\"><strong>Clip {}:</strong> {} - {} | \
             <strong>Score:</strong> {} | \
             <strong>Confidence:</strong> <span class=\"{}\">{}</span></div>",
            clip.ordinal,
            escape(&clip.start),
            escape(&clip.end),
            escape(&clip.score),
            clip.confidence_class(),
            clip.confidence.as_str()
        );
    }
    match &video.stream_url {
        Some(url) => render_player(out, &video.player_key, url),
        None => render_notice(
            out,
            &Notice::warning("Video URL not available. Unable to render video."),
        ),
    }
    out.push_str("</div></details>");
}

fn render_prompt(out: &mut String, prompt: &PromptSection) {
    let _ = write!(
        out,
        "<div class=\"prompt-header\">Results for: \"{}\"</div>",
        escape(&prompt.prompt)
    );
    for video in &prompt.videos {
        render_video(out, video);
    }
    if let Some(notice) = prompt.no_results_notice() {
        render_notice(out, &notice);
    }
}

/// Render the results view: summary first, then category and prompt sections.
pub fn render_results(view: &ResultsView) -> String {
    let mut out = String::new();
    render_notice(&mut out, &view.summary);
    for category in &view.categories {
        let _ = write!(
            out,
            "<div class=\"category-header\">{}</div>",
            escape(&category.name)
        );
        for prompt in &category.prompts {
            render_prompt(&mut out, prompt);
        }
    }
    out
}

/// Render the main page.
pub fn render_page(model: &PageModel) -> String {
    let mut body = String::new();
    render_tabs(&mut body, model.tab);
    for notice in &model.notices {
        render_notice(&mut body, notice);
    }
    match model.tab {
        Tab::Search => render_search_form(&mut body, model),
        Tab::AddCategory => render_custom_form(&mut body, model),
    }
    if let Some(results) = &model.results {
        body.push_str(&render_results(results));
    }
    shell(&body)
}

/// Generic error page for failures that escaped a handler.
pub fn error_page(message: &str) -> String {
    let mut body = String::new();
    render_notice(&mut body, &Notice::error(message));
    body.push_str("<p><a href=\"/\">Back to search</a></p>");
    shell(&body)
}
