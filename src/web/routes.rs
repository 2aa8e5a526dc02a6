//! Axum router and request handlers for the UI.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::Form;
use serde::Deserialize;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::Category;
use crate::error::ServiceError;
use crate::notice::Notice;
use crate::orchestrator::SearchOrchestrator;
use crate::presenter::{present, TimeFormat};
use crate::search::Searcher;
use crate::session::{SessionState, SessionStore, SESSION_COOKIE};
use crate::web::pages::{self, PageModel, Tab};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<dyn Searcher>,
    pub sessions: SessionStore,
    pub time_format: TimeFormat,
}

impl AppState {
    pub fn new(searcher: Arc<dyn Searcher>, time_format: TimeFormat) -> Self {
        Self {
            searcher,
            sessions: SessionStore::new(),
            time_format,
        }
    }
}

/// Build the UI router.
pub fn router(state: AppState) -> Router {
    with_layers(
        Router::new()
            .route("/", get(index))
            .route("/search", post(search))
            .route("/categories", post(add_category))
            .route("/health", get(health))
            .route("/api/health", get(health))
            .with_state(state),
    )
}

fn with_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// A panicking handler still answers with the generic error page.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    ServiceError::Internal(detail).into_response()
}

fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn page_model(session: &SessionState, tab: Tab) -> PageModel {
    PageModel {
        category_names: session
            .catalog()
            .names()
            .into_iter()
            .map(String::from)
            .collect(),
        tab,
        ..Default::default()
    }
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    tab: Option<String>,
}

#[instrument(skip_all)]
async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<IndexQuery>,
) -> Response {
    // One-shot: the notice is cleared as it is read
    let (session, notice) = state
        .sessions
        .modify(session_id(&jar), |s| {
            let notice = s.take_notice();
            (s.clone(), notice)
        })
        .await
        .unwrap_or_default();

    let mut model = page_model(&session, Tab::from_query(query.tab.as_deref()));
    model.notices.extend(notice);

    Html(pages::render_page(&model)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    category: Vec<String>,
}

#[instrument(skip_all)]
async fn search(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SearchForm>,
) -> Result<Response, ServiceError> {
    if !state.searcher.is_ready() {
        return Err(ServiceError::NotReady);
    }

    let session = state
        .sessions
        .load(session_id(&jar))
        .await
        .unwrap_or_default();
    let mut model = page_model(&session, Tab::Search);
    model.selected = form.category.clone();

    if form.category.is_empty() {
        model
            .notices
            .push(Notice::warning("Please select at least one class."));
    } else {
        let catalog = session.catalog();
        let queries = catalog.expand(&form.category);
        info!(
            categories = ?form.category,
            prompts = queries.len(),
            "Starting category search"
        );

        let orchestrator = SearchOrchestrator::new(Arc::clone(&state.searcher));
        let outcome = orchestrator.search_all(&queries).await;
        let video_ids = outcome.unique_video_ids();
        let urls = orchestrator.resolve_urls(&video_ids).await;

        model.notices.extend(outcome.notices.iter().cloned());
        model.notices.extend(urls.notices.iter().cloned());
        model.results = Some(present(&outcome, &urls, state.time_format));
    }

    Ok(Html(pages::render_page(&model)).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    prompts: String,
}

#[instrument(skip_all)]
async fn add_category(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CategoryForm>,
) -> Response {
    match Category::from_form(&form.name, &form.prompts) {
        Ok(category) => {
            info!(
                name = %category.name,
                prompts = category.prompts.len(),
                "Custom category added"
            );
            let (id, ()) = state
                .sessions
                .upsert(session_id(&jar), |s| s.add_custom_category(category))
                .await;
            (jar.add(session_cookie(id)), Redirect::to("/")).into_response()
        }
        Err(e) => {
            let session = state
                .sessions
                .load(session_id(&jar))
                .await
                .unwrap_or_default();
            let mut model = page_model(&session, Tab::AddCategory);
            model.custom_name = form.name;
            model.custom_prompts = form.prompts;
            let message = match e {
                ServiceError::InvalidRequest(msg) => msg,
                other => other.to_string(),
            };
            model.notices.push(Notice::warning(message));
            Html(pages::render_page(&model)).into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = if state.searcher.is_ready() {
        "serving"
    } else {
        "not_serving"
    };

    Json(serde_json::json!({
        "status": status,
        "index_id": state.searcher.index_id(),
        "sessions": state.sessions.len().await,
    }))
}
