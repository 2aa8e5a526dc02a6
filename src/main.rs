//! Sports clip search service.
//!
//! Serves a small web UI where users pick sports categories; each category
//! prompt is sent as a text-to-video search to Twelve Labs and the matching
//! clips are rendered with playable streams.
//!
//! # Environment Variables
//! - `API_KEY` - Twelve Labs API key (required unless MOCK_SEARCH=true)
//! - `INDEX_ID` - Twelve Labs index id (required unless MOCK_SEARCH=true)
//! - `HTTP_PORT` - UI listen port (default: 8501)
//! - `METRICS_PORT` - Prometheus metrics port (default: 9090)
//! - `SELF_PING_URL` - Keep-alive target (default: unset)
//! - `BIND_ADDRESS` - UI bind address or `auto` (default: auto)
//! - `TIME_FORMAT` - Clip time display, `minutes` or `seconds` (default: minutes)
//! - `SESSION_IDLE_SECS` - Idle time before a session is dropped (default: 86400)
//! - `MOCK_SEARCH` - Use mock searcher for testing (default: false)
//! - `RUST_LOG` - Log level (default: info)

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sports_clip_search::config::Config;
use sports_clip_search::keepalive::KeepAlive;
use sports_clip_search::metrics;
use sports_clip_search::search::{MockSearcher, Searcher, TwelveLabsSearcher};
use sports_clip_search::web::{self, AppState};

/// Run healthcheck mode: query the local HTTP health endpoint.
/// Tries both IPv6 and IPv4 loopback for dual-stack support.
async fn run_healthcheck() -> anyhow::Result<()> {
    let port: u16 = std::env::var("HTTP_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8501);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    for host in ["[::1]", "127.0.0.1"] {
        let url = format!("http://{}:{}/health", host, port);
        match check_health(&client, &url).await {
            Ok(()) => {
                eprintln!("healthcheck: service is healthy (via {})", url);
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("healthcheck: {} failed: {}", url, e);
            }
        }
    }

    eprintln!("healthcheck: failed to connect via IPv4 or IPv6");
    std::process::exit(1);
}

async fn check_health(client: &reqwest::Client, url: &str) -> anyhow::Result<()> {
    let body: serde_json::Value = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if body["status"] == "serving" {
        Ok(())
    } else {
        anyhow::bail!("service not serving")
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing (use RUST_LOG env var to control log level)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Check if running in healthcheck mode
    let program_name = std::env::args()
        .next()
        .and_then(|path| std::path::Path::new(&path).file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_default();

    if program_name == "healthcheck" {
        return run_healthcheck().await;
    }

    info!("Starting sports clip search service");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        http_port = config.http_port,
        metrics_port = config.metrics_port,
        mock_search = config.mock_search,
        time_format = %config.time_format,
        keep_alive = config.self_ping_url.is_some(),
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = metrics::init_metrics()?;

    // Create searcher (mock or real based on config)
    let searcher: Arc<dyn Searcher> = if config.mock_search {
        info!("MOCK_SEARCH=true: Using mock searcher for testing");
        Arc::new(MockSearcher::new())
    } else {
        Arc::new(TwelveLabsSearcher::new(
            config.api_base_url.clone(),
            config.api_key.clone(),
            config.index_id.clone(),
        )?)
    };

    // Start metrics server in background
    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = metrics::start_metrics_server(metrics_port, metrics_handle).await {
            error!(error = %e, "Metrics server stopped");
        }
    });

    let keep_alive = match &config.self_ping_url {
        Some(url) => Some(
            KeepAlive::new(
                url.clone(),
                Duration::from_secs(config.keep_alive_interval_secs),
                Duration::from_secs(config.keep_alive_timeout_secs),
            )?
            .spawn(),
        ),
        None => {
            info!("SELF_PING_URL not set: keep-alive disabled");
            None
        }
    };

    let state = AppState::new(searcher, config.time_format);
    let sweeper = state.sessions.spawn_sweeper(
        Duration::from_secs(config.session_idle_secs),
        Duration::from_secs(60),
    );
    let app = web::router(state);
    let addr = config.http_bind_addr().await?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(addr = %addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    if let Some(handle) = keep_alive {
        handle.abort();
        info!("Keep-alive task stopped");
    }

    Ok(())
}
