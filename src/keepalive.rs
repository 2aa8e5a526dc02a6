//! Periodic self-ping that keeps an idle deployment from being put to sleep.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::metrics;

/// GETs a fixed URL on a fixed interval. Shares nothing with the search path.
#[derive(Debug, Clone)]
pub struct KeepAlive {
    client: reqwest::Client,
    url: String,
    interval: Duration,
}

impl KeepAlive {
    /// Create a pinger for `url`; every request is bounded by `timeout`.
    pub fn new(url: impl Into<String>, interval: Duration, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Internal(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            interval,
        })
    }

    /// Send one ping. Any HTTP response counts as success.
    pub async fn ping(&self) -> Result<u16, ServiceError> {
        info!(
            at = %chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            url = %self.url,
            "Keep-alive ping executed"
        );
        metrics::increment_keepalive_pings();

        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                info!(status, "Successfully pinged the app");
                Ok(status)
            }
            Err(e) => {
                metrics::increment_keepalive_errors();
                warn!(error = %e, "Keep-alive ping failed");
                Err(ServiceError::Internal(format!("Keep-alive ping failed: {}", e)))
            }
        }
    }

    /// Ping forever on the configured interval, first ping one interval from now.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(
            url = %self.url,
            interval_secs = self.interval.as_secs(),
            "Starting keep-alive task"
        );

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // Failures are logged inside ping; the loop keeps going
                let _ = self.ping().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_ping_hits_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let keepalive = KeepAlive::new(
            format!("{}/", server.uri()),
            Duration::from_secs(600),
            Duration::from_secs(10),
        )
        .unwrap();

        assert_eq!(keepalive.ping().await.unwrap(), 200);
    }

    #[tokio::test]
    async fn test_error_status_still_counts_as_ping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let keepalive =
            KeepAlive::new(server.uri(), Duration::from_secs(600), Duration::from_secs(10)).unwrap();

        assert_eq!(keepalive.ping().await.unwrap(), 503);
    }

    #[tokio::test]
    async fn test_ping_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let keepalive = KeepAlive::new(
            server.uri(),
            Duration::from_secs(600),
            Duration::from_millis(100),
        )
        .unwrap();

        assert!(keepalive.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_spawned_task_pings_on_interval() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let keepalive = KeepAlive::new(
            server.uri(),
            Duration::from_millis(50),
            Duration::from_secs(1),
        )
        .unwrap();

        let handle = keepalive.spawn();
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.abort();

        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.len() >= 2);
    }
}
