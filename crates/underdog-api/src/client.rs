//! API-Football transport.
//!
//! `FootballApi` is the seam between the core and the network. The HTTP
//! implementation rate-limits every request through one shared
//! `RateLimiter` and maps the provider envelope into domain types.

use crate::error::{ApiError, ApiResult};
use crate::rate_limiter::RateLimiter;
use crate::wire;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use underdog_core::{MatchId, MatchSnapshot, OddsQuote};
use underdog_telemetry::Metrics;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Football data provider.
pub trait FootballApi: Send + Sync {
    /// All fixtures currently in play (`/fixtures?live=all`).
    fn live_fixtures(&self) -> BoxFuture<'_, ApiResult<Vec<MatchSnapshot>>>;

    /// Fixtures scheduled on a date (`/fixtures?date=YYYY-MM-DD`).
    fn fixtures_by_date(&self, date: NaiveDate) -> BoxFuture<'_, ApiResult<Vec<MatchSnapshot>>>;

    /// Match Winner odds for a fixture. An empty quote means the bookmaker
    /// has no prices.
    fn odds(&self, match_id: MatchId) -> BoxFuture<'_, ApiResult<OddsQuote>>;

    /// Connectivity check (`/timezone`). Returns the number of timezones.
    fn timezones(&self) -> BoxFuture<'_, ApiResult<usize>>;
}

/// Arc wrapper for FootballApi trait objects.
pub type DynFootballApi = Arc<dyn FootballApi>;

/// Connection settings for `HttpFootballApi`.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub bookmaker_id: u32,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, bookmaker_id: u32) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            bookmaker_id,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// reqwest-backed API-Football client.
pub struct HttpFootballApi {
    client: Client,
    base_url: String,
    api_key: String,
    bookmaker_id: u32,
    limiter: Arc<RateLimiter>,
}

impl HttpFootballApi {
    /// Create a new client sharing `limiter` with every other caller.
    pub fn new(config: ApiConfig, limiter: Arc<RateLimiter>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            bookmaker_id: config.bookmaker_id,
            limiter,
        })
    }

    /// GET an endpoint and return the envelope's `response` rows.
    ///
    /// Waits on the rate limiter first. Records one metrics sample per call.
    async fn get_rows(&self, endpoint: &'static str, query: &[(&str, String)]) -> ApiResult<Vec<Value>> {
        self.limiter.acquire().await;

        let result = self.fetch_rows(endpoint, query).await;
        match &result {
            Ok(rows) => {
                debug!(endpoint, rows = rows.len(), "API request succeeded");
                Metrics::api_request(endpoint, "ok");
            }
            Err(e) => {
                warn!(endpoint, error = %e, "API request failed");
                Metrics::api_request(endpoint, e.outcome());
            }
        }
        result
    }

    async fn fetch_rows(&self, endpoint: &str, query: &[(&str, String)]) -> ApiResult<Vec<Value>> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .header("x-apisports-key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(format!("Failed to parse response: {e}")))?;

        if let Some(message) = wire::provider_errors(&body) {
            return Err(ApiError::Provider(message));
        }

        wire::response_items(&body)
            .cloned()
            .ok_or_else(|| ApiError::Malformed("response is not an array".to_string()))
    }
}

impl FootballApi for HttpFootballApi {
    fn live_fixtures(&self) -> BoxFuture<'_, ApiResult<Vec<MatchSnapshot>>> {
        Box::pin(async move {
            let rows = self
                .get_rows("fixtures", &[("live", "all".to_string())])
                .await?;
            Ok(wire::parse_fixtures(&rows))
        })
    }

    fn fixtures_by_date(&self, date: NaiveDate) -> BoxFuture<'_, ApiResult<Vec<MatchSnapshot>>> {
        Box::pin(async move {
            let rows = self
                .get_rows("fixtures", &[("date", date.format("%Y-%m-%d").to_string())])
                .await?;
            Ok(wire::parse_fixtures(&rows))
        })
    }

    fn odds(&self, match_id: MatchId) -> BoxFuture<'_, ApiResult<OddsQuote>> {
        Box::pin(async move {
            let query = [
                ("fixture", match_id.to_string()),
                ("bookmaker", self.bookmaker_id.to_string()),
                ("bet", wire::MATCH_WINNER_BET_ID.to_string()),
            ];
            let rows = self.get_rows("odds", &query).await?;
            Ok(wire::parse_odds(match_id, &rows, Utc::now()))
        })
    }

    fn timezones(&self) -> BoxFuture<'_, ApiResult<usize>> {
        Box::pin(async move {
            let rows = self.get_rows("timezone", &[]).await?;
            Ok(rows.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ApiConfig::new("https://v3.football.api-sports.io/", "key", 8);
        let api = HttpFootballApi::new(config, Arc::new(RateLimiter::per_minute(10))).unwrap();
        assert_eq!(api.base_url, "https://v3.football.api-sports.io");
        assert_eq!(api.bookmaker_id, 8);
    }

    #[test]
    fn test_default_timeout() {
        let config = ApiConfig::new("http://localhost", "key", 8);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    // ========================================================================
    // Local HTTP stub
    // ========================================================================

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one canned response and hand back the raw request.
    async fn stub_server(status_line: &'static str, body: &'static str) -> (HttpFootballApi, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string());

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        let config = ApiConfig::new(format!("http://{addr}"), "test-key", 8);
        let api = HttpFootballApi::new(config, Arc::new(RateLimiter::per_minute(10))).unwrap();
        (api, rx)
    }

    #[tokio::test]
    async fn test_live_fixtures_sends_key_and_parses_rows() {
        let body = r#"{"errors":[],"response":[{"fixture":{"id":42,"status":{"short":"1H","elapsed":12}},"league":{"id":39},"teams":{"home":{"name":"Arsenal"},"away":{"name":"Luton"}},"goals":{"home":1,"away":null}}]}"#;
        let (api, request) = stub_server("200 OK", body).await;

        let fixtures = api.live_fixtures().await.unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].match_id, MatchId::new(42));
        assert_eq!(fixtures[0].away_score, 0);

        let request = request.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /fixtures?live=all "));
        assert!(request.contains("x-apisports-key: test-key"));
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_status_error() {
        let (api, _request) = stub_server("429 Too Many Requests", r#"{"message":"slow down"}"#).await;

        match api.live_fixtures().await {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("slow down"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_errors_map_to_provider_error() {
        let body = r#"{"errors":{"token":"Error/Missing application key."},"response":[]}"#;
        let (api, _request) = stub_server("200 OK", body).await;

        let err = api.timezones().await.unwrap_err();
        assert!(matches!(err, ApiError::Provider(ref msg) if msg.contains("Missing application key")));
        assert_eq!(err.outcome(), "provider_error");
    }

    #[tokio::test]
    async fn test_non_array_response_is_malformed() {
        let (api, _request) = stub_server("200 OK", r#"{"errors":[],"response":{"oops":true}}"#).await;

        let err = api.odds(MatchId::new(7)).await.unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let (api, _request) = stub_server("200 OK", "not json").await;

        let err = api.live_fixtures().await.unwrap_err();
        assert_eq!(err.outcome(), "malformed");
    }
}
