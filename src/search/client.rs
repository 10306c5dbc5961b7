//! Search backend HTTP client
//!
//! POSTs the query body to `{url}/{index patterns}/_search` with basic
//! credentials. Certificate validation follows the configured trust policy.

use super::types::SearchResponse;
use super::SearchGateway;
use crate::query::SearchBody;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Search backend client
pub struct SearchClient {
    client: Client,
    config: SearchClientConfig,
}

/// Configuration for the search client
#[derive(Clone)]
pub struct SearchClientConfig {
    /// Backend base URLs, tried in order on connection failure
    pub urls: Vec<String>,
    pub username: String,
    pub password: String,
    /// Skip TLS certificate validation
    pub accept_invalid_certs: bool,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl std::fmt::Debug for SearchClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClientConfig")
            .field("urls", &self.urls)
            .field("username", &self.username)
            .field("password", &"***")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl Default for SearchClientConfig {
    fn default() -> Self {
        Self {
            urls: vec!["https://localhost:9200".to_string()],
            username: String::new(),
            password: String::new(),
            accept_invalid_certs: true,
            request_timeout_ms: 30_000,
        }
    }
}

impl SearchClient {
    /// Create a new client with the given configuration
    pub fn new(config: SearchClientConfig) -> Result<Self, SearchError> {
        if config.urls.is_empty() {
            return Err(SearchError::NoBackend);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(SearchError::Build)?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &SearchClientConfig {
        &self.config
    }

    /// Search endpoint for one base URL
    fn endpoint(base_url: &str, index_patterns: &[String]) -> String {
        format!(
            "{}/{}/_search",
            base_url.trim_end_matches('/'),
            index_patterns.join(",")
        )
    }

    async fn search_at(
        &self,
        url: &str,
        body: &SearchBody,
    ) -> Result<SearchResponse, SearchError> {
        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(body)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SearchError::Auth {
                user: self.config.username.clone(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let bytes = response.bytes().await.map_err(|e| classify(url, e))?;
        serde_json::from_slice(&bytes).map_err(SearchError::Parse)
    }
}

#[async_trait]
impl SearchGateway for SearchClient {
    async fn search(
        &self,
        body: &SearchBody,
        index_patterns: &[String],
    ) -> Result<SearchResponse, SearchError> {
        let mut last_error = SearchError::NoBackend;

        for base_url in &self.config.urls {
            let url = Self::endpoint(base_url, index_patterns);
            let started = Instant::now();

            match self.search_at(&url, body).await {
                Ok(resp) => {
                    tracing::info!(
                        "Search at {} returned {} of {} hits in {:?}",
                        url,
                        resp.hits.hits.len(),
                        resp.total(),
                        started.elapsed()
                    );
                    return Ok(resp);
                }
                Err(e @ SearchError::Unavailable { .. }) => {
                    tracing::warn!("{}", e);
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }
}

fn classify(url: &str, e: reqwest::Error) -> SearchError {
    if e.is_timeout() {
        SearchError::Timeout(url.to_string())
    } else if e.is_connect() {
        SearchError::Unavailable {
            url: url.to_string(),
            source: e,
        }
    } else {
        SearchError::Request(e)
    }
}

/// Errors that can occur when talking to the search backend
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("No search backend URL configured")]
    NoBackend,

    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Search backend {url} unavailable: {source}")]
    Unavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Authentication failed for user {user:?} (HTTP {status})")]
    Auth { user: String, status: u16 },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("Malformed search response: {0}")]
    Parse(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const EMPTY_RESULT: &str = r#"{"hits":{"total":{"value":0,"relation":"eq"},"hits":[]}}"#;

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Consume one request: headers, then `Content-Length` bytes of body
    async fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }

    /// Local backend answering every request with `response`.
    /// Returns its base URL and a count of accepted connections.
    async fn canned_backend(response: String) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut stream).await;
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{addr}"), accepted)
    }

    fn client_for(urls: Vec<String>) -> SearchClient {
        SearchClient::new(SearchClientConfig {
            urls,
            username: "reader".to_string(),
            password: "pw".to_string(),
            request_timeout_ms: 5_000,
            ..Default::default()
        })
        .unwrap()
    }

    async fn run(client: &SearchClient) -> Result<SearchResponse, SearchError> {
        client
            .search(&SearchBody::default(), &["syslog-*".to_string()])
            .await
    }

    #[test]
    fn test_default_config() {
        let config = SearchClientConfig::default();
        assert_eq!(config.urls, vec!["https://localhost:9200"]);
        assert!(config.accept_invalid_certs);
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn test_debug_hides_password() {
        let config = SearchClientConfig {
            password: "hunter2".to_string(),
            ..Default::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_endpoint() {
        let patterns = vec!["syslog-*".to_string(), "netlog-*".to_string()];
        assert_eq!(
            SearchClient::endpoint("https://mon.example.net/os/", &patterns),
            "https://mon.example.net/os/syslog-*,netlog-*/_search"
        );
        assert_eq!(
            SearchClient::endpoint("https://localhost:9200", &patterns[..1]),
            "https://localhost:9200/syslog-*/_search"
        );
    }

    #[test]
    fn test_no_urls_rejected() {
        let config = SearchClientConfig {
            urls: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(SearchClient::new(config), Err(SearchError::NoBackend)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_fatal() {
        // Port 9 on loopback refuses connections
        let config = SearchClientConfig {
            urls: vec!["http://127.0.0.1:9".to_string()],
            request_timeout_ms: 2_000,
            ..Default::default()
        };
        let client = SearchClient::new(config).unwrap();
        let body = crate::query::SearchBody::default();

        let err = client
            .search(&body, &["syslog-*".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::Unavailable { .. } | SearchError::Timeout(_) | SearchError::Request(_)
        ));
    }

    #[tokio::test]
    async fn test_fails_over_to_next_url_on_connect_error() {
        let (url, accepted) = canned_backend(http_response("200 OK", EMPTY_RESULT)).await;
        let client = client_for(vec!["http://127.0.0.1:9".to_string(), url]);

        let resp = run(&client).await.unwrap();
        assert_eq!(resp.total(), 0);
        assert_eq!(resp.hits.total.relation, "eq");
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_auth_failure_stops_failover() {
        let (denied, _) = canned_backend(http_response("401 Unauthorized", "")).await;
        let (second, accepted) = canned_backend(http_response("200 OK", EMPTY_RESULT)).await;
        let client = client_for(vec![denied, second]);

        let err = run(&client).await.unwrap_err();
        match err {
            SearchError::Auth { user, status } => {
                assert_eq!(user, "reader");
                assert_eq!(status, 401);
            }
            other => panic!("expected Auth, got {other:?}"),
        }
        assert_eq!(accepted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let (url, _) =
            canned_backend(http_response("500 Internal Server Error", "shard failure")).await;
        let client = client_for(vec![url]);

        let err = run(&client).await.unwrap_err();
        match err {
            SearchError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "shard failure");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_parse_error() {
        let (url, _) = canned_backend(http_response("200 OK", "<html>proxy</html>")).await;
        let client = client_for(vec![url]);

        let err = run(&client).await.unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)), "got {err:?}");
    }
}
