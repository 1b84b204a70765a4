//! QuillCheck Client
//!
//! `GET {base}/tokens/information/{address}?chainId={id}` authenticated
//! with an `x-api-key` header.

use std::time::Duration;

use async_trait::async_trait;

use super::TokenAnalysisClient;
use crate::error::{AnalyzerError, Result};
use crate::query::TokenQuery;
use crate::report::TokenReport;

pub const DEFAULT_BASE_URL: &str = "https://check-api.quillai.network/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// QuillCheck connection settings
#[derive(Clone)]
pub struct QuillConfig {
    pub api_key: String,
    /// API root, without trailing slash
    pub base_url: String,
    /// Whole-request timeout; there is exactly one attempt per lookup
    pub timeout_secs: u64,
}

impl std::fmt::Debug for QuillConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuillConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl QuillConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP client for the QuillCheck token API
pub struct QuillClient {
    http: reqwest::Client,
    config: QuillConfig,
}

impl QuillClient {
    pub fn new(config: QuillConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalyzerError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Full request URL for a query
    #[must_use]
    pub fn endpoint(&self, query: &TokenQuery) -> String {
        format!(
            "{}/tokens/information/{}?chainId={}",
            self.config.base_url,
            query.address,
            query.chain.id()
        )
    }
}

#[async_trait]
impl TokenAnalysisClient for QuillClient {
    async fn token_report(&self, query: &TokenQuery) -> Result<TokenReport> {
        let url = self.endpoint(query);
        tracing::debug!(chain = %query.chain, address = %query.address, "Fetching token report");

        let response = self
            .http
            .get(&url)
            .header("x-api-key", &self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, address = %query.address, "Token report request rejected");
            return Err(AnalyzerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let report: TokenReport = serde_json::from_str(&body)?;
        tracing::info!(chain = %query.chain, address = %query.address, "Token report fetched");
        Ok(report)
    }

    fn name(&self) -> &str {
        "QuillCheck"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Chain;
    use crate::query::TokenAddress;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const USDC_BASE: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

    fn query() -> TokenQuery {
        TokenQuery::new(Chain::Base, TokenAddress::parse(USDC_BASE).unwrap())
    }

    /// Answer one request with a canned response; yields the raw request head
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}/api/v1"), handle)
    }

    fn client(base_url: &str) -> QuillClient {
        QuillClient::new(QuillConfig::new("test-key").with_base_url(base_url).with_timeout(5)).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = QuillConfig::new("secret");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_endpoint() {
        let client = QuillClient::new(
            QuillConfig::new("k").with_base_url("http://localhost:9000/api/v1/"),
        )
        .unwrap();
        let query = TokenQuery::new(
            Chain::Base,
            TokenAddress::parse("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913").unwrap(),
        );

        assert_eq!(
            client.endpoint(&query),
            "http://localhost:9000/api/v1/tokens/information/0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913?chainId=8453"
        );
        assert_eq!(client.name(), "QuillCheck");
    }

    #[tokio::test]
    async fn test_sends_one_authenticated_get() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"tokenInformation": {"tokenName": "USD Coin"}, "honeypotDetails": {"isTokenHoneypot": 0}}"#,
        )
        .await;

        let report = client(&base_url).token_report(&query()).await.unwrap();
        assert_eq!(report.token_information.token_name.as_deref(), Some("USD Coin"));
        assert_eq!(report.honeypot_details.is_honeypot(), Some(false));

        let request = server.await.unwrap();
        assert!(request.starts_with(&format!(
            "GET /api/v1/tokens/information/{USDC_BASE}?chainId=8453 HTTP/1.1\r\n"
        )));
        assert!(request.to_ascii_lowercase().contains("\r\nx-api-key: test-key\r\n"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_returned_verbatim() {
        let (base_url, server) = serve_once("404 Not Found", r#"{"message":"nope"}"#).await;

        let err = client(&base_url).token_report(&query()).await.unwrap_err();
        assert!(
            matches!(&err, AnalyzerError::Status { status: 404, body } if body == r#"{"message":"nope"}"#),
            "unexpected error: {err:?}"
        );
        assert!(err.user_message().ends_with(r#"provider returned 404: {"message":"nope"}"#));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_parse_error() {
        let (base_url, server) = serve_once("200 OK", "<html>not json</html>").await;

        let err = client(&base_url).token_report(&query()).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse(_)), "unexpected error: {err:?}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}/api/v1"))
            .token_report(&query())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Request(_)), "unexpected error: {err:?}");
        assert!(err.user_message().starts_with("Could not fetch token data:"));
    }
}
