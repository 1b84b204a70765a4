//! Mock Token Client
//!
//! For testing and demo purposes. Serves canned reports and records every
//! request so callers can assert how many lookups reached the provider.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::TokenAnalysisClient;
use crate::error::{AnalyzerError, Result};
use crate::query::TokenQuery;
use crate::report::TokenReport;

enum Reply {
    Report(serde_json::Value),
    Status(u16, String),
}

/// In-memory client with a queue of replies; the last reply repeats
pub struct MockTokenClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<TokenQuery>>,
}

impl MockTokenClient {
    /// Always answer with the same report payload
    #[must_use]
    pub fn with_report(payload: serde_json::Value) -> Self {
        Self::with_reports(vec![payload])
    }

    /// Answer with each payload in turn
    #[must_use]
    pub fn with_reports(payloads: Vec<serde_json::Value>) -> Self {
        Self::from_replies(payloads.into_iter().map(Reply::Report).collect())
    }

    /// Always fail with the given HTTP status and body
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self::from_replies(VecDeque::from([Reply::Status(status, body.into())]))
    }

    fn from_replies(replies: VecDeque<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of requests received so far
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().map_or(0, |r| r.len())
    }

    /// Copy of every request received so far
    #[must_use]
    pub fn requests(&self) -> Vec<TokenQuery> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn next_reply(&self) -> Result<serde_json::Value> {
        let mut replies = self
            .replies
            .lock()
            .map_err(|_| AnalyzerError::Config("mock client poisoned".into()))?;

        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().map(|r| match r {
                Reply::Report(v) => Reply::Report(v.clone()),
                Reply::Status(s, b) => Reply::Status(*s, b.clone()),
            })
        };

        match reply {
            Some(Reply::Report(payload)) => Ok(payload),
            Some(Reply::Status(status, body)) => Err(AnalyzerError::Status { status, body }),
            None => Ok(serde_json::Value::Object(serde_json::Map::new())),
        }
    }
}

#[async_trait]
impl TokenAnalysisClient for MockTokenClient {
    async fn token_report(&self, query: &TokenQuery) -> Result<TokenReport> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(query.clone());
        }

        let payload = self.next_reply()?;
        Ok(serde_json::from_value(payload)?)
    }

    fn name(&self) -> &str {
        "MockTokenClient"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query() -> TokenQuery {
        TokenQuery::from_parts("base", "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913").unwrap()
    }

    #[tokio::test]
    async fn test_replies_in_order_then_repeat_last() {
        let client = MockTokenClient::with_reports(vec![
            json!({"tokenInformation": {"tokenName": "first"}}),
            json!({"tokenInformation": {"tokenName": "second"}}),
        ]);

        let names: Vec<_> = [
            client.token_report(&query()).await.unwrap(),
            client.token_report(&query()).await.unwrap(),
            client.token_report(&query()).await.unwrap(),
        ]
        .into_iter()
        .map(|r| r.token_information.token_name.unwrap())
        .collect();

        assert_eq!(names, ["first", "second", "second"]);
        assert_eq!(client.request_count(), 3);
        assert_eq!(client.requests()[0], query());
    }

    #[tokio::test]
    async fn test_failing_client() {
        let client = MockTokenClient::failing(401, "invalid api key");
        let err = client.token_report(&query()).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Status { status: 401, .. }));
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_a_parse_error() {
        let client = MockTokenClient::with_report(json!({"tokenInformation": "not an object"}));
        let err = client.token_report(&query()).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse(_)));
    }
}
