//! Token-Analysis Clients
//!
//! Abstraction over the provider that scores tokens, plus the QuillCheck
//! HTTP implementation and an in-memory stand-in for tests and demos.

mod mock;
mod quill;

pub use mock::MockTokenClient;
pub use quill::{
    DEFAULT_BASE_URL as DEFAULT_QUILL_BASE_URL, DEFAULT_TIMEOUT_SECS as DEFAULT_QUILL_TIMEOUT_SECS,
    QuillClient, QuillConfig,
};

use async_trait::async_trait;

use crate::error::Result;
use crate::query::TokenQuery;
use crate::report::TokenReport;

/// Token-analysis provider (Strategy pattern)
///
/// One call is one provider request: implementations must not cache or retry.
#[async_trait]
pub trait TokenAnalysisClient: Send + Sync {
    /// Fetch the analysis report for a token
    async fn token_report(&self, query: &TokenQuery) -> Result<TokenReport>;

    /// Provider name, for logs
    fn name(&self) -> &str;
}
