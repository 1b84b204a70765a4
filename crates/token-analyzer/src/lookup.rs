//! Token Lookup
//!
//! Resolves the chain, validates the address, fetches the report and
//! formats it. Validation failures never reach the provider.

use std::sync::Arc;

use crate::client::TokenAnalysisClient;
use crate::error::Result;
use crate::format::format_report;
use crate::query::TokenQuery;
use crate::report::TokenReport;

pub struct TokenLookup {
    client: Arc<dyn TokenAnalysisClient>,
}

impl TokenLookup {
    pub fn new(client: Arc<dyn TokenAnalysisClient>) -> Self {
        Self { client }
    }

    /// Look up a token by chain name and address
    pub async fn lookup(&self, chain_name: &str, address: &str) -> Result<String> {
        let query = TokenQuery::from_parts(chain_name, address)?;
        self.describe(&query).await
    }

    /// Answer a free-text request ("... address 0x… on the Base chain")
    pub async fn answer(&self, text: &str) -> Result<String> {
        let query = TokenQuery::parse(text)?;
        self.describe(&query).await
    }

    /// Fetch and format the report for a resolved query
    pub async fn describe(&self, query: &TokenQuery) -> Result<String> {
        let report = self.fetch(query).await?;
        Ok(format_report(&report))
    }

    /// Fetch the raw report; one provider request per call
    pub async fn fetch(&self, query: &TokenQuery) -> Result<TokenReport> {
        tracing::debug!(provider = self.client.name(), chain = %query.chain, "Token lookup");
        self.client.token_report(query).await
    }
}
