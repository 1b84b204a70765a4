//! Token Info Tool
//!
//! Fetches the security report for a token and hands the formatted text
//! back to the reasoning loop.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::chain::Chain;
use crate::error::AnalyzerError;
use crate::lookup::TokenLookup;
use crate::query::{TokenAddress, TokenQuery};

pub const TOOL_NAME: &str = "get_token_info";

/// Tool for analyzing a token contract on a supported chain
pub struct TokenInfoTool {
    lookup: Arc<TokenLookup>,
}

impl TokenInfoTool {
    pub fn new(lookup: Arc<TokenLookup>) -> Self {
        Self { lookup }
    }

    /// `chain`, falling back to the `chain_id` alias
    fn chain_arg(call: &ToolCall) -> Option<String> {
        call.str_arg("chain").or_else(|| call.str_arg("chain_id"))
    }

    fn query(call: &ToolCall) -> Result<TokenQuery, AnalyzerError> {
        let chain = Self::chain_arg(call).unwrap_or_default();
        let chain = Chain::resolve_name_or_id(&chain)?;
        let address = TokenAddress::parse(&call.str_arg("token_address").unwrap_or_default())?;
        Ok(TokenQuery::new(chain, address))
    }
}

#[async_trait]
impl Tool for TokenInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Fetch a security analysis of a token contract: basic metrics, security score, \
                          holder distribution, liquidity, ownership checks and honeypot detection. \
                          Use this whenever the user asks about a token on a specific blockchain."
                .into(),
            parameters: vec![
                ParameterSchema::required_string(
                    "chain",
                    format!(
                        "Chain name or numeric chain id ({}; e.g. 'Ethereum' or '1')",
                        Chain::supported_names()
                    ),
                ),
                ParameterSchema::required_string(
                    "token_address",
                    "Token contract address (0x followed by 40 hex characters)",
                ),
            ],
            category: Some("token_security".into()),
            has_side_effects: false,
        }
    }

    fn validate(&self, call: &ToolCall) -> CoreResult<()> {
        if Self::chain_arg(call).is_none() {
            return Err(AgentError::ToolValidation(
                "Missing required parameter: chain".into(),
            ));
        }
        if call.str_arg("token_address").is_none() {
            return Err(AgentError::ToolValidation(
                "Missing required parameter: token_address".into(),
            ));
        }
        Ok(())
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let outcome = match Self::query(call) {
            Ok(query) => self
                .lookup
                .describe(&query)
                .await
                .map(|text| (query, text)),
            Err(e) => Err(e),
        };

        match outcome {
            Ok((query, text)) => Ok(ToolResult::success(TOOL_NAME, text).with_data(json!({
                "chainId": query.chain.id(),
                "tokenAddress": query.address.as_str(),
            }))),
            Err(e) => {
                tracing::warn!(error = %e, "Token lookup failed");
                Ok(ToolResult::failure(TOOL_NAME, e.user_message()))
            }
        }
    }
}
