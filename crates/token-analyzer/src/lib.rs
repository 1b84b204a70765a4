//! # token-analyzer
//!
//! Token security lookups against the QuillCheck API, usable directly or as
//! an agent tool.
//!
//! ## Flow
//!
//! ```text
//! "… address 0xC02a…6Cc2 on the Ethereum chain"
//!        │
//!        ▼
//!   TokenQuery::parse ──► Chain::resolve ──► TokenAddress::parse
//!        │                   (no request is made if either fails)
//!        ▼
//!   TokenAnalysisClient::token_report   GET /tokens/information/{addr}?chainId=1
//!        │
//!        ▼
//!   format_report ──► BASIC INFORMATION … EXTERNAL LINKS
//! ```
//!
//! Supported chains: Ethereum (1), BSC (56), Polygon (137), Base (8453).

pub mod chain;
pub mod client;
pub mod error;
pub mod format;
pub mod lookup;
pub mod query;
pub mod report;
pub mod svckit;

pub use chain::{Chain, resolve_chain_id};
pub use client::{MockTokenClient, QuillClient, QuillConfig, TokenAnalysisClient};
pub use error::{AnalyzerError, Result};
pub use format::format_report;
pub use lookup::TokenLookup;
pub use query::{TokenAddress, TokenQuery};
pub use report::TokenReport;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::TokenInfoTool;
}

/// System prompt for the token chat agent
#[must_use]
pub fn system_prompt(network_id: &str) -> String {
    format!(
        r"You are a helpful onchain assistant. Your wallet context is the {network_id} network.

## Token Analysis

When the user asks about a token, call `get_token_info` with the chain and the token
contract address. Supported chains: {chains}.

- Pass the chain by name (e.g. `Ethereum`) or by numeric id (e.g. `1`).
- Show the tool's report as returned; do not summarize or restate it.
- If the chain is unsupported or the address is malformed, say so plainly.

If someone asks you to do something you can't do with your available tools, say so.
Be concise and helpful. Refrain from restating your tools' descriptions unless
explicitly asked.",
        chains = Chain::supported_names()
    )
}
