//! Error Types for Token Analyzer

use thiserror::Error;

use crate::chain::Chain;

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Invalid token address: {0}")]
    InvalidAddress(String),

    #[error("Could not understand query: {0}")]
    InvalidQuery(String),

    #[error("Token lookup failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalyzerError {
    /// Message shown to the chat user; the loop continues afterwards
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedChain(name) => format!(
                "Sorry, the chain '{name}' is not supported. Supported chains: {}.",
                Chain::supported_names()
            ),
            Self::InvalidAddress(address) => format!(
                "'{address}' is not a valid token address (expected 0x followed by 40 hex characters)."
            ),
            Self::InvalidQuery(reason) => format!(
                "I couldn't understand the request ({reason}). Try: token information for the token at address <ADDRESS> on the <CHAIN> chain."
            ),
            Self::Request(e) => format!("Could not fetch token data: {e}"),
            Self::Status { status, body } => {
                format!("Could not fetch token data: provider returned {status}: {body}")
            }
            Self::Parse(e) => format!("Could not fetch token data: unreadable provider response ({e})"),
            Self::Config(msg) => format!("Token lookups are misconfigured: {msg}"),
        }
    }
}
