//! Query Adapter
//!
//! Pulls a token address and chain name out of free text. Pattern matching
//! only; no model is involved.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::error::{AnalyzerError, Result};

static ADDRESS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static address regex"));

static ADDRESS_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b0x[0-9a-fA-F]{40}\b").expect("static address regex"));

static CHAIN_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bon\s+(?:the\s+)?([a-z][a-z0-9]*)(?:\s+(?:chain|network|mainnet)\b)?")
        .expect("static chain regex")
});

/// A contract address: `0x` followed by 40 hex digits
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenAddress(String);

impl TokenAddress {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if ADDRESS_REGEX.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(AnalyzerError::InvalidAddress(value.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One token lookup request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenQuery {
    pub chain: Chain,
    pub address: TokenAddress,
}

impl TokenQuery {
    #[must_use]
    pub const fn new(chain: Chain, address: TokenAddress) -> Self {
        Self { chain, address }
    }

    /// Build from raw strings, resolving the chain name first
    pub fn from_parts(chain_name: &str, address: &str) -> Result<Self> {
        let chain = Chain::resolve(chain_name)?;
        Ok(Self::new(chain, TokenAddress::parse(address)?))
    }

    /// Parse text like "token information for the token at address 0x… on the Base chain"
    pub fn parse(text: &str) -> Result<Self> {
        let address_match = ADDRESS_IN_TEXT
            .find(text)
            .ok_or_else(|| AnalyzerError::InvalidQuery("no token address found".into()))?;

        // prefer the chain phrase that follows the address
        let chain_word = CHAIN_IN_TEXT
            .captures(&text[address_match.end()..])
            .or_else(|| CHAIN_IN_TEXT.captures(&text[..address_match.start()]))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| AnalyzerError::InvalidQuery("no chain name found".into()))?;

        let chain = Chain::resolve(chain_word)?;
        let address = TokenAddress::parse(address_match.as_str())?;

        tracing::debug!(%chain, %address, "Parsed token query");
        Ok(Self::new(chain, address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

    #[test]
    fn test_address_validation() {
        assert!(TokenAddress::parse(WETH).is_ok());
        assert!(TokenAddress::parse(&format!("  {WETH}\n")).is_ok());
        assert!(TokenAddress::parse("0x1234").is_err());
        assert!(TokenAddress::parse("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").is_err());
        assert!(TokenAddress::parse("0xZ02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").is_err());
    }

    #[test]
    fn test_parse_canonical_question() {
        let text = format!(
            "What is the token information for the token at address {WETH} on the Ethereum chain?"
        );
        let query = TokenQuery::parse(&text).unwrap();
        assert_eq!(query.chain, Chain::Ethereum);
        assert_eq!(query.chain.id(), 1);
        assert_eq!(query.address.as_str(), WETH);
    }

    #[test]
    fn test_parse_variants() {
        let query = TokenQuery::parse(&format!("check {WETH} on bsc")).unwrap();
        assert_eq!(query.chain, Chain::Bsc);

        let query = TokenQuery::parse(&format!("on the POLYGON network, look up {WETH}")).unwrap();
        assert_eq!(query.chain, Chain::Polygon);

        let query = TokenQuery::parse(&format!(
            "token information for the token at address {} on the base chain",
            WETH.to_lowercase()
        ))
        .unwrap();
        assert_eq!(query.chain, Chain::Base);
    }

    #[test]
    fn test_parse_unsupported_chain() {
        let err = TokenQuery::parse(&format!("token at address {WETH} on the Solana chain")).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnsupportedChain(name) if name == "Solana"));
    }

    #[test]
    fn test_parse_missing_parts() {
        assert!(matches!(
            TokenQuery::parse("token information on the Ethereum chain"),
            Err(AnalyzerError::InvalidQuery(_))
        ));
        assert!(matches!(
            TokenQuery::parse(&format!("what about {WETH}?")),
            Err(AnalyzerError::InvalidQuery(_))
        ));
        // 41 hex digits is not an address
        assert!(matches!(
            TokenQuery::parse(&format!("{WETH}f on the Base chain")),
            Err(AnalyzerError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_from_parts() {
        let query = TokenQuery::from_parts("ethereum", WETH).unwrap();
        assert_eq!(query.chain, Chain::Ethereum);
        assert!(matches!(
            TokenQuery::from_parts("ethereum", "0xabc"),
            Err(AnalyzerError::InvalidAddress(_))
        ));
    }
}
