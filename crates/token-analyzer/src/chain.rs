//! Chain Registry
//!
//! Fixed table of the chains the analysis API understands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};

/// A supported blockchain network
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Ethereum,
    Bsc,
    Polygon,
    Base,
}

impl Chain {
    /// Every supported chain, in display order
    pub const ALL: [Self; 4] = [Self::Ethereum, Self::Bsc, Self::Polygon, Self::Base];

    /// EVM chain identifier used by the analysis API
    #[must_use]
    pub const fn id(self) -> u64 {
        match self {
            Self::Ethereum => 1,
            Self::Bsc => 56,
            Self::Polygon => 137,
            Self::Base => 8453,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Bsc => "BSC",
            Self::Polygon => "Polygon",
            Self::Base => "Base",
        }
    }

    #[must_use]
    pub fn from_id(id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Resolve a chain name, ignoring case and surrounding whitespace
    pub fn resolve(name: &str) -> Result<Self> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AnalyzerError::UnsupportedChain(wanted.to_string()))
    }

    /// Accept either a chain name or a numeric chain id (`"ethereum"`, `"1"`)
    pub fn resolve_name_or_id(value: &str) -> Result<Self> {
        match value.trim().parse::<u64>() {
            Ok(id) => Self::from_id(id).ok_or_else(|| AnalyzerError::UnsupportedChain(id.to_string())),
            Err(_) => Self::resolve(value),
        }
    }

    /// `"Ethereum, BSC, Polygon, Base"`
    #[must_use]
    pub fn supported_names() -> String {
        Self::ALL.map(Self::name).join(", ")
    }
}

/// Map a chain name to its chain id
pub fn resolve_chain_id(name: &str) -> Result<u64> {
    Chain::resolve(name).map(Chain::id)
}

impl FromStr for Chain {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::resolve(s)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
