//! Service Kit - Agent Tools
//!
//! Tools that implement `agent_core::Tool` for token lookups.

mod token_info;

pub use token_info::TokenInfoTool;
