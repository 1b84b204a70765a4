//! # agent-core
//!
//! Provider-agnostic agent loop used by the token chatbot.
//!
//! ```text
//!  user line ──► Session/Conversation ──► Agent::run_observed
//!                                            │
//!                  ┌─────────────────────────┴──────────┐
//!                  ▼                                    ▼
//!           LlmProvider::complete              ToolRegistry::execute
//!           (Gemini, scripted in tests)        (get_token_info, ...)
//!                  │                                    │
//!                  └──── AgentStep::Reply / ToolOutput ─┘
//! ```
//!
//! A reply containing a fenced `tool` JSON block is executed and its result
//! appended to the conversation; anything else ends the run.

pub mod provider;
pub mod tool;
pub mod reasoning;
pub mod message;
pub mod error;
pub mod session;

pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::LlmProvider;
pub use reasoning::{Agent, AgentBuilder, AgentStep};
pub use session::Session;
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry, ToolSchema};
