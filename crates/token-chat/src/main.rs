//! token-chat
//!
//! Terminal chatbot that answers token security questions. The Gemini model
//! drives the conversation and calls `get_token_info` for QuillCheck
//! reports.

mod config;
mod repl;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AgentBuilder, LlmProvider};
use agent_runtime::GeminiProvider;
use token_analyzer::{QuillClient, TokenAnalysisClient, TokenLookup, system_prompt, tools::TokenInfoTool};

use crate::config::Settings;
use crate::repl::ChatRepl;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Chat goes to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    tracing::info!(network = %settings.network_id, model = %settings.gemini_model, "Configuration loaded");
    if settings.credentials.has_cdp_key() {
        tracing::debug!(key = settings.credentials.cdp_key_id(), "CDP credentials present");
    }

    // Initialize LLM provider
    let provider = Arc::new(GeminiProvider::new(settings.gemini_config())?);

    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to Gemini");
            if let Ok(models) = provider.list_models().await {
                for model in models {
                    tracing::debug!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Gemini not reachable - replies will fail");
            tracing::warn!("  Check GEMINI_API_KEY and network access");
        }
    }

    // Token lookups
    let client: Arc<dyn TokenAnalysisClient> = Arc::new(QuillClient::new(settings.quill_config())?);
    let lookup = Arc::new(TokenLookup::new(client));

    let agent = AgentBuilder::new()
        .provider(provider)
        .tool(TokenInfoTool::new(lookup.clone()))
        .system_prompt(system_prompt(&settings.network_id))
        .model(&settings.gemini_model)
        .build()?;

    tracing::info!("Registered {} tools:", agent.tools().len());
    for name in agent.tools().names() {
        tracing::info!("  • {}", name);
    }

    let mut chat = ChatRepl::new(agent, lookup);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    tokio::select! {
        result = chat.run(stdin, &mut stdout) => result?,
        _ = tokio::signal::ctrl_c() => {
            println!("\nGoodbye!");
            // a pending stdin read would otherwise hold up runtime shutdown
            std::process::exit(0);
        }
    }

    Ok(())
}
