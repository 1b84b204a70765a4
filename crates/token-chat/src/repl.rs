//! Chat Loop
//!
//! Reads one line at a time, answers it fully, then prompts again. The
//! session keeps the whole conversation for the life of the process.
//!
//! Bare chain names and requests that already name a token address and a
//! chain are answered without the model.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use agent_core::session::SessionId;
use agent_core::{Agent, AgentStep, Message, Session};
use token_analyzer::{Chain, TokenLookup, TokenQuery};

pub const BANNER: &str = "Starting chatbot... Type 'exit' to end.";
pub const PROMPT: &str = "User: ";
pub const SEPARATOR: &str = "-------------------";

pub struct ChatRepl {
    agent: Agent,
    lookup: Arc<TokenLookup>,
    session: Session,
}

impl ChatRepl {
    pub fn new(agent: Agent, lookup: Arc<TokenLookup>) -> Self {
        Self {
            agent,
            lookup,
            session: Session::with_id(SessionId::from_string("token-chat")),
        }
    }

    /// Run until `exit` or end of input
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write + Send,
    {
        let mut lines = input.lines();
        writeln!(out, "{BANNER}")?;

        loop {
            write!(out, "\n{PROMPT}")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                break;
            };
            let line = line.trim();

            if line.eq_ignore_ascii_case("exit") {
                break;
            }
            if line.is_empty() {
                continue;
            }

            // bare chain names are answered locally
            if let Ok(chain) = Chain::resolve(line) {
                writeln!(out, "Chain ID for {}: {}", chain.name(), chain.id())?;
                continue;
            }

            if let Ok(query) = TokenQuery::parse(line) {
                self.lookup_directly(line, &query, out).await?;
                continue;
            }

            self.respond(line, out).await?;
        }

        self.session.end();
        tracing::info!(
            session = %self.session.id,
            turns = self.session.turns(),
            "Chat ended"
        );
        Ok(())
    }

    /// Fetch the report for a fully specified request; the exchange is kept
    /// in the session so follow-up questions to the model have it
    async fn lookup_directly<W: Write>(
        &mut self,
        line: &str,
        query: &TokenQuery,
        out: &mut W,
    ) -> std::io::Result<()> {
        tracing::debug!(chain = %query.chain, address = %query.address, "Answering without the model");

        let text = match self.lookup.describe(query).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "Token lookup failed");
                e.user_message()
            }
        };
        writeln!(out, "{text}\n{SEPARATOR}")?;

        self.session.push_user(line);
        self.session.conversation.push(Message::assistant(text));
        Ok(())
    }

    async fn respond<W: Write + Send>(&mut self, line: &str, out: &mut W) -> std::io::Result<()> {
        self.session.push_user(line);

        let mut write_error = None;
        let result = self
            .agent
            .run_observed(&mut self.session.conversation, |step| {
                let text = match step {
                    AgentStep::ToolOutput(result) => &result.output,
                    AgentStep::Reply(reply) => reply,
                };
                if let Err(e) = writeln!(out, "{text}\n{SEPARATOR}") {
                    write_error = write_error.take().or(Some(e));
                }
            })
            .await;

        if let Some(e) = write_error {
            return Err(e);
        }

        if let Err(e) = result {
            tracing::warn!(error = %e, "Agent run failed");
            writeln!(out, "{}\n{SEPARATOR}", e.user_message())?;
        }

        self.session.touch();
        Ok(())
    }
}
