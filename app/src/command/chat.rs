//! Multi-turn conversation command.
//!
//! Maintains a session across turns, runs every generated reply through
//! the sanitation pipeline, and offers a triage report once the user has
//! described enough.

use std::io::Write;
use std::sync::Arc;

use medichat_conversation::{ConversationConfig, ConversationManager};
use medichat_core::{LLMProvider, SessionStorage};
use medichat_session::SessionStore;
use medichat_triage::{DEFAULT_MIN_WORDS, Patient, TriageReporter, is_ready};
use tracing::info;
use uuid::Uuid;

use super::{CommandStrategy, init_common_components};
use crate::command::triage::print_sections;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional session ID to resume (creates new if not provided)
    pub session_id: Option<Uuid>,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional provider override ("gemini" or "groq")
    pub provider: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    /// Number of messages to keep in provider context
    pub history_limit: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components(input.provider.as_deref(), input.model)?;
        let sanitizer = super::build_sanitizer_config(&common.config)?;

        let session_id = input.session_id.unwrap_or_else(Uuid::now_v7);

        let mut conversation_config = ConversationConfig::default()
            .with_session_id(session_id)
            .with_model(common.model.clone())
            .with_sanitizer(sanitizer);
        if let Some(prompt) = common.config.assistant.system_prompt.clone() {
            conversation_config = conversation_config.with_system_prompt(prompt);
        }
        if let Some(limit) = input.history_limit.or(common.config.assistant.history_limit) {
            conversation_config = conversation_config.with_history_limit(limit);
        }

        let storage = Arc::new(SessionStore::new());
        let mut manager =
            ConversationManager::new(common.provider.clone(), storage, conversation_config)
                .await?;

        info!("starting conversation session: {session_id}");

        if let Some(msg) = input.message {
            let result = manager.process_turn(&msg).await?;
            println!("{}", result.response);
            info!("turn {} completed", result.turn_number);
        } else {
            run_chat_loop(&mut manager, &common.provider, &common.model).await?;
        }

        Ok(())
    }
}

/// Interactive loop: read a line, process the turn, print the reply.
///
/// `reset` starts the conversation over, `triage` generates a report from
/// the latest assistant reply, `exit`/`quit` end the session.
async fn run_chat_loop<P, S>(
    manager: &mut ConversationManager<P, S>,
    provider: &Arc<dyn LLMProvider>,
    model: &str,
) -> anyhow::Result<()>
where
    P: LLMProvider + Send + Sync,
    S: SessionStorage + Send + Sync,
{
    println!("=== Medical Chat Assistant ===");
    println!("Ask general questions about symptoms or home care.");
    println!("This is not a replacement for a doctor.");
    println!();
    println!("Commands: 'reset' to start over, 'triage' for a report, 'exit' to quit.\n");

    let mut triage_offered = false;

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        match input {
            "" => continue,
            "exit" | "quit" | "q" => {
                println!(
                    "\nSession ended. Total turns: {}",
                    manager.session().turn_count()
                );
                break;
            }
            "reset" => {
                manager.reset().await?;
                triage_offered = false;
                println!("Conversation reset.\n");
            }
            "triage" => {
                if is_ready(&manager.session().messages, DEFAULT_MIN_WORDS) {
                    run_inline_triage(
                        manager.session().last_assistant_reply(),
                        provider,
                        model,
                    )
                    .await?;
                } else {
                    println!("Tell me a bit more about your symptoms first.\n");
                }
            }
            _ => match manager.process_turn(input).await {
                Ok(result) => {
                    println!("\n{}\n", result.response);

                    if !triage_offered
                        && is_ready(&manager.session().messages, DEFAULT_MIN_WORDS)
                    {
                        triage_offered = true;
                        println!("(Enough detail collected. Type 'triage' for a report.)\n");
                    }
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                }
            },
        }
    }

    Ok(())
}

async fn run_inline_triage(
    last_reply: Option<&str>,
    provider: &Arc<dyn LLMProvider>,
    model: &str,
) -> anyhow::Result<()> {
    let Some(last_reply) = last_reply else {
        println!("Nothing to triage yet. Describe your symptoms first.\n");
        return Ok(());
    };

    let reporter = TriageReporter::new(provider.clone(), model.to_string());

    println!("\n--- Triage Summary ---");
    let summary = reporter.generate_summary(last_reply).await?;
    println!("{summary}\n");

    println!("--- Detailed Report ---");
    let sections = reporter
        .generate_report(&Patient::default(), last_reply)
        .await?;
    print_sections(&sections);

    Ok(())
}
