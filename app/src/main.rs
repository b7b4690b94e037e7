#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, InitStrategy, TriageInput, TriageStrategy,
    VersionStrategy,
};

#[derive(Parser)]
#[command(name = "medichat")]
#[command(about = "medichat medical chat assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a conversation (interactive unless -m is given)
    Chat {
        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Provider to use: "gemini" or "groq"
        #[arg(short = 'p', long)]
        provider: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// Session ID to resume
        #[arg(short = 's', long)]
        session_id: Option<Uuid>,

        /// Number of messages to keep in provider context
        #[arg(long)]
        history_limit: Option<usize>,
    },
    /// Generate a triage report from conversation notes
    Triage {
        /// File with the conversation notes (stdin when omitted)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Provider to use: "gemini" or "groq"
        #[arg(short = 'p', long)]
        provider: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// Patient name
        #[arg(long)]
        name: Option<String>,

        /// Patient age
        #[arg(long)]
        age: Option<String>,

        /// Patient sex
        #[arg(long)]
        sex: Option<String>,

        /// Only print the short summary, skip the detailed report
        #[arg(long)]
        summary: bool,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            provider,
            model,
            session_id,
            history_limit,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    session_id,
                    message,
                    provider,
                    model,
                    history_limit,
                })
                .await
        }
        Commands::Triage {
            input,
            provider,
            model,
            name,
            age,
            sex,
            summary,
        } => {
            TriageStrategy
                .execute(TriageInput {
                    input,
                    provider,
                    model,
                    name,
                    age,
                    sex,
                    summary_only: summary,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
