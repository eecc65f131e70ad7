//! Interactive terminal shell for the mason construction assistant.
//!
//! The shell owns the session history: after each orchestrated exchange it
//! appends the raw user turn and the bot turn, renders both, and prints
//! any "did you mean" advisory without persisting it.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;

use mason_chat::{ChatHistory, ChatTelemetryBuilder, ResponseOrchestrator, Speaker};
use mason_glossary::GlossaryStore;
use mason_lexicon::{LexiconCorrector, SpellCorrector, Vocabulary};
use mason_responder::{HttpModelBackend, LoopbackModelBackend, ModelBackend, ModelResponder};
use shared_event_bus::FileEventPublisher;
use shared_logging::{JsonLogger, LogLevel, LogRecord};

#[derive(Parser, Debug)]
#[command(name = "mason", version, about = "Construction assistant chat shell")]
struct Cli {
    /// Path to the glossary JSON resource.
    #[arg(long, default_value = "mason/chat_cli/data/construction_glossary.json")]
    glossary: PathBuf,

    /// Generation endpoint; defaults to MASON_MODEL_ENDPOINT or the local
    /// server address.
    #[arg(long)]
    endpoint: Option<String>,

    /// Use the offline loopback backend instead of the HTTP model server.
    #[arg(long)]
    offline: bool,

    /// Directory for structured JSON logs.
    #[arg(long, default_value = "mason/chat_cli/logs")]
    log_dir: PathBuf,

    /// Optional JSONL file receiving chat.turn.completed events.
    #[arg(long)]
    event_log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Glossary problems are fatal configuration errors: without a valid
    // glossary the assistant must not serve requests.
    let glossary = GlossaryStore::load(&cli.glossary)
        .with_context(|| format!("loading glossary {}", cli.glossary.display()))?;

    let corrector: Arc<dyn SpellCorrector> = {
        let texts: Vec<String> = glossary
            .iter()
            .flat_map(|(key, answer)| [key.to_string(), answer.to_string()])
            .collect();
        Arc::new(LexiconCorrector::new(Vocabulary::from_texts(texts)))
    };

    let backend: Arc<dyn ModelBackend> = if cli.offline {
        Arc::new(LoopbackModelBackend::default())
    } else {
        let backend = match &cli.endpoint {
            Some(endpoint) => HttpModelBackend::new(endpoint.clone()),
            None => HttpModelBackend::from_env(),
        }
        .context("configuring model backend")?;
        Arc::new(backend)
    };
    let responder = ModelResponder::new(backend);

    let log_path = cli.log_dir.join("chat.log");
    let logger = JsonLogger::new(&log_path)
        .with_context(|| format!("opening log {}", log_path.display()))?;
    let mut telemetry = ChatTelemetryBuilder::new("chat_cli").log_path(&log_path);
    if let Some(event_log) = &cli.event_log {
        telemetry = telemetry.event_publisher(Arc::new(
            FileEventPublisher::new(event_log).context("opening event log")?,
        ));
    }

    let orchestrator = ResponseOrchestrator::new(glossary.clone(), corrector, responder)
        .with_telemetry(telemetry.build()?);

    logger.log(
        &LogRecord::new("chat_cli", LogLevel::Info, "session started")
            .with_metadata("glossary_entries", serde_json::json!(glossary.len()))
            .with_metadata("offline", serde_json::json!(cli.offline)),
    )?;

    println!("Construction AI Assistant");
    println!("Your smart civil engineering helper. Type a question, or 'exit' to quit.");

    let stdin = io::stdin();
    let mut history = ChatHistory::new();
    loop {
        print!("you> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        let outcome = orchestrator.respond(input, &history).await;
        if let Some(advisory) = &outcome.advisory {
            println!("[{advisory}]");
        }
        println!("bot> {}", outcome.reply);

        history.push(Speaker::User, input);
        history.push(Speaker::Bot, outcome.reply);
    }

    logger.log(
        &LogRecord::new("chat_cli", LogLevel::Info, "session ended")
            .with_metadata("turns", serde_json::json!(history.len())),
    )?;
    Ok(())
}
