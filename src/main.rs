// src/main.rs — Townhall entry point

use clap::Parser;
use std::io::Write;
use std::sync::Arc;

use townhall::cli::{chat, login, Cli, Commands};
use townhall::core::engine::{EngineSettings, TurnEngine};
use townhall::core::types::TurnEvent;
use townhall::handoff::LoggingHandoff;
use townhall::infra::config::Config;
use townhall::infra::credentials::Credentials;
use townhall::infra::logger;
use townhall::persona::Persona;
use townhall::provider::openai::OpenAiProvider;

#[tokio::main]
async fn main() {
    // Respects RUST_LOG
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Login) = cli.command {
        return login::run_login();
    }

    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    // The credential gate: prompt before any submission is possible.
    let mut creds = Credentials::load()?;
    if creds.api_key().is_err() {
        login::run_login()?;
        creds = Credentials::load()?;
    }
    let api_key = creds.api_key()?.to_string();

    let provider = Arc::new(OpenAiProvider::new(api_key));
    let persona = Persona::from_config(&config.persona);
    let persona_name = persona.name.clone();
    let settings = EngineSettings::from_config(&config)?;

    let mut engine =
        TurnEngine::new(provider, persona, settings).with_event_handler(print_event);
    if let Some(seed) = cli.seed {
        engine = engine.with_rng_seed(seed);
    }

    chat::run_chat(Arc::new(engine), Arc::new(LoggingHandoff), &persona_name).await
}

/// Terminal renderer for turn lifecycle events.
fn print_event(event: TurnEvent) {
    match event {
        TurnEvent::ReasoningStep { text } => {
            eprintln!("  · {}", text);
        }
        TurnEvent::ReasoningDone => {}
        TurnEvent::ReplyStarted { .. } => {}
        TurnEvent::RevealChunk { chunk, .. } => {
            print!("{}", chunk);
            std::io::stdout().flush().ok();
        }
        TurnEvent::RevealDone { .. } => {
            println!();
        }
        TurnEvent::EscalationFlagged { .. } => {}
        TurnEvent::SuggestionsReady { items } => {
            eprintln!("\nRelated:");
            for item in items {
                eprintln!("  → {}", item);
            }
        }
    }
}
