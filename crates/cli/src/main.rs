//! TutorForge CLI
//!
//! Thin caller around the QA pipeline:
//! 1. Loads configuration and builds the service clients
//! 2. Processes the PDF named on the command line
//! 3. Runs an interactive question loop

use anyhow::{bail, Context};
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tutorforge_common::completion::create_completer;
use tutorforge_common::embeddings::create_embedder;
use tutorforge_common::{AppConfig, VERSION};
use tutorforge_qa::{QaOptions, TutorSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration (defaults apply when no file or env overrides exist)
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("warning: failed to load configuration, using defaults: {e}");
        AppConfig::default()
    });

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.observability.log_level.clone()));
    if config.observability.json_logging {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting TutorForge v{}", VERSION);

    let path = std::env::args()
        .nth(1)
        .context("usage: tutorforge <document.pdf>")?;

    let embedder = create_embedder(&config.embedding)?;
    let completer = create_completer(&config.completion)?;

    let options = QaOptions {
        completion: tutorforge_common::CompletionOptions::from_config(&config.completion),
        ..QaOptions::default()
    };

    let mut session = TutorSession::new(
        embedder,
        completer,
        options,
        config.chunking.clone(),
        &config.throttle,
    );

    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {path}"))?;

    println!("Processing {path} ...");
    let summary = session.load_document(&bytes).await?;
    println!(
        "Ready: {} chunks indexed (document {}).",
        summary.chunk_count,
        &summary.document_hash[..12]
    );
    println!("Ask a question, or type 'exit' to quit.");

    let stdin = io::stdin();
    loop {
        print!("? ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        match session.ask(question).await {
            Ok(outcome) => println!("\n{}\n", outcome.into_text()),
            Err(e) if e.is_validation() => println!("\n{e}\n"),
            Err(e) => bail!(e),
        }
    }

    info!("Session finished");
    Ok(())
}
