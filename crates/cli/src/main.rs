//! Binary entry point for the subtitle translator.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use sublate_core::translate::anthropic::{AnthropicTranslator, DEFAULT_MODEL};
use sublate_core::translate::{translate_file, JobOptions, Outcome, DEFAULT_BATCH_SIZE};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line options for the binary.
#[derive(Parser)]
#[command(about = "Translate SRT subtitle files through the Anthropic API")]
struct Cli {
    /// Path of the SRT file to translate.
    input: PathBuf,

    /// Path the translated SRT file is written to.
    output: PathBuf,

    /// Target language for the translation.
    #[arg(short, long, default_value = "French")]
    language: String,

    /// API credential; falls back to the CLAUDE_API_KEY environment variable.
    #[arg(long, env = "CLAUDE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Model identifier sent with every request.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Number of subtitles translated per request.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Enable verbose debug and trace logs.
    #[arg(long)]
    debug: bool,
}

/// Application entry point which parses CLI args and runs one translation.
/// This function should initialize logging, wire the interrupt signal and
/// delegate to the core library.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.debug {
        EnvFilter::default()
            .add_directive("sublate=trace".parse().unwrap())
            .add_directive("sublate_core=trace".parse().unwrap())
            .add_directive("info".parse().unwrap())
    } else {
        EnvFilter::default()
            .add_directive("sublate=info".parse().unwrap())
            .add_directive("sublate_core=info".parse().unwrap())
            .add_directive("warn".parse().unwrap())
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let translator = AnthropicTranslator::new(cli.api_key).with_model(cli.model);
    let options = JobOptions {
        language: cli.language,
        batch_size: cli.batch_size,
        ..JobOptions::default()
    };

    // A batch in flight runs to completion; the flag is read between batches.
    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current batch");
            flag.store(true, Ordering::SeqCst);
        }
    });

    match translate_file(&cli.input, &cli.output, &translator, &options, &interrupt).await? {
        Outcome::Completed => {}
        Outcome::Interrupted => info!("stopped early, partial translation kept"),
    }
    Ok(())
}
