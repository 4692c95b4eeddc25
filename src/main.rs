//! Main entry point for NiuTrans Translator CLI

#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use niutrans_translator::cli::commands::{self, Commands};
use niutrans_translator::{Translator, TranslatorConfig};

/// NiuTrans Translator - HTML-aware cached machine translation
#[derive(Parser, Debug)]
#[command(name = "niutrans-translator", version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON, TOML or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API key for NiuTrans (optional, defaults to NIUTRANS_API_KEY env var)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Directory holding the translation cache and suggestion file
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}={}", env!("CARGO_CRATE_NAME"), log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(command) = args.command else {
        println!("Please specify a command. Use --help for more information.");
        return Ok(());
    };

    // Override config with CLI args if provided
    let mut config = TranslatorConfig::load(args.config.as_deref())?;
    if let Some(api_key) = args.api_key {
        config.api_key = api_key;
    }
    if let Some(cache_dir) = args.cache_dir {
        config.cache_dir = cache_dir;
    }

    let translator = Translator::from_config(&config)?;

    match command {
        Commands::Translate {
            input,
            output,
            to,
            from,
            recursive,
        } => commands::handle_translate(&translator, input, output, to, from, recursive),
        Commands::Suggest {
            from,
            to,
            source,
            target,
        } => commands::handle_suggest(&translator, from, to, source, target),
        Commands::Detect { text } => commands::handle_detect(&translator, text),
    }
}
