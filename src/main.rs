//! Main entry point for Tiny Translator backend

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiny_translator::cli::commands::{self, Commands};
use tiny_translator::AppConfig;

/// Tiny Translator - local translation backend
#[derive(Parser, Debug)]
#[command(name = "tiny-translator", version, about, long_about = None)]
struct Args {
    /// Provider API key (optional, defaults to OPENROUTER_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();
    let mut config = AppConfig::from_env()?;

    if let Some(api_key) = args.api_key {
        config.provider.api_key = Some(api_key);
    }

    let serve_debug = matches!(args.command, Some(Commands::Serve { debug: true, .. }));
    let log_level = if args.verbose || config.debug || serve_debug {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tiny_translator={log_level},tower_http={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match args.command {
        Some(Commands::Serve { host, port, debug }) => {
            commands::handle_serve(config, host, port, debug).await?;
        }
        Some(Commands::Translate {
            text,
            source_lang,
            target_lang,
            mode,
        }) => {
            commands::handle_translate(config, text, source_lang, target_lang, mode).await?;
        }
        Some(Commands::Languages) => commands::handle_languages(),
        None => {
            commands::handle_serve(config, None, None, false).await?;
        }
    }

    Ok(())
}
