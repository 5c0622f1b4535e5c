//! CLI command definitions and handlers

use clap::{Subcommand, ValueEnum};
use tracing::info;

use crate::core::config::AppConfig;
use crate::core::models::{Mode, TranslationRequest};
use crate::core::prompt::supported_languages;
use crate::core::translator::Translator;

/// Commands for Tiny Translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP API server (default)
    Serve {
        /// Bind address (default: HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (default: PORT or 8765)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable debug mode
        #[arg(long)]
        debug: bool,
    },

    /// Translate text once and print the result
    Translate {
        /// Text to translate
        text: String,

        /// Source language (default: DEFAULT_SOURCE_LANG or auto)
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language (default: DEFAULT_TARGET_LANG or zh-CN)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Translation mode
        #[arg(short, long, value_enum, default_value_t = ModeArg::Translate)]
        mode: ModeArg,
    },

    /// List language codes with built-in display names
    Languages,
}

/// Mode as accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    Translate,
    Dictionary,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Translate => Mode::Translate,
            ModeArg::Dictionary => Mode::Dictionary,
        }
    }
}

/// Handle server command
pub async fn handle_serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    debug: bool,
) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    config.debug |= debug;

    info!("Starting HTTP server on {}", config.bind_addr());
    println!("🚀 Server starting on http://{}", config.bind_addr());
    println!("📄 OpenAPI: http://{}/api-docs/openapi.json", config.bind_addr());

    run_server(config).await
}

/// Handle one-shot translation command
pub async fn handle_translate(
    config: AppConfig,
    text: String,
    source_lang: Option<String>,
    target_lang: Option<String>,
    mode: ModeArg,
) -> anyhow::Result<()> {
    let translator = Translator::from_config(&config.provider)?;

    let request = TranslationRequest::new(
        text,
        target_lang.unwrap_or(config.default_target_lang),
    )
    .with_source_lang(source_lang.unwrap_or(config.default_source_lang))
    .with_mode(mode.into());

    let result = translator.translate(&request).await?;

    match (result.success, result.translated_text) {
        (true, Some(translated)) => {
            println!("{}", translated);
            Ok(())
        }
        _ => anyhow::bail!(
            "{}",
            result.error.unwrap_or_else(|| "Translation failed".to_string())
        ),
    }
}

/// Handle languages command
pub fn handle_languages() {
    for (code, name) in supported_languages() {
        println!("{:<6} {}", code, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_arg_conversion() {
        assert_eq!(Mode::from(ModeArg::Dictionary), Mode::Dictionary);
        assert_eq!(Mode::from(ModeArg::Translate), Mode::Translate);
    }

    #[tokio::test]
    async fn test_translate_without_key_fails() {
        let err = handle_translate(AppConfig::default(), "Hello".to_string(), None, None, ModeArg::Translate)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }
}
