//! Tiny Translator - local translation backend
//!
//! Forwards captured text to a chat-completion provider for translation or
//! dictionary-style explanation and serves the result over HTTP.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use self::core::{
    client::{CompletionBackend, RemoteClient},
    config::{AppConfig, ProviderConfig},
    errors::{ConfigError, ErrorKind, ProviderError, TranslationError},
    models::{Completion, Mode, TranslationRequest, TranslationResult},
    prompt::{build_prompt, language_name},
    translator::Translator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
