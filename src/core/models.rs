//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::core::errors::{ErrorKind, TranslationError};

/// Translation mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Free-form translation
    #[default]
    Translate,
    /// Dictionary-style explanation of a word or phrase
    Dictionary,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Translate => write!(f, "translate"),
            Mode::Dictionary => write!(f, "dictionary"),
        }
    }
}

/// Translation request
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub mode: Mode,
}

impl TranslationRequest {
    /// Request with `auto` source detection in translate mode
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: "auto".to_string(),
            target_lang: target_lang.into(),
            mode: Mode::Translate,
        }
    }

    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

/// Outcome of one translation call. Failures are values, not errors.
#[derive(Debug, Clone)]
pub struct TranslationResult {
    pub success: bool,
    pub original_text: String,
    pub translated_text: Option<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub model: Option<String>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl TranslationResult {
    pub fn succeeded(
        request: &TranslationRequest,
        translated_text: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            original_text: request.text.clone(),
            translated_text: Some(translated_text.into()),
            source_lang: request.source_lang.clone(),
            target_lang: request.target_lang.clone(),
            model: Some(model.into()),
            error: None,
            error_kind: None,
        }
    }

    pub fn failed(request: &TranslationRequest, error: &TranslationError) -> Self {
        Self {
            success: false,
            original_text: request.text.clone(),
            translated_text: None,
            source_lang: request.source_lang.clone(),
            target_lang: request.target_lang.clone(),
            model: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Raw completion returned by the remote client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    /// Model the provider says it routed to
    pub model: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl Completion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: None,
            usage: None,
        }
    }
}
