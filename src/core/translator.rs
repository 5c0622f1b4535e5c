//! Translation orchestration: validate, build prompt, dispatch, normalize

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::core::client::{CompletionBackend, RemoteClient};
use crate::core::config::ProviderConfig;
use crate::core::errors::{ProviderError, Result, TranslationError};
use crate::core::models::{TranslationRequest, TranslationResult};
use crate::core::prompt::build_prompt;

/// Stateless translation service shared by all request handlers
#[derive(Debug, Clone)]
pub struct Translator {
    backend: Option<Arc<dyn CompletionBackend>>,
    model: String,
}

impl Translator {
    /// Create a translator over an injected backend.
    ///
    /// `None` leaves the service inert: every call reports `NotConfigured`.
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Create a translator talking to the configured provider
    pub fn from_config(config: &ProviderConfig) -> std::result::Result<Self, ProviderError> {
        let backend = RemoteClient::new(config.clone())?
            .map(|client| Arc::new(client) as Arc<dyn CompletionBackend>);

        if backend.is_none() {
            warn!("OPENROUTER_API_KEY not set. Translation will not work.");
        }

        Ok(Self::new(backend, config.model.clone()))
    }

    /// Whether a provider credential was configured
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Model identifier sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Translate one request.
    ///
    /// Configuration, validation and provider failures come back as a
    /// failed `TranslationResult`; only internal errors are returned as `Err`.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        match self.run(request).await {
            Ok(translated) => {
                info!("Translation successful: {} chars", translated.chars().count());
                Ok(TranslationResult::succeeded(request, translated, &self.model))
            }
            Err(e @ TranslationError::InternalError(_)) => {
                error!("Translation aborted: {}", e);
                Err(e)
            }
            Err(e) => {
                warn!("Translation failed ({}): {}", e.kind(), e);
                Ok(TranslationResult::failed(request, &e))
            }
        }
    }

    async fn run(&self, request: &TranslationRequest) -> Result<String> {
        let backend = self.backend.as_ref().ok_or(TranslationError::NotConfigured)?;

        if request.text.trim().is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        info!(
            "Translating text ({} chars) {} -> {}, mode: {}",
            request.text.chars().count(),
            request.source_lang,
            request.target_lang,
            request.mode
        );

        let prompt = build_prompt(
            &request.text,
            &request.source_lang,
            &request.target_lang,
            request.mode,
        );

        let completion = backend
            .complete(&prompt, &self.model)
            .await
            .map_err(|e| match e {
                ProviderError::RequestError { message } => TranslationError::InternalError(message),
                other => TranslationError::RemoteFailure(other),
            })?;

        if let Some(routed) = completion.model.as_deref().filter(|m| *m != self.model) {
            debug!("Provider routed {} to {}", self.model, routed);
        }
        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let translated = completion.content.trim();
        if translated.is_empty() {
            return Err(ProviderError::InvalidResponseError {
                message: "Empty completion returned".to_string(),
            }
            .into());
        }

        Ok(translated.to_string())
    }
}
