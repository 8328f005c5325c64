//! LLM provider abstraction
//!
//! The voice assistant talks to one chat completion provider; the trait keeps
//! the turn logic independent of the wire format and lets tests substitute it.

mod error;
mod openai;
mod types;

pub use error::LlmError;
#[cfg(test)]
pub use error::LlmErrorKind;
pub use openai::{OpenAIModel, OpenAIService};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Configuration for the completion provider
#[derive(Clone, Default)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    /// OpenAI-compatible gateway base URL; the gateway handles authentication
    pub gateway: Option<String>,
    pub model: OpenAIModel,
    pub max_tokens: Option<u32>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("gateway", &self.gateway)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Build the configured provider, wrapped with request logging
pub fn build_service(config: &LlmConfig) -> Result<Arc<dyn LlmService>, LlmError> {
    // In gateway mode, use "implicit" as the API key
    let api_key = match (&config.gateway, &config.openai_api_key) {
        (Some(_), _) => "implicit".to_string(),
        (None, Some(key)) if !key.is_empty() => key.clone(),
        (None, _) => return Err(LlmError::auth("OPENAI_API_KEY is not set")),
    };

    let service = OpenAIService::new(api_key, config.model, config.gateway.as_deref())?;
    Ok(Arc::new(LoggingService::new(Arc::new(service))))
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    messages = request.messages.len(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    end_turn = response.end_turn,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    transient = e.kind.is_transient(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
