//! Service configuration from environment variables
//!
//! Read once at startup. A missing required variable is fatal.

use crate::llm::{LlmConfig, OpenAIModel};
use crate::telephony::TwilioConfig;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    /// Externally reachable base URL, without a trailing slash
    pub public_base_url: String,
    pub twilio: TwilioConfig,
    /// Recipient of end-of-call notifications
    pub notify_number: String,
    pub llm: LlmConfig,
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = match get("VOICEBOT_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "VOICEBOT_PORT",
                reason: format!("{raw:?} is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };

        let db_path = match get("VOICEBOT_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => {
                let home = get("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".voicebot").join("transcripts.db")
            }
        };

        let mut twilio = TwilioConfig::new(
            require("TWILIO_ACCOUNT_SID")?,
            require("TWILIO_AUTH_TOKEN")?,
            require("TWILIO_PHONE_NUMBER")?,
        );
        if let Some(base) = get("TWILIO_API_BASE") {
            twilio.api_base = base.trim_end_matches('/').to_string();
        }

        let gateway = get("LLM_GATEWAY");
        let openai_api_key = get("OPENAI_API_KEY");
        if gateway.is_none() && openai_api_key.is_none() {
            return Err(ConfigError::Missing("OPENAI_API_KEY"));
        }

        let model = match get("DEFAULT_MODEL") {
            Some(name) => OpenAIModel::from_api_name(&name).ok_or(ConfigError::Invalid {
                var: "DEFAULT_MODEL",
                reason: format!("unknown model {name:?}"),
            })?,
            None => OpenAIModel::default(),
        };

        let max_tokens = get("LLM_MAX_TOKENS")
            .map(|raw| {
                raw.parse::<u32>().map_err(|_| ConfigError::Invalid {
                    var: "LLM_MAX_TOKENS",
                    reason: format!("{raw:?} is not a token count"),
                })
            })
            .transpose()?;

        Ok(Self {
            port,
            db_path,
            public_base_url: require("PUBLIC_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            twilio,
            notify_number: require("NOTIFY_PHONE_NUMBER")?,
            llm: LlmConfig {
                openai_api_key,
                gateway,
                model,
                max_tokens,
            },
        })
    }

    /// Webhook URL the provider posts gathered speech to
    pub fn voice_callback_url(&self) -> String {
        format!("{}/voice_response", self.public_base_url)
    }
}
