//! Twilio REST client for outbound calls and SMS

use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_BASE: &str = "https://api.twilio.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum TwilioError {
    #[error("Twilio request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Twilio API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("Malformed Twilio response: {0}")]
    Malformed(String),
}

/// Account credentials and caller identity
#[derive(Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Number calls and messages are sent from
    pub phone_number: String,
    pub api_base: String,
}

impl TwilioConfig {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            phone_number: phone_number.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("phone_number", &self.phone_number)
            .field("api_base", &self.api_base)
            .finish()
    }
}

pub struct TwilioClient {
    client: Client,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    fn resource_url(&self, resource: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/{resource}.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Place an outbound call whose markup is fetched from `callback_url`.
    /// Returns the new call's SID.
    pub async fn create_call(&self, to: &str, callback_url: &str) -> Result<String, TwilioError> {
        let params = [
            ("To", to),
            ("From", self.config.phone_number.as_str()),
            ("Url", callback_url),
            ("Method", "POST"),
        ];
        self.post_resource("Calls", &params).await
    }

    /// Send an SMS from the configured number. Returns the message SID.
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<String, TwilioError> {
        let params = [
            ("To", to),
            ("From", self.config.phone_number.as_str()),
            ("Body", body),
        ];
        self.post_resource("Messages", &params).await
    }

    async fn post_resource(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<String, TwilioError> {
        let response = self
            .client
            .post(self.resource_url(resource))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        parse_sid(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ResourceResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
    #[serde(default)]
    code: Option<u32>,
}

fn parse_sid(body: &str) -> Result<String, TwilioError> {
    serde_json::from_str::<ResourceResponse>(body)
        .map(|r| r.sid)
        .map_err(|e| TwilioError::Malformed(format!("{e} - body: {body}")))
}

fn api_error(status: u16, body: &str) -> TwilioError {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            message,
            code: Some(code),
        }) => format!("{message} (code {code})"),
        Ok(ErrorResponse { message, .. }) => message,
        Err(_) => body.to_string(),
    };
    TwilioError::Api { status, message }
}
