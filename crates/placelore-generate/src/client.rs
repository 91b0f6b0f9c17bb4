//! HTTP client for the Workers AI chat endpoint.
//!
//! One POST per call to `{base_url}/accounts/{account_id}/ai/run/{model}`
//! with a bearer token. The generated text is read from
//! `result.response` in the JSON reply.

use std::env;
use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::ChatRequest;
use crate::error::GenerateError;
use crate::generator::{BoxFuture, GeneratedText, Generator};

pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

pub const MODEL_VAR: &str = "CONTENT_GENERATION_MODEL";
pub const API_TOKEN_VAR: &str = "CLOUDFLARE_API_TOKEN";
pub const ACCOUNT_ID_VAR: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const BASE_URL_VAR: &str = "GENERATION_BASE_URL";
pub const MAX_TOKENS_VAR: &str = "GENERATION_MAX_TOKENS";
pub const TIMEOUT_VAR: &str = "GENERATION_TIMEOUT_SECS";

/// Endpoint settings.
///
/// Credentials are optional here on purpose: a server without them still
/// serves cached content, and only generation requests fail.
#[derive(Clone)]
pub struct GenerationConfig {
    pub base_url: String,
    pub account_id: Option<String>,
    pub model: Option<String>,
    pub api_token: Option<String>,
    pub max_tokens: u32,
    /// `None` waits for the upstream indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            account_id: None,
            model: None,
            api_token: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field("model", &self.model)
            .field("api_token", &self.api_token.as_deref().map(redact_token))
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GenerationConfig {
    /// Read settings from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its raw
    /// value.
    ///
    /// Blank values count as unset. Unparsable optional values fall back to
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| non_empty(lookup(key));
        Self {
            base_url: var(BASE_URL_VAR).unwrap_or(defaults.base_url),
            account_id: var(ACCOUNT_ID_VAR),
            model: var(MODEL_VAR),
            api_token: var(API_TOKEN_VAR),
            max_tokens: parse_value(MAX_TOKENS_VAR, var(MAX_TOKENS_VAR))
                .unwrap_or(defaults.max_tokens),
            timeout: parse_value(TIMEOUT_VAR, var(TIMEOUT_VAR)).map(Duration::from_secs),
        }
    }

    /// Names of the required settings that are not present.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.model) {
            missing.push(MODEL_VAR);
        }
        if is_blank(&self.api_token) {
            missing.push(API_TOKEN_VAR);
        }
        if is_blank(&self.account_id) {
            missing.push(ACCOUNT_ID_VAR);
        }
        missing
    }

    fn target(&self) -> Result<Target<'_>, GenerateError> {
        match (&self.model, &self.api_token, &self.account_id) {
            (Some(model), Some(token), Some(account_id)) if self.missing().is_empty() => {
                Ok(Target {
                    url: format!(
                        "{}/accounts/{account_id}/ai/run/{model}",
                        self.base_url.trim_end_matches('/')
                    ),
                    model,
                    token,
                })
            }
            _ => Err(GenerateError::Configuration {
                missing: self.missing(),
            }),
        }
    }
}

struct Target<'a> {
    url: String,
    model: &'a str,
    token: &'a str,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T>
where
    T::Err: fmt::Display,
{
    let raw = raw?;
    raw.parse()
        .map_err(|e| warn!("invalid {key} value {raw:?}: {e}, using default"))
        .ok()
}

fn redact_token(token: &str) -> String {
    if token.len() <= 8 {
        return "****".to_string();
    }
    let suffix = token.get(token.len() - 4..).unwrap_or_default();
    format!("****{suffix}")
}

#[derive(Deserialize)]
struct RunResponse {
    result: Option<RunResult>,
}

#[derive(Deserialize)]
struct RunResult {
    response: Option<String>,
}

/// Pull the generated text out of a raw `/ai/run` response body.
pub fn extract_response_text(body: &[u8]) -> Result<String, GenerateError> {
    let parsed: RunResponse = serde_json::from_slice(body)
        .map_err(|e| GenerateError::Format(format!("response is not valid JSON: {e}")))?;

    parsed
        .result
        .and_then(|r| r.response)
        .ok_or_else(|| GenerateError::Format("response has no result.response text".to_string()))
}

/// Client for the generation endpoint. Cheap to share behind an `Arc`.
pub struct GenerationClient {
    http: reqwest::Client,
    config: GenerationConfig,
}

impl GenerationClient {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerateError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Ask the model for the history of `place`.
    pub async fn generate_history(&self, place: &str) -> Result<GeneratedText, GenerateError> {
        let target = self.config.target()?;
        let generation_id = Uuid::new_v4();
        let request = ChatRequest::history(place, self.config.max_tokens);

        info!(
            generation_id = %generation_id,
            model = target.model,
            place,
            "requesting generated content"
        );

        let response = self
            .http
            .post(&target.url)
            .bearer_auth(target.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                generation_id = %generation_id,
                status = status.as_u16(),
                body = %body,
                "generation service returned an error"
            );
            return Err(GenerateError::Upstream {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("application/json") {
            return Err(GenerateError::Format(format!(
                "expected a JSON response, got content type {content_type:?}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;
        let text = extract_response_text(&body)?;

        info!(
            generation_id = %generation_id,
            chars = text.len(),
            "generation complete"
        );

        Ok(GeneratedText {
            id: generation_id,
            model: target.model.to_string(),
            text,
        })
    }
}

impl Generator for GenerationClient {
    fn generate<'a>(
        &'a self,
        place: &'a str,
    ) -> BoxFuture<'a, Result<GeneratedText, GenerateError>> {
        Box::pin(self.generate_history(place))
    }
}
