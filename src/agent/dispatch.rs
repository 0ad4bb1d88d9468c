use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use super::gate::{DispatchOutcome, ResponseGate};
use super::prompt::{GenerationRequest, DEFAULT_MAX_RECORDS, DEFAULT_MODEL};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Shown when the service answers without any text.
pub const NO_RESPONSE: &str = "No response generated.";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("configuration error: {0}")]
    Config(String),
}

/// Connection settings for the generation service. Built by the caller;
/// nothing here reads the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub max_records: usize,
    pub timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_records: DEFAULT_MAX_RECORDS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, DispatchError>;
}

/// `generateContent` client for Gemini-compatible endpoints.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &DispatchConfig) -> Result<Self, DispatchError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DispatchError::Config("no API key configured".into()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, model)
    }
}

pub fn request_body(request: &GenerationRequest) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
        "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
    })
}

/// Concatenated text parts of the first candidate, or [`NO_RESPONSE`].
pub fn response_text(body: &Value) -> String {
    let text: String = body["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();
    if text.is_empty() {
        NO_RESPONSE.to_string()
    } else {
        text
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, DispatchError> {
        let res = self
            .client
            .post(self.url(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(request))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let raw = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&raw)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(raw);
            return Err(DispatchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = res.json().await?;
        Ok(response_text(&body))
    }
}

/// Sends requests through a [`GenerationService`], dropping responses that
/// arrive after a newer request was issued.
pub struct Dispatcher<S> {
    service: S,
    gate: ResponseGate,
}

impl<S: GenerationService> Dispatcher<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            gate: ResponseGate::new(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn dispatch(&self, request: GenerationRequest) -> DispatchOutcome {
        let token = self.gate.issue();
        tracing::info!(model = %request.model, "dispatching agent request");
        let result = self.service.generate(&request).await;

        if !self.gate.is_current(token) {
            tracing::debug!("discarding superseded response");
            return DispatchOutcome::Superseded;
        }
        match result {
            Ok(text) => DispatchOutcome::Completed(text),
            Err(e) => {
                tracing::warn!(error = %e, "agent request failed");
                DispatchOutcome::Failed(format!("Error executing agent: {e}"))
            }
        }
    }
}
