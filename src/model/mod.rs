pub mod prompt;

use std::time::Duration;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::{info, debug, error};

use crate::config::Config;
use crate::error::CompletionError;

pub const MODEL_ID: &str = "deepseek/deepseek-r1:free";

/// Sampling settings for one kind of call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

pub const GENERATION: CallParams = CallParams {
    temperature: 0.7,
    max_tokens: 1500,
    timeout_seconds: 45,
};

pub const TRANSLATION: CallParams = CallParams {
    temperature: 0.3,
    max_tokens: 2000,
    timeout_seconds: 60,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: &'static str,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip)]
    pub timeout_seconds: u64,
}

impl CompletionRequest {
    pub fn new(prompt: &str, params: CallParams) -> Self {
        Self {
            model: MODEL_ID,
            messages: vec![Message {
                role: Role::User,
                content: prompt.to_string(),
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            timeout_seconds: params.timeout_seconds,
        }
    }
}

// Client for the OpenRouter chat-completion endpoint
pub struct CompletionClient {
    api_url: String,
    api_key: String,
    referer: String,
    title: String,
    client: Client,
}

impl CompletionClient {
    pub fn new(config: &Config) -> Result<Self, CompletionError> {
        if config.api_key.trim().is_empty() {
            return Err(CompletionError::Configuration("API key is empty".to_string()));
        }

        info!("Using completion endpoint at: {}", config.api_url);

        Ok(Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            referer: config.referer.clone(),
            title: config.title.clone(),
            client: Client::new(),
        })
    }

    pub async fn complete(&self, prompt: &str, params: CallParams) -> Result<String, CompletionError> {
        self.send(CompletionRequest::new(prompt, params)).await
    }

    pub async fn send(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        info!(
            "Sending completion request (max_tokens: {}, temperature: {}, timeout: {}s)",
            request.max_tokens, request.temperature, request.timeout_seconds
        );
        debug!("Payload: {}", serde_json::to_string(&request).unwrap_or_default());

        let timeout = request.timeout_seconds;
        let response = self.client.post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .timeout(Duration::from_secs(timeout))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(e, timeout))?;

        if !status.is_success() {
            error!("API request failed with status {}: {}", status, body);
            return Err(CompletionError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let content = extract_content(&body)?;
        info!("Response length: {} characters", content.len());
        Ok(content)
    }
}

fn transport_error(err: reqwest::Error, timeout: u64) -> CompletionError {
    if err.is_timeout() {
        error!("Completion request timed out after {}s", timeout);
        CompletionError::Timeout(timeout)
    } else {
        error!("Completion request failed: {}", err);
        CompletionError::Network(err.to_string())
    }
}

/// Pulls `choices[0].message.content` out of a response body.
pub fn extract_content(body: &str) -> Result<String, CompletionError> {
    let response_json: Value = serde_json::from_str(body)
        .map_err(|e| CompletionError::Parse(format!("malformed JSON: {}", e)))?;
    debug!("Response JSON: {}", response_json);

    let content = response_json
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .ok_or_else(|| CompletionError::Parse("missing choices[0].message.content".to_string()))?;

    if content.trim().is_empty() {
        return Err(CompletionError::Parse("response content is empty".to_string()));
    }

    Ok(content.to_string())
}
