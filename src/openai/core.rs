use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

/// One role-tagged turn of a conversation in the OpenAI chat format.
/// Fields are private so a message can't be edited once it's been
/// added to a transcript.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Sampling settings sent along with every completion request.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub stream: bool,
}

impl CompletionParams {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            temperature: 0.3,
            top_p: 0.9,
            stream: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    /// The endpoint answered `429 Too Many Requests`
    #[error("rate limited by completion endpoint: {0}")]
    RateLimited(String),
    #[error("completion endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("no message received in completion response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CompletionError::RateLimited(_))
    }
}

/// A remote chat completion call. Takes the full conversation and
/// returns the assistant's reply text.
#[async_trait]
pub trait ChatCompletion {
    async fn complete(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<String, CompletionError>;
}

pub type BoxedChatCompletion = Box<dyn ChatCompletion + Send + Sync + 'static>;

pub async fn completion(
    client: &reqwest::Client,
    messages: &[Message],
    params: &CompletionParams,
    endpoint: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<String, CompletionError> {
    let payload = json!({
        "model": params.model,
        "messages": messages,
        "temperature": params.temperature,
        "top_p": params.top_p,
        "stream": params.stream,
    });
    let url = format!("{}/chat/completions", endpoint.trim_end_matches("/"));
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(timeout)
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let body = response.text().await.unwrap_or_default();
        return Err(CompletionError::RateLimited(body));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CompletionError::Status { status, body });
    }

    let resp: Value = response.json().await?;
    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CompletionError::MalformedResponse(resp.to_string()))
}

/// Client for any OpenAI compatible `/chat/completions` endpoint
/// e.g. GitHub Models, Azure AI inference, or a local server.
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(
        &self,
        messages: &[Message],
        params: &CompletionParams,
    ) -> Result<String, CompletionError> {
        tracing::debug!(
            "Requesting completion from {} with {} messages",
            self.endpoint,
            messages.len()
        );
        completion(
            &self.http,
            messages,
            params,
            &self.endpoint,
            &self.api_key,
            self.timeout,
        )
        .await
    }
}
