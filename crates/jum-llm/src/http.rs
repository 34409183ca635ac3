use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CompletionOptions, ModelClient, ModelError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for an OpenAI-compatible `/chat/completions` endpoint, typically a
/// local server (Ollama, LM Studio, llama.cpp).
pub struct HttpModelClient {
    base_url: String,
    model: String,
    client: Client,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpModelClient {
    pub fn new(base_url: &str, model: impl Into<String>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            model: model.into(),
            client: Client::new(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) if !key.is_empty() => builder.header("Authorization", format!("Bearer {key}")),
            _ => builder,
        }
    }

    /// Check that the server answers `GET /models`.
    pub async fn health_check(&self) -> Result<(), ModelError> {
        let builder = self
            .client
            .get(format!("{}/models", self.base_url))
            .timeout(Duration::from_secs(5));
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ModelError::Upstream(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ModelError::Upstream(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    async fn send_completion(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ModelError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = options.system {
            messages.push(ChatMessage {
                role: "system".into(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".into(),
            content: prompt.to_string(),
        });

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        debug!(
            "POST {}/chat/completions (model={}, prompt={} bytes)",
            self.base_url,
            self.model,
            prompt.len()
        );

        let builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(parse_error_with_status(status, resp).await);
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ModelError::Upstream("response contained no completion".into()))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ModelError {
        if e.is_timeout() {
            ModelError::Timeout(self.timeout)
        } else {
            ModelError::Upstream(e.to_string())
        }
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ModelError> {
        match tokio::time::timeout(self.timeout, self.send_completion(prompt, options)).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::Timeout(self.timeout)),
        }
    }
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ModelError {
    let body = resp.text().await.unwrap_or_default();
    let msg = error_message(&body).unwrap_or(body);
    ModelError::Upstream(format!("{status}: {msg}"))
}

/// Pull a message out of `{"error": "..."}` or `{"error": {"message": "..."}}`.
fn error_message(body: &str) -> Option<String> {
    let v = serde_json::from_str::<serde_json::Value>(body).ok()?;
    let err = &v["error"];
    err.as_str()
        .or_else(|| err["message"].as_str())
        .map(String::from)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
