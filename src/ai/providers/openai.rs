use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{trim_base_url, CompletionProvider, CompletionRequest};

/// OpenAI chat-completions provider. Works with any OpenAI-compatible endpoint.
pub struct OpenAIProvider {
    client: Arc<reqwest::Client>,
    config: OpenAIProviderConfig,
}

#[derive(Debug, Clone)]
struct OpenAIProviderConfig {
    api_key: String,
    base_url: String,
    default_model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorBody {
    message: String,
}

impl OpenAIProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-3.5-turbo";

    pub fn new(
        client: Arc<reqwest::Client>,
        api_key: String,
        base_url: Option<String>,
        default_model: Option<String>,
    ) -> Self {
        let config = OpenAIProviderConfig {
            api_key,
            base_url: trim_base_url(base_url.as_deref().unwrap_or(Self::DEFAULT_BASE_URL)),
            default_model: default_model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
        };

        Self { client, config }
    }

    fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());

        ChatCompletionRequest {
            model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let url = format!("{}/chat/completions", self.config.base_url);
        tracing::debug!(url = %url, model = %body.model, "sending OpenAI completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request to OpenAI: {}", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read OpenAI response: {}", e))?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(&response_text) {
                return Err(anyhow!(
                    "OpenAI API error {}: {}",
                    status,
                    error_response.error.message
                ));
            }
            return Err(anyhow!("OpenAI API error {}: {}", status, response_text));
        }

        serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Failed to parse OpenAI response: {}", e))
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.build_request(request);
        let response = self.send_request(&body).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| anyhow!("OpenAI response contained no choices"))
    }
}
