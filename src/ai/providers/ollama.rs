use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{trim_base_url, CompletionProvider, CompletionRequest};

/// Local Ollama provider
pub struct OllamaProvider {
    client: Arc<reqwest::Client>,
    config: OllamaProviderConfig,
}

#[derive(Debug, Clone)]
struct OllamaProviderConfig {
    base_url: String,
    default_model: String,
}

#[derive(Debug, Serialize)]
struct OllamaApiRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    // Ollama calls max_tokens num_predict
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaApiResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorResponse {
    error: String,
}

impl OllamaProvider {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";
    pub const DEFAULT_MODEL: &'static str = "llama3";

    pub fn new(
        client: Arc<reqwest::Client>,
        base_url: Option<String>,
        default_model: Option<String>,
    ) -> Self {
        let config = OllamaProviderConfig {
            base_url: trim_base_url(base_url.as_deref().unwrap_or(Self::DEFAULT_BASE_URL)),
            default_model: default_model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
        };

        Self { client, config }
    }

    fn build_request(&self, request: &CompletionRequest) -> OllamaApiRequest {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());

        let options = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            })
        } else {
            None
        };

        OllamaApiRequest {
            model,
            prompt: request.prompt.clone(),
            stream: false,
            options,
        }
    }

    async fn send_request(&self, request: &OllamaApiRequest) -> Result<OllamaApiResponse> {
        let url = format!("{}/api/generate", self.config.base_url);
        tracing::debug!(url = %url, model = %request.model, "sending Ollama generate request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request to Ollama: {}", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read Ollama response: {}", e))?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<OllamaErrorResponse>(&response_text) {
                return Err(anyhow!("Ollama API error: {}", error_response.error));
            }
            return Err(anyhow!("Ollama API error {}: {}", status, response_text));
        }

        serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Failed to parse Ollama response: {}", e))
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.build_request(request);
        let response = self.send_request(&body).await?;
        Ok(response.response.trim().to_string())
    }
}
