use anyhow::bail;

use crate::ai::fallback::fallback_review;
use crate::ai::prompt;
use crate::ai::providers::{CompletionProvider, CompletionRequest};
use crate::models::{GeneratedReview, ReviewInput};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 400;

/// Turns a `ReviewInput` into review text. Never fails: any provider error
/// falls back to the deterministic template.
pub struct ReviewGenerator {
    provider: Option<Box<dyn CompletionProvider>>,
    prompt_template: Option<String>,
    model: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl ReviewGenerator {
    pub fn new(provider: Box<dyn CompletionProvider>) -> Self {
        Self {
            provider: Some(provider),
            ..Self::fallback_only()
        }
    }

    /// Generator that always uses the template.
    pub fn fallback_only() -> Self {
        Self {
            provider: None,
            prompt_template: None,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.name())
    }

    pub async fn generate(&self, input: &ReviewInput) -> GeneratedReview {
        let Some(provider) = self.provider.as_deref() else {
            tracing::debug!(business = input.business_name(), "no completion provider, using template");
            return GeneratedReview::from_fallback(fallback_review(input));
        };

        match self.generate_with(provider, input).await {
            Ok(text) => {
                tracing::info!(provider = provider.name(), "review generated");
                GeneratedReview::from_service(text, provider.name())
            }
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    error = %e,
                    "review generation failed, using fallback template"
                );
                GeneratedReview::from_fallback(fallback_review(input))
            }
        }
    }

    async fn generate_with(
        &self,
        provider: &dyn CompletionProvider,
        input: &ReviewInput,
    ) -> anyhow::Result<String> {
        let prompt = match &self.prompt_template {
            Some(template) => prompt::render_with_template(template, input)?,
            None => prompt::render_prompt(input)?,
        };

        let mut request = CompletionRequest::new(prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        let text = provider.complete(&request).await?;
        let text = text.trim();
        if text.is_empty() {
            bail!("{} returned an empty completion", provider.name());
        }

        Ok(text.to_string())
    }
}
