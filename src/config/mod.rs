use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::ai::providers::build_http_client;
use crate::ai::{CompletionProvider, OllamaProvider, OpenAIProvider, ReviewGenerator};
use crate::cli::args::Args;
use crate::infrastructure::{LogFormat, LoggingConfig};
use crate::platforms::{
    local_directory, mock, Credentials, FacebookPlatform, LocalDirectoryPlatform, PlatformKind,
    ReviewPlatform, TrustpilotPlatform,
};

pub const CONFIG_FILE_NAME: &str = "review-agent.toml";
pub const SUPPORTED_PROVIDERS: &[&str] = &["openai", "ollama", "none"];

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: String,
    pub model: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_url: Option<String>,
    pub ollama_url: Option<String>,
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub reviews_dir: PathBuf,
    pub local_directory_url: String,
    pub local_directory_api_key: Option<String>,
    pub facebook_access_token: Option<String>,
    pub trustpilot_api_key: Option<String>,
    pub trustpilot_secret: Option<String>,
    /// Platforms to post to; `None` means every platform that can be used.
    pub platforms: Option<Vec<PlatformKind>>,
    pub log_level: String,
    pub log_format: String,
    /// The TOML file that was applied, if any
    pub config_file: Option<PathBuf>,
}

/// Shape of `review-agent.toml`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    provider: Option<String>,
    model: Option<String>,
    openai_api_key: Option<String>,
    openai_url: Option<String>,
    ollama_url: Option<String>,
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    reviews_dir: Option<PathBuf>,
    local_directory_url: Option<String>,
    local_directory_api_key: Option<String>,
    facebook_access_token: Option<String>,
    trustpilot_api_key: Option<String>,
    trustpilot_secret: Option<String>,
    platforms: Option<Vec<PlatformKind>>,
    log_level: Option<String>,
    log_format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: "openai".to_string(),
            model: None,
            openai_api_key: None,
            openai_url: None,
            ollama_url: None,
            timeout_secs: 60,
            temperature: None,
            max_tokens: None,
            reviews_dir: PathBuf::from(mock::DEFAULT_REVIEWS_DIR),
            local_directory_url: local_directory::DEFAULT_BASE_URL.to_string(),
            local_directory_api_key: None,
            facebook_access_token: None,
            trustpilot_api_key: None,
            trustpilot_secret: None,
            platforms: None,
            log_level: "warn".to_string(),
            log_format: "compact".to_string(),
            config_file: None,
        }
    }
}

/// Parse a comma-separated platform list such as `mock,facebook`.
pub fn parse_platforms(value: &str) -> anyhow::Result<Vec<PlatformKind>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::parse)
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl Config {
    /// Defaults, then the TOML file, then `.env` files, then the environment.
    pub fn new() -> anyhow::Result<Self> {
        let mut config = Config::default();

        let file = env::var("REVIEW_AGENT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME));
        if file.exists() {
            config.load_from_file(&file)?;
        }

        #[cfg(not(test))]
        config.load_from_env_file();
        config.load_from_env()?;

        Ok(config)
    }

    pub fn load_from_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let file: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        if let Some(provider) = file.provider {
            self.provider = provider;
        }
        self.model = file.model.or(self.model.take());
        self.openai_api_key = file.openai_api_key.or(self.openai_api_key.take());
        self.openai_url = file.openai_url.or(self.openai_url.take());
        self.ollama_url = file.ollama_url.or(self.ollama_url.take());
        if let Some(timeout) = file.timeout_secs {
            self.timeout_secs = timeout;
        }
        self.temperature = file.temperature.or(self.temperature);
        self.max_tokens = file.max_tokens.or(self.max_tokens);
        if let Some(dir) = file.reviews_dir {
            self.reviews_dir = dir;
        }
        if let Some(url) = file.local_directory_url {
            self.local_directory_url = url;
        }
        self.local_directory_api_key = file
            .local_directory_api_key
            .or(self.local_directory_api_key.take());
        self.facebook_access_token = file
            .facebook_access_token
            .or(self.facebook_access_token.take());
        self.trustpilot_api_key = file.trustpilot_api_key.or(self.trustpilot_api_key.take());
        self.trustpilot_secret = file.trustpilot_secret.or(self.trustpilot_secret.take());
        if let Some(platforms) = file.platforms {
            self.platforms = Some(platforms);
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        if let Some(format) = file.log_format {
            self.log_format = format;
        }

        self.config_file = Some(path.to_path_buf());
        Ok(())
    }

    pub fn load_from_env_file(&mut self) {
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(home).join(".review-agent").join(".env");
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) -> anyhow::Result<()> {
        self.load_from_lookup(|key| env::var(key).ok())
    }

    /// Apply variables from `lookup`; blank values are ignored.
    pub fn load_from_lookup<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(non_empty);

        if let Some(provider) = get("REVIEW_AGENT_PROVIDER") {
            self.provider = provider;
        }
        if let Some(model) = get("REVIEW_AGENT_MODEL") {
            self.model = Some(model);
        }
        if let Some(key) = get("REVIEW_AGENT_OPENAI_API_KEY").or_else(|| get("OPENAI_API_KEY")) {
            self.openai_api_key = Some(key);
        }
        if let Some(url) = get("REVIEW_AGENT_OPENAI_URL") {
            self.openai_url = Some(url);
        }
        if let Some(url) = get("REVIEW_AGENT_OLLAMA_URL") {
            self.ollama_url = Some(url);
        }
        if let Some(timeout) = get("REVIEW_AGENT_TIMEOUT") {
            self.timeout_secs = timeout
                .parse()
                .with_context(|| format!("REVIEW_AGENT_TIMEOUT must be a number of seconds, got '{}'", timeout))?;
        }
        if let Some(dir) = get("REVIEW_AGENT_REVIEWS_DIR") {
            self.reviews_dir = PathBuf::from(dir);
        }
        if let Some(url) = get("REVIEW_AGENT_LOCAL_DIRECTORY_URL") {
            self.local_directory_url = url;
        }
        if let Some(key) = get("REVIEW_AGENT_LOCAL_DIRECTORY_API_KEY") {
            self.local_directory_api_key = Some(key);
        }
        if let Some(token) = get("REVIEW_AGENT_FACEBOOK_TOKEN") {
            self.facebook_access_token = Some(token);
        }
        if let Some(key) = get("REVIEW_AGENT_TRUSTPILOT_API_KEY") {
            self.trustpilot_api_key = Some(key);
        }
        if let Some(secret) = get("REVIEW_AGENT_TRUSTPILOT_SECRET") {
            self.trustpilot_secret = Some(secret);
        }
        if let Some(platforms) = get("REVIEW_AGENT_PLATFORMS") {
            self.platforms = Some(
                parse_platforms(&platforms).context("REVIEW_AGENT_PLATFORMS is invalid")?,
            );
        }
        if let Some(level) = get("REVIEW_AGENT_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(format) = get("REVIEW_AGENT_LOG_FORMAT") {
            self.log_format = format;
        }

        Ok(())
    }

    /// Command-line flags take precedence over everything else.
    pub fn update_from_args(&mut self, args: &Args) {
        if let Some(provider) = args.provider.as_deref().filter(|p| !p.is_empty()) {
            self.provider = provider.to_string();
        }
        if let Some(model) = args.model.as_deref().filter(|m| !m.is_empty()) {
            self.model = Some(model.to_string());
        }
        if let Some(level) = args.log_level.as_deref().filter(|l| !l.is_empty()) {
            self.log_level = level.to_string();
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !SUPPORTED_PROVIDERS.contains(&self.provider.as_str()) {
            anyhow::bail!(
                "Unsupported provider: {} (expected one of: {})",
                self.provider,
                SUPPORTED_PROVIDERS.join(", ")
            );
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("Timeout must be greater than zero seconds");
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                anyhow::bail!("Temperature must be between 0.0 and 2.0, got {}", temperature);
            }
        }

        if matches!(&self.platforms, Some(platforms) if platforms.is_empty()) {
            anyhow::bail!("At least one platform must be selected");
        }

        self.logging_config()?;

        let urls = [
            ("OpenAI URL", self.openai_url.as_deref()),
            ("Ollama URL", self.ollama_url.as_deref()),
            ("Local directory URL", Some(self.local_directory_url.as_str())),
        ];
        for (label, url) in urls {
            if let Some(url) = url {
                url::Url::parse(url).with_context(|| format!("{} is not a valid URL: {}", label, url))?;
            }
        }

        Ok(())
    }

    pub fn logging_config(&self) -> anyhow::Result<LoggingConfig> {
        let format: LogFormat = self.log_format.parse()?;
        Ok(LoggingConfig::from_level(&self.log_level)?.with_format(format))
    }

    /// Whether posting to `kind` is allowed by the `platforms` selection.
    pub fn platform_enabled(&self, kind: PlatformKind) -> bool {
        match &self.platforms {
            Some(platforms) => platforms.contains(&kind),
            None => true,
        }
    }

    fn platform_selected(&self, kind: PlatformKind) -> bool {
        matches!(&self.platforms, Some(platforms) if platforms.contains(&kind))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Completion provider for the configured backend. `None` means reviews
    /// come from the fallback template: provider `none`, or `openai` without a key.
    pub fn generation_provider(&self) -> anyhow::Result<Option<Box<dyn CompletionProvider>>> {
        match self.provider.as_str() {
            "openai" => match &self.openai_api_key {
                Some(key) => {
                    let client = build_http_client(self.timeout())?;
                    Ok(Some(Box::new(OpenAIProvider::new(
                        client,
                        key.clone(),
                        self.openai_url.clone(),
                        self.model.clone(),
                    ))))
                }
                None => {
                    tracing::info!("no OpenAI API key configured, using the fallback template");
                    Ok(None)
                }
            },
            "ollama" => {
                let client = build_http_client(self.timeout())?;
                Ok(Some(Box::new(OllamaProvider::new(
                    client,
                    self.ollama_url.clone(),
                    self.model.clone(),
                ))))
            }
            "none" => Ok(None),
            other => anyhow::bail!("Unsupported provider: {}", other),
        }
    }

    pub fn review_generator(&self) -> anyhow::Result<ReviewGenerator> {
        let mut generator = match self.generation_provider()? {
            Some(provider) => ReviewGenerator::new(provider),
            None => ReviewGenerator::fallback_only(),
        };

        if let Some(model) = &self.model {
            generator = generator.with_model(model.clone());
        }
        if let Some(temperature) = self.temperature {
            generator = generator.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            generator = generator.with_max_tokens(max_tokens);
        }

        Ok(generator)
    }

    /// Remote platforms that are enabled and have credentials. The local
    /// directory is only included when selected explicitly.
    pub fn extra_platforms(&self) -> Vec<(Box<dyn ReviewPlatform>, Credentials)> {
        let mut platforms: Vec<(Box<dyn ReviewPlatform>, Credentials)> = Vec::new();

        if self.platform_selected(PlatformKind::LocalDirectory) {
            platforms.push((
                Box::new(LocalDirectoryPlatform::new(self.local_directory_url.clone())),
                self.local_directory_credentials(),
            ));
        }

        if let Some(token) = self
            .facebook_access_token
            .as_ref()
            .filter(|_| self.platform_enabled(PlatformKind::Facebook))
        {
            platforms.push((
                Box::new(FacebookPlatform::new()),
                Credentials::new().with("access_token", token.clone()),
            ));
        } else if self.platform_selected(PlatformKind::Facebook) {
            tracing::warn!(
                platform = PlatformKind::Facebook.display_name(),
                "selected but no access token configured"
            );
        }

        match (&self.trustpilot_api_key, &self.trustpilot_secret) {
            (Some(key), Some(secret)) if self.platform_enabled(PlatformKind::Trustpilot) => {
                platforms.push((
                    Box::new(TrustpilotPlatform::new()),
                    Credentials::new()
                        .with("api_key", key.clone())
                        .with("secret", secret.clone()),
                ));
            }
            _ if self.platform_selected(PlatformKind::Trustpilot) => {
                tracing::warn!(
                    platform = PlatformKind::Trustpilot.display_name(),
                    "selected but no API key and secret configured"
                );
            }
            _ => {}
        }

        if self.platform_selected(PlatformKind::Google) {
            tracing::warn!(
                platform = PlatformKind::Google.display_name(),
                "selected but needs a browser driver, skipping"
            );
        }

        platforms
    }

    pub fn local_directory_credentials(&self) -> Credentials {
        match &self.local_directory_api_key {
            Some(key) => Credentials::new().with("api_key", key.clone()),
            None => Credentials::new(),
        }
    }
}
