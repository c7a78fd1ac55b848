pub mod facebook;
pub mod google;
pub mod local_directory;
pub mod mock;
pub mod slug;
pub mod store;
pub mod trustpilot;

pub use facebook::FacebookPlatform;
pub use google::{BrowserDriver, GooglePlatform};
pub use local_directory::LocalDirectoryPlatform;
pub use mock::MockPlatform;
pub use slug::business_slug;
pub use store::{FileReviewStore, MemoryReviewStore, ReviewStore};
pub use trustpilot::TrustpilotPlatform;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infrastructure::PlatformError;
use crate::models::{BusinessId, PostReceipt, Rating};

/// The closed set of supported review platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    Mock,
    LocalDirectory,
    Facebook,
    Trustpilot,
    Google,
}

impl PlatformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Mock => "mock",
            PlatformKind::LocalDirectory => "local_directory",
            PlatformKind::Facebook => "facebook",
            PlatformKind::Trustpilot => "trustpilot",
            PlatformKind::Google => "google",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformKind::Mock => "Mock",
            PlatformKind::LocalDirectory => "Local Directory",
            PlatformKind::Facebook => "Facebook",
            PlatformKind::Trustpilot => "Trustpilot",
            PlatformKind::Google => "Google Reviews",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "mock" => Ok(PlatformKind::Mock),
            "local_directory" | "local" => Ok(PlatformKind::LocalDirectory),
            "facebook" => Ok(PlatformKind::Facebook),
            "trustpilot" => Ok(PlatformKind::Trustpilot),
            "google" => Ok(PlatformKind::Google),
            other => anyhow::bail!("Unsupported platform: {}", other),
        }
    }
}

/// Login fields such as `api_key`, `access_token` or `email`/`password`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Fetch a required field, rejecting missing or blank values.
    pub fn require(&self, platform: &str, field: &str) -> Result<&str, PlatformError> {
        match self.get(field) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(PlatformError::invalid_credentials(
                platform,
                format!("{} is required", field),
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Credentials(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A review platform. Instances start unauthenticated; `search_business` and
/// `post_review` fail with `AuthenticationRequired` until `login` succeeds.
#[async_trait]
pub trait ReviewPlatform: Send + Sync {
    /// Display name used in logs and stored records
    fn name(&self) -> &str;

    fn kind(&self) -> PlatformKind;

    fn is_authenticated(&self) -> bool;

    async fn login(&mut self, credentials: &Credentials) -> Result<bool, PlatformError>;

    async fn search_business(
        &self,
        business_name: &str,
        location: Option<&str>,
    ) -> Result<BusinessId, PlatformError>;

    async fn post_review(
        &self,
        business_id: &BusinessId,
        review_text: &str,
        rating: Rating,
    ) -> Result<PostReceipt, PlatformError>;
}

pub(crate) fn require_login(
    authenticated: bool,
    platform: &str,
    operation: &'static str,
) -> Result<(), PlatformError> {
    if authenticated {
        Ok(())
    } else {
        Err(PlatformError::auth_required(platform, operation))
    }
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("review-agent/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Read an error body for inclusion in an error message.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    }
}

/// A business id percent-encoded for use as one URL path segment.
pub(crate) fn path_segment(business_id: &BusinessId) -> Cow<'_, str> {
    urlencoding::encode(business_id.as_str())
}

/// Platform ids may arrive as JSON strings or numbers.
pub(crate) fn json_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
