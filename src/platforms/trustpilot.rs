use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{error_body, http_client, path_segment, require_login, Credentials, PlatformKind, ReviewPlatform};
use crate::infrastructure::PlatformError;
use crate::models::{BusinessId, PostReceipt, Rating};

pub const DEFAULT_BASE_URL: &str = "https://api.trustpilot.com/v1";
const PLATFORM_NAME: &str = "Trustpilot";
const TOKEN_PATH: &str = "/oauth/oauth-business-users-for-applications/accesstoken";
const SEARCH_COUNTRY: &str = "US";
const INVITE_LOCALE: &str = "en-US";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    business_units: Vec<BusinessUnit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BusinessUnit {
    identifying_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Consumer {
    pub email: String,
    pub name: String,
}

impl Default for Consumer {
    fn default() -> Self {
        Self {
            email: "reviewer@example.com".to_string(),
            name: "Anonymous Reviewer".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewBody<'a> {
    review_text: &'a str,
    stars: u8,
    consumer: &'a Consumer,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvitationBody<'a> {
    recipient: Consumer,
    reference_id: String,
    locale: &'a str,
}

/// Trustpilot business API, authenticated with OAuth client credentials.
pub struct TrustpilotPlatform {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    consumer: Consumer,
}

impl TrustpilotPlatform {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
            consumer: Consumer::default(),
        }
    }

    /// Reviewer identity attached to posted reviews.
    pub fn with_consumer(mut self, email: impl Into<String>, name: impl Into<String>) -> Self {
        self.consumer = Consumer {
            email: email.into(),
            name: name.into(),
        };
        self
    }

    fn token(&self, operation: &'static str) -> Result<&str, PlatformError> {
        require_login(self.access_token.is_some(), PLATFORM_NAME, operation)?;
        Ok(self.access_token.as_deref().unwrap_or_default())
    }

    /// Send an email invitation to review, the flow Trustpilot prefers.
    pub async fn invite_review(
        &self,
        business_id: &BusinessId,
        customer_email: &str,
        customer_name: &str,
        reference_id: Option<&str>,
    ) -> Result<serde_json::Value, PlatformError> {
        let token = self.token("send invitations")?;

        let body = InvitationBody {
            recipient: Consumer {
                email: customer_email.to_string(),
                name: customer_name.to_string(),
            },
            reference_id: reference_id
                .map(str::to_string)
                .unwrap_or_else(|| format!("review_{}_{}", business_id, customer_email)),
            locale: INVITE_LOCALE,
        };

        let response = self
            .client
            .post(format!(
                "{}/private/business-units/{}/email-invitations",
                self.base_url,
                path_segment(business_id)
            ))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::CREATED {
            return Err(PlatformError::posting_failed(PLATFORM_NAME, error_body(response).await));
        }

        tracing::info!(business = %business_id, "review invitation sent");
        response
            .json()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))
    }
}

impl Default for TrustpilotPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewPlatform for TrustpilotPlatform {
    fn name(&self) -> &str {
        PLATFORM_NAME
    }

    fn kind(&self) -> PlatformKind {
        PlatformKind::Trustpilot
    }

    fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<bool, PlatformError> {
        let client_id = credentials.require(PLATFORM_NAME, "api_key")?;
        let client_secret = credentials.require(PLATFORM_NAME, "secret")?;

        let response = self
            .client
            .post(format!("{}{}", self.base_url, TOKEN_PATH))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(PlatformError::invalid_credentials(
                PLATFORM_NAME,
                error_body(response).await,
            ));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            PlatformError::invalid_credentials(PLATFORM_NAME, format!("malformed token response: {}", e))
        })?;

        self.access_token = Some(token.access_token);
        tracing::info!("Trustpilot authentication successful");
        Ok(true)
    }

    async fn search_business(
        &self,
        business_name: &str,
        location: Option<&str>,
    ) -> Result<BusinessId, PlatformError> {
        let token = self.token("search businesses")?;

        let mut query = vec![("query", business_name), ("country", SEARCH_COUNTRY)];
        if let Some(location) = location.filter(|l| !l.is_empty()) {
            query.push(("location", location));
        }

        let response = self
            .client
            .get(format!("{}/business-units/search", self.base_url))
            .bearer_auth(token)
            .query(&query)
            .send()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(PlatformError::search_failed(PLATFORM_NAME, error_body(response).await));
        }

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;

        results
            .business_units
            .into_iter()
            .next()
            .map(|unit| BusinessId::new(unit.identifying_name))
            .ok_or_else(|| PlatformError::not_found(PLATFORM_NAME, business_name))
    }

    async fn post_review(
        &self,
        business_id: &BusinessId,
        review_text: &str,
        rating: Rating,
    ) -> Result<PostReceipt, PlatformError> {
        let token = self.token("post reviews")?;

        let body = ReviewBody {
            review_text,
            stars: rating.value(),
            consumer: &self.consumer,
        };

        let response = self
            .client
            .post(format!(
                "{}/private/business-units/{}/reviews",
                self.base_url,
                path_segment(business_id)
            ))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::CREATED {
            return Err(PlatformError::posting_failed(PLATFORM_NAME, error_body(response).await));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;
        tracing::info!(business = %business_id, "review posted to Trustpilot");
        Ok(PostReceipt::Remote(result))
    }
}
