use async_trait::async_trait;
use serde::Deserialize;

use super::{error_body, http_client, json_id, path_segment, require_login, Credentials, PlatformKind, ReviewPlatform};
use crate::infrastructure::PlatformError;
use crate::models::{BusinessId, PostReceipt, Rating};

pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v18.0";
const PLATFORM_NAME: &str = "Facebook";
const SEARCH_FIELDS: &str = "id,name,location,category";
const PAGE_FIELDS: &str = "id,name,location,phone,website,rating_count,overall_star_rating,category";

#[derive(Debug, Deserialize)]
struct Profile {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// Facebook Graph API. Pages take recommendations rather than star reviews,
/// so a rejected recommendation is retried as a post on the user's feed.
pub struct FacebookPlatform {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    user_id: Option<String>,
}

impl FacebookPlatform {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
            user_id: None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn token(&self, operation: &'static str) -> Result<&str, PlatformError> {
        require_login(self.access_token.is_some(), PLATFORM_NAME, operation)?;
        Ok(self.access_token.as_deref().unwrap_or_default())
    }

    async fn post_to_feed(
        &self,
        token: &str,
        business_id: &BusinessId,
        review_text: &str,
        rating: Rating,
    ) -> Result<PostReceipt, PlatformError> {
        let message = format!("Just visited this place! {} Rating: {}/5 ⭐", review_text, rating);
        let response = self
            .client
            .post(format!("{}/me/feed", self.base_url))
            .form(&[
                ("message", message.as_str()),
                ("place", business_id.as_str()),
                ("access_token", token),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(PlatformError::posting_failed(PLATFORM_NAME, error_body(response).await));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;
        tracing::info!(id = ?result.get("id"), "review posted to Facebook feed");
        Ok(PostReceipt::Remote(result))
    }

    /// Public details of a page.
    pub async fn get_page_info(&self, page_id: &BusinessId) -> Result<serde_json::Value, PlatformError> {
        let token = self.token("get page info")?;
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path_segment(page_id)))
            .query(&[("access_token", token), ("fields", PAGE_FIELDS)])
            .send()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(PlatformError::search_failed(PLATFORM_NAME, error_body(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))
    }
}

impl Default for FacebookPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewPlatform for FacebookPlatform {
    fn name(&self) -> &str {
        PLATFORM_NAME
    }

    fn kind(&self) -> PlatformKind {
        PlatformKind::Facebook
    }

    fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<bool, PlatformError> {
        let token = credentials.require(PLATFORM_NAME, "access_token")?.to_string();

        let response = self
            .client
            .get(format!("{}/me", self.base_url))
            .query(&[("access_token", token.as_str())])
            .send()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(PlatformError::invalid_credentials(
                PLATFORM_NAME,
                error_body(response).await,
            ));
        }

        let profile: Profile = response
            .json()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;
        tracing::info!(
            user = profile.name.as_deref().unwrap_or("Unknown"),
            "Facebook login successful"
        );

        self.user_id = profile.id;
        self.access_token = Some(token);
        Ok(true)
    }

    async fn search_business(
        &self,
        business_name: &str,
        location: Option<&str>,
    ) -> Result<BusinessId, PlatformError> {
        let token = self.token("search businesses")?;

        let query = match location.filter(|l| !l.is_empty()) {
            Some(location) => format!("{} {}", business_name, location),
            None => business_name.to_string(),
        };

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query.as_str()),
                ("type", "page"),
                ("access_token", token),
                ("fields", SEARCH_FIELDS),
            ])
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

        let page = results
            .data
            .first()
            .ok_or_else(|| PlatformError::not_found(PLATFORM_NAME, business_name))?;
        let id = page
            .get("id")
            .and_then(json_id)
            .ok_or_else(|| PlatformError::search_failed(PLATFORM_NAME, "page result has no id"))?;

        tracing::info!(
            page = page.get("name").and_then(|n| n.as_str()).unwrap_or(business_name),
            id = %id,
            "found Facebook page"
        );
        Ok(BusinessId::new(id))
    }

    async fn post_review(
        &self,
        business_id: &BusinessId,
        review_text: &str,
        rating: Rating,
    ) -> Result<PostReceipt, PlatformError> {
        let token = self.token("post reviews")?;
        let recommend = rating.value() >= 3;

        let response = self
            .client
            .post(format!(
                "{}/{}/recommendations",
                self.base_url,
                path_segment(business_id)
            ))
            .form(&[
                ("recommend", if recommend { "true" } else { "false" }),
                ("review_text", review_text),
                ("access_token", token),
            ])
            .send()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;

        if response.status() == reqwest::StatusCode::OK {
            let result: serde_json::Value = response
                .json()
                .await
                .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;
            tracing::info!(recommend, "recommendation posted to Facebook");
            return Ok(PostReceipt::Remote(result));
        }

        tracing::debug!(status = %response.status(), "recommendation rejected, posting to feed");
        self.post_to_feed(token, business_id, review_text, rating).await
    }
}
