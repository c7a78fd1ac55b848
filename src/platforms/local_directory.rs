use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::slug::business_slug;
use super::{error_body, http_client, json_id, path_segment, require_login, Credentials, PlatformKind, ReviewPlatform};
use crate::infrastructure::PlatformError;
use crate::models::{BusinessId, PostReceipt, Rating, SimulatedPost, STATUS_POSTED};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const PLATFORM_NAME: &str = "Local Directory";
const SIMULATED_PLATFORM_NAME: &str = "Local Directory (Simulated)";
const REVIEW_AUTHOR: &str = "Review Agent User";
const DEFAULT_LOCATION: &str = "Unknown Location";
const DEFAULT_CATEGORY: &str = "General Business";

#[derive(Debug, Serialize)]
struct NewBusiness<'a> {
    name: &'a str,
    location: &'a str,
    category: &'a str,
}

#[derive(Debug, Serialize)]
struct NewReview<'a> {
    text: &'a str,
    rating: u8,
    author: &'a str,
    date: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ReviewsResponse {
    #[serde(default)]
    reviews: Vec<serde_json::Value>,
}

/// A small REST business directory we control. When the server cannot be
/// reached, lookups fall back to the business slug and posts are simulated.
pub struct LocalDirectoryPlatform {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    logged_in: bool,
}

impl LocalDirectoryPlatform {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            logged_in: false,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn create_business(
        &self,
        business_name: &str,
        location: Option<&str>,
    ) -> Result<BusinessId, PlatformError> {
        let slug = || BusinessId::new(business_slug(business_name, location));
        let body = NewBusiness {
            name: business_name,
            location: location.filter(|l| !l.is_empty()).unwrap_or(DEFAULT_LOCATION),
            category: DEFAULT_CATEGORY,
        };

        let response = match self
            .authorize(self.client.post(self.url("/api/businesses")))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_connect() => return Ok(slug()),
            Err(e) => return Err(PlatformError::transport(PLATFORM_NAME, e)),
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "business creation rejected");
            return Ok(slug());
        }

        let created: serde_json::Value = response.json().await.unwrap_or_default();
        let business_id = created
            .get("id")
            .and_then(json_id)
            .map(BusinessId::new)
            .unwrap_or_else(slug);
        tracing::info!(business = business_name, id = %business_id, "created new business");
        Ok(business_id)
    }

    fn simulate_post(&self, business_id: &BusinessId, review_text: &str, rating: Rating) -> SimulatedPost {
        let post = SimulatedPost {
            id: simulated_review_id(business_id, review_text),
            business_id: business_id.clone(),
            text: review_text.to_string(),
            rating,
            status: STATUS_POSTED.to_string(),
            platform: SIMULATED_PLATFORM_NAME.to_string(),
        };
        tracing::info!(id = %post.id, "local directory unreachable, review simulated");
        post
    }

    /// Reviews the directory holds for a business. Any failure yields an empty list.
    pub async fn get_business_reviews(&self, business_id: &BusinessId) -> Vec<serde_json::Value> {
        let url = self.url(&format!("/api/businesses/{}/reviews", path_segment(business_id)));
        let response = match self.authorize(self.client.get(&url)).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => response,
            Ok(response) => {
                tracing::debug!(status = %response.status(), "review listing unavailable");
                return Vec::new();
            }
            Err(e) => {
                tracing::debug!(error = %e, "review listing unavailable");
                return Vec::new();
            }
        };

        response
            .json::<ReviewsResponse>()
            .await
            .map(|body| body.reviews)
            .unwrap_or_default()
    }
}

impl Default for LocalDirectoryPlatform {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// `review_<business_id>_<n>` where n is derived from a SHA-256 of the text.
pub fn simulated_review_id(business_id: &BusinessId, review_text: &str) -> String {
    let digest = Sha256::digest(review_text.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    format!("review_{}_{}", business_id, u64::from_be_bytes(prefix) % 10_000)
}

#[async_trait]
impl ReviewPlatform for LocalDirectoryPlatform {
    fn name(&self) -> &str {
        PLATFORM_NAME
    }

    fn kind(&self) -> PlatformKind {
        PlatformKind::LocalDirectory
    }

    fn is_authenticated(&self) -> bool {
        self.logged_in
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<bool, PlatformError> {
        match credentials.get("api_key").filter(|k| !k.is_empty()) {
            Some(key) => {
                self.api_key = Some(key.to_string());
                tracing::info!("local directory API authentication successful");
            }
            None => {
                self.api_key = None;
                tracing::info!("local directory login successful (demo mode)");
            }
        }
        self.logged_in = true;
        Ok(true)
    }

    async fn search_business(
        &self,
        business_name: &str,
        location: Option<&str>,
    ) -> Result<BusinessId, PlatformError> {
        require_login(self.logged_in, PLATFORM_NAME, "search businesses")?;

        let mut query = vec![("name", business_name)];
        if let Some(location) = location {
            query.push(("location", location));
        }

        let request = self
            .authorize(self.client.get(self.url("/api/businesses/search")))
            .query(&query);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                let business_id = BusinessId::new(business_slug(business_name, location));
                tracing::info!(id = %business_id, "local directory unreachable, using slug id");
                return Ok(business_id);
            }
            Err(e) => return Err(PlatformError::transport(PLATFORM_NAME, e)),
        };

        if response.status() != reqwest::StatusCode::OK {
            tracing::debug!(status = %response.status(), "business search unavailable");
            return Ok(BusinessId::new(business_slug(business_name, location)));
        }

        let results = match response.json::<SearchResponse>().await {
            Ok(results) => results,
            Err(e) => {
                tracing::debug!(error = %e, "unreadable search response");
                return Ok(BusinessId::new(business_slug(business_name, location)));
            }
        };

        match results.businesses.first().and_then(|b| b.get("id")).and_then(json_id) {
            Some(id) => {
                tracing::info!(business = business_name, id = %id, "found business");
                Ok(BusinessId::new(id))
            }
            None => self.create_business(business_name, location).await,
        }
    }

    async fn post_review(
        &self,
        business_id: &BusinessId,
        review_text: &str,
        rating: Rating,
    ) -> Result<PostReceipt, PlatformError> {
        require_login(self.logged_in, PLATFORM_NAME, "post reviews")?;

        let body = NewReview {
            text: review_text,
            rating: rating.value(),
            author: REVIEW_AUTHOR,
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        };
        let url = self.url(&format!("/api/businesses/{}/reviews", path_segment(business_id)));
        tracing::debug!(url = %url, "posting review");

        let response = match self.authorize(self.client.post(&url)).json(&body).send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                return Ok(PostReceipt::Simulated(self.simulate_post(business_id, review_text, rating)))
            }
            Err(e) => return Err(PlatformError::transport(PLATFORM_NAME, e)),
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::CREATED {
            return Err(PlatformError::posting_failed(PLATFORM_NAME, error_body(response).await));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PlatformError::transport(PLATFORM_NAME, e))?;
        tracing::info!(id = ?result.get("id"), "review posted to local directory");
        Ok(PostReceipt::Remote(result))
    }
}
