use std::sync::Arc;

use async_trait::async_trait;

use super::{require_login, Credentials, PlatformKind, ReviewPlatform};
use crate::infrastructure::PlatformError;
use crate::models::{BusinessId, PostReceipt, Rating};

const PLATFORM_NAME: &str = "Google Reviews";
pub const SIGN_IN_URL: &str = "https://accounts.google.com/signin";
pub const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";
pub const WRITE_REVIEW_URL: &str = "https://search.google.com/local/writereview?place_id=";

/// Page-level browser control. Google Reviews has no posting API, so every
/// interaction goes through an automated browser session.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> anyhow::Result<()>;

    /// Fill in and submit the sign-in form on the current page.
    async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<()>;

    /// Place id of the business shown on the current page, if any.
    async fn place_id(&self) -> anyhow::Result<Option<String>>;

    /// Set the star rating and text on the current review form and submit it.
    async fn submit_review(&self, rating: Rating, text: &str) -> anyhow::Result<()>;
}

pub struct GooglePlatform {
    driver: Arc<dyn BrowserDriver>,
    logged_in: bool,
}

impl GooglePlatform {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self {
            driver,
            logged_in: false,
        }
    }

    pub fn search_url(business_name: &str, location: Option<&str>) -> String {
        let query = match location.filter(|l| !l.is_empty()) {
            Some(location) => format!("{} {}", business_name, location),
            None => business_name.to_string(),
        };
        format!("{}{}", MAPS_SEARCH_URL, urlencoding::encode(&query))
    }

    pub fn review_url(business_id: &BusinessId) -> String {
        format!("{}{}", WRITE_REVIEW_URL, urlencoding::encode(business_id.as_str()))
    }
}

#[async_trait]
impl ReviewPlatform for GooglePlatform {
    fn name(&self) -> &str {
        PLATFORM_NAME
    }

    fn kind(&self) -> PlatformKind {
        PlatformKind::Google
    }

    fn is_authenticated(&self) -> bool {
        self.logged_in
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<bool, PlatformError> {
        let email = credentials.require(PLATFORM_NAME, "email")?;
        let password = credentials.require(PLATFORM_NAME, "password")?;

        self.driver
            .navigate(SIGN_IN_URL)
            .await
            .map_err(|e| PlatformError::browser(PLATFORM_NAME, e))?;
        self.driver
            .sign_in(email, password)
            .await
            .map_err(|e| PlatformError::invalid_credentials(PLATFORM_NAME, e.to_string()))?;

        self.logged_in = true;
        tracing::info!("Google sign-in successful");
        Ok(true)
    }

    async fn search_business(
        &self,
        business_name: &str,
        location: Option<&str>,
    ) -> Result<BusinessId, PlatformError> {
        require_login(self.logged_in, PLATFORM_NAME, "search businesses")?;

        let url = Self::search_url(business_name, location);
        self.driver
            .navigate(&url)
            .await
            .map_err(|e| PlatformError::browser(PLATFORM_NAME, e))?;

        let place_id = self
            .driver
            .place_id()
            .await
            .map_err(|e| PlatformError::browser(PLATFORM_NAME, e))?
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PlatformError::not_found(PLATFORM_NAME, business_name))?;

        tracing::info!(business = business_name, place_id = %place_id, "found place");
        Ok(BusinessId::new(place_id))
    }

    async fn post_review(
        &self,
        business_id: &BusinessId,
        review_text: &str,
        rating: Rating,
    ) -> Result<PostReceipt, PlatformError> {
        require_login(self.logged_in, PLATFORM_NAME, "post reviews")?;

        let url = Self::review_url(business_id);
        self.driver
            .navigate(&url)
            .await
            .map_err(|e| PlatformError::browser(PLATFORM_NAME, e))?;
        self.driver
            .submit_review(rating, review_text)
            .await
            .map_err(|e| PlatformError::posting_failed(PLATFORM_NAME, e.to_string()))?;

        tracing::info!(place_id = %business_id, "review submitted to Google");
        Ok(PostReceipt::Submitted { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(
            GooglePlatform::search_url("Mario's Bistro", Some("New York")),
            "https://www.google.com/maps/search/Mario%27s%20Bistro%20New%20York"
        );
        assert_eq!(
            GooglePlatform::search_url("TechFix", None),
            "https://www.google.com/maps/search/TechFix"
        );
        assert_eq!(
            GooglePlatform::review_url(&BusinessId::from("ChIJ123")),
            "https://search.google.com/local/writereview?place_id=ChIJ123"
        );
    }
}
