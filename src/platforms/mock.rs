use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use super::slug::business_slug;
use super::store::{FileReviewStore, ReviewStore};
use super::{require_login, Credentials, PlatformKind, ReviewPlatform};
use crate::infrastructure::PlatformError;
use crate::models::{BusinessId, PostReceipt, PostedReviewRecord, Rating, STATUS_POSTED};

pub const DEFAULT_REVIEWS_DIR: &str = "mock_reviews";

/// Platform that "posts" by writing to a `ReviewStore`. Login always succeeds.
pub struct MockPlatform {
    platform_name: String,
    store: Arc<dyn ReviewStore>,
    logged_in: bool,
}

impl MockPlatform {
    pub fn new(platform_name: impl Into<String>, store: Arc<dyn ReviewStore>) -> Self {
        Self {
            platform_name: platform_name.into(),
            store,
            logged_in: false,
        }
    }

    /// Mock platform backed by one JSON file per review in `dir`.
    pub fn with_reviews_dir(platform_name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self::new(platform_name, Arc::new(FileReviewStore::new(dir)))
    }

    /// Every stored review, newest first.
    pub async fn get_all_reviews(&self) -> Result<Vec<PostedReviewRecord>, PlatformError> {
        let mut reviews = self.store.read_all().await?;
        reviews.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(reviews)
    }
}

pub(crate) fn now_timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[async_trait]
impl ReviewPlatform for MockPlatform {
    fn name(&self) -> &str {
        &self.platform_name
    }

    fn kind(&self) -> PlatformKind {
        PlatformKind::Mock
    }

    fn is_authenticated(&self) -> bool {
        self.logged_in
    }

    async fn login(&mut self, _credentials: &Credentials) -> Result<bool, PlatformError> {
        self.logged_in = true;
        tracing::info!(platform = %self.platform_name, "mock login successful");
        Ok(true)
    }

    async fn search_business(
        &self,
        business_name: &str,
        location: Option<&str>,
    ) -> Result<BusinessId, PlatformError> {
        require_login(self.logged_in, &self.platform_name, "search businesses")?;

        let business_id = BusinessId::new(business_slug(business_name, location));
        tracing::info!(
            platform = %self.platform_name,
            business = business_name,
            id = %business_id,
            "found business"
        );
        Ok(business_id)
    }

    async fn post_review(
        &self,
        business_id: &BusinessId,
        review_text: &str,
        rating: Rating,
    ) -> Result<PostReceipt, PlatformError> {
        require_login(self.logged_in, &self.platform_name, "post reviews")?;

        let record = PostedReviewRecord {
            platform: self.platform_name.clone(),
            business_id: business_id.clone(),
            review_text: review_text.to_string(),
            rating,
            timestamp: now_timestamp(),
            status: STATUS_POSTED.to_string(),
        };

        let location = self.store.write_one(&record).await?;
        tracing::info!(
            platform = %self.platform_name,
            saved_to = %location,
            rating = rating.value(),
            "review posted"
        );

        Ok(PostReceipt::Recorded(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::store::MemoryReviewStore;

    fn memory_platform() -> MockPlatform {
        MockPlatform::new("Yelp", Arc::new(MemoryReviewStore::new()))
    }

    #[test]
    fn test_timestamp_format() {
        let timestamp = now_timestamp();
        assert_eq!(timestamp.len(), "2024-03-21T10:15:30.123456".len());
        assert!(chrono::NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%dT%H:%M:%S%.6f").is_ok());
    }

    #[tokio::test]
    async fn test_requires_login() {
        let platform = memory_platform();
        assert!(!platform.is_authenticated());

        let err = platform.search_business("Cafe", None).await.unwrap_err();
        assert!(matches!(err, PlatformError::AuthenticationRequired { .. }));

        let err = platform
            .post_review(&BusinessId::from("cafe"), "Nice", Rating::new(4).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::AuthenticationRequired { .. }));
    }

    #[tokio::test]
    async fn test_login_ignores_credentials() {
        let mut platform = memory_platform();
        assert!(platform.login(&Credentials::new()).await.unwrap());
        assert!(platform.is_authenticated());
        assert_eq!(platform.kind(), PlatformKind::Mock);
        assert_eq!(platform.name(), "Yelp");
    }

    #[tokio::test]
    async fn test_post_returns_record() {
        let mut platform = memory_platform();
        platform.login(&Credentials::new()).await.unwrap();

        let id = platform.search_business("Mario's Bistro", Some("New York")).await.unwrap();
        assert_eq!(id.as_str(), "mario's_bistro_new_york");

        let receipt = platform
            .post_review(&id, "Great pasta.", Rating::new(5).unwrap())
            .await
            .unwrap();

        let PostReceipt::Recorded(record) = receipt else {
            panic!("expected a recorded review");
        };
        assert_eq!(record.platform, "Yelp");
        assert_eq!(record.business_id, id);
        assert_eq!(record.review_text, "Great pasta.");
        assert_eq!(record.rating.value(), 5);
        assert_eq!(record.status, "posted_successfully");

        assert_eq!(platform.get_all_reviews().await.unwrap(), vec![record]);
    }
}
