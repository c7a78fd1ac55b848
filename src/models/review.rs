use std::fmt;

use serde::{Deserialize, Serialize};

use crate::infrastructure::ValidationError;

/// Status written on every record a platform accepted.
pub const STATUS_POSTED: &str = "posted_successfully";

/// Star rating, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(ValidationError::RatingOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the customer told us about a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewInput {
    business_name: String,
    experience_text: String,
    rating: Option<Rating>,
    visit_date: Option<String>,
}

impl ReviewInput {
    pub fn new(business_name: impl Into<String>, experience_text: impl Into<String>) -> Self {
        Self {
            business_name: business_name.into(),
            experience_text: experience_text.into(),
            rating: None,
            visit_date: None,
        }
    }

    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_visit_date(mut self, visit_date: impl Into<String>) -> Self {
        self.visit_date = Some(visit_date.into());
        self
    }

    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    pub fn experience_text(&self) -> &str {
        &self.experience_text
    }

    pub fn rating(&self) -> Option<Rating> {
        self.rating
    }

    pub fn visit_date(&self) -> Option<&str> {
        self.visit_date.as_deref()
    }
}

/// Which path produced a review's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationSource {
    Service { provider: String },
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedReview {
    pub text: String,
    pub source: GenerationSource,
}

impl GeneratedReview {
    pub fn from_service(text: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: GenerationSource::Service {
                provider: provider.into(),
            },
        }
    }

    pub fn from_fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: GenerationSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == GenerationSource::Fallback
    }
}

/// Platform-scoped business identifier. Only meaningful to the platform that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessId(String);

impl BusinessId {
    pub fn new(id: impl Into<String>) -> Self {
        BusinessId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for BusinessId {
    fn from(id: String) -> Self {
        BusinessId(id)
    }
}

impl From<&str> for BusinessId {
    fn from(id: &str) -> Self {
        BusinessId(id.to_string())
    }
}

/// A review stored by the file-backed mock platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedReviewRecord {
    pub platform: String,
    pub business_id: BusinessId,
    pub review_text: String,
    pub rating: Rating,
    /// ISO-8601 local time with microseconds; sorts chronologically as a string.
    pub timestamp: String,
    pub status: String,
}

/// Offline stand-in for a local-directory post when the directory is unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedPost {
    pub id: String,
    pub business_id: BusinessId,
    pub text: String,
    pub rating: Rating,
    pub status: String,
    pub platform: String,
}

/// Result of a successful `post_review`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostReceipt {
    /// Stored locally by the mock platform
    Recorded(PostedReviewRecord),
    /// Synthesised because the local directory was offline
    Simulated(SimulatedPost),
    /// Raw response body from a remote API
    Remote(serde_json::Value),
    /// Submitted through a browser session
    Submitted { url: String },
}

impl PostReceipt {
    /// Best-effort identifier to show the user.
    pub fn reference(&self) -> Option<String> {
        match self {
            PostReceipt::Recorded(record) => Some(record.timestamp.clone()),
            PostReceipt::Simulated(post) => Some(post.id.clone()),
            PostReceipt::Remote(body) => body.get("id").and_then(|id| match id {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
            PostReceipt::Submitted { url } => Some(url.clone()),
        }
    }
}
