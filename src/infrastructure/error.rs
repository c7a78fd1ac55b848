use thiserror::Error;

/// Errors raised at the review-platform boundary.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{platform}: must be logged in to {operation}")]
    AuthenticationRequired {
        platform: String,
        operation: &'static str,
    },

    #[error("{platform} authentication failed: {message}")]
    InvalidCredentials { platform: String, message: String },

    #[error("{platform}: no business found for '{query}'")]
    BusinessNotFound { platform: String, query: String },

    #[error("{platform} lookup failed: {message}")]
    SearchFailed { platform: String, message: String },

    #[error("{platform} review posting failed: {message}")]
    PostingFailed { platform: String, message: String },

    #[error("{platform} request failed: {source}")]
    Transport {
        platform: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{platform} browser session error: {message}")]
    Browser { platform: String, message: String },

    #[error("review storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("review serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlatformError {
    pub fn auth_required(platform: impl Into<String>, operation: &'static str) -> Self {
        PlatformError::AuthenticationRequired {
            platform: platform.into(),
            operation,
        }
    }

    pub fn invalid_credentials(platform: impl Into<String>, message: impl Into<String>) -> Self {
        PlatformError::InvalidCredentials {
            platform: platform.into(),
            message: message.into(),
        }
    }

    pub fn not_found(platform: impl Into<String>, query: impl Into<String>) -> Self {
        PlatformError::BusinessNotFound {
            platform: platform.into(),
            query: query.into(),
        }
    }

    pub fn search_failed(platform: impl Into<String>, message: impl Into<String>) -> Self {
        PlatformError::SearchFailed {
            platform: platform.into(),
            message: message.into(),
        }
    }

    pub fn posting_failed(platform: impl Into<String>, message: impl Into<String>) -> Self {
        PlatformError::PostingFailed {
            platform: platform.into(),
            message: message.into(),
        }
    }

    pub fn transport(platform: impl Into<String>, source: reqwest::Error) -> Self {
        PlatformError::Transport {
            platform: platform.into(),
            source,
        }
    }

    pub fn browser(platform: impl Into<String>, error: impl std::fmt::Display) -> Self {
        PlatformError::Browser {
            platform: platform.into(),
            message: error.to_string(),
        }
    }

    pub fn storage(message: impl Into<String>, source: std::io::Error) -> Self {
        PlatformError::Storage {
            message: message.into(),
            source,
        }
    }

    /// Name of the platform the error came from, when it is platform-specific.
    pub fn platform(&self) -> Option<&str> {
        match self {
            PlatformError::AuthenticationRequired { platform, .. }
            | PlatformError::InvalidCredentials { platform, .. }
            | PlatformError::BusinessNotFound { platform, .. }
            | PlatformError::SearchFailed { platform, .. }
            | PlatformError::PostingFailed { platform, .. }
            | PlatformError::Transport { platform, .. }
            | PlatformError::Browser { platform, .. } => Some(platform),
            PlatformError::Storage { .. } | PlatformError::Serialization(_) => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            PlatformError::AuthenticationRequired { .. } | PlatformError::InvalidCredentials { .. }
        )
    }
}

/// Rejected review input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("a rating is required to post a review")]
    MissingRating,
}
