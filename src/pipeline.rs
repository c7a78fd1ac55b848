use crate::ai::ReviewGenerator;
use crate::infrastructure::{PlatformError, ValidationError};
use crate::models::{BusinessId, GeneratedReview, PostReceipt, ReviewInput};
use crate::platforms::{Credentials, ReviewPlatform};

/// A platform adapter and the credentials to log into it with.
pub struct PlatformTarget {
    pub platform: Box<dyn ReviewPlatform>,
    pub credentials: Credentials,
}

impl PlatformTarget {
    pub fn new(platform: Box<dyn ReviewPlatform>, credentials: Credentials) -> Self {
        Self {
            platform,
            credentials,
        }
    }
}

/// What happened on one platform.
#[derive(Debug)]
pub struct PlatformOutcome {
    pub platform: String,
    pub business_id: Option<BusinessId>,
    pub result: Result<PostReceipt, PlatformError>,
}

impl PlatformOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct PipelineReport {
    pub review: GeneratedReview,
    pub outcomes: Vec<PlatformOutcome>,
}

impl PipelineReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(PlatformOutcome::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &PlatformOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Generates one review and posts it to each target in order. A failing
/// platform is recorded and the remaining platforms still run.
pub struct ReviewPipeline {
    generator: ReviewGenerator,
    targets: Vec<PlatformTarget>,
}

impl ReviewPipeline {
    pub fn new(generator: ReviewGenerator) -> Self {
        Self {
            generator,
            targets: Vec::new(),
        }
    }

    pub fn with_target(mut self, platform: Box<dyn ReviewPlatform>, credentials: Credentials) -> Self {
        self.add_target(platform, credentials);
        self
    }

    pub fn add_target(&mut self, platform: Box<dyn ReviewPlatform>, credentials: Credentials) {
        self.targets.push(PlatformTarget::new(platform, credentials));
    }

    pub fn targets(&self) -> &[PlatformTarget] {
        &self.targets
    }

    pub async fn generate(&self, input: &ReviewInput) -> GeneratedReview {
        self.generator.generate(input).await
    }

    /// Post `review` for the business described by `input` on every target.
    pub async fn publish(
        &mut self,
        review: &GeneratedReview,
        input: &ReviewInput,
        location: Option<&str>,
    ) -> Result<Vec<PlatformOutcome>, ValidationError> {
        let rating = input.rating().ok_or(ValidationError::MissingRating)?;

        let mut outcomes = Vec::with_capacity(self.targets.len());
        for target in &mut self.targets {
            let platform = target.platform.name().to_string();
            tracing::info!(platform = %platform, "posting review");

            let mut business_id = None;
            let result: Result<PostReceipt, PlatformError> = async {
                if !target.platform.is_authenticated() {
                    target.platform.login(&target.credentials).await?;
                }
                let id = target
                    .platform
                    .search_business(input.business_name(), location)
                    .await?;
                business_id = Some(id.clone());
                target.platform.post_review(&id, &review.text, rating).await
            }
            .await;

            if let Err(e) = &result {
                tracing::warn!(platform = %platform, error = %e, "posting failed");
            }

            outcomes.push(PlatformOutcome {
                platform,
                business_id,
                result,
            });
        }

        Ok(outcomes)
    }

    /// Generate a review and publish it everywhere.
    pub async fn run(
        &mut self,
        input: &ReviewInput,
        location: Option<&str>,
    ) -> Result<PipelineReport, ValidationError> {
        if input.rating().is_none() {
            return Err(ValidationError::MissingRating);
        }

        let review = self.generate(input).await;
        let outcomes = self.publish(&review, input, location).await?;
        Ok(PipelineReport { review, outcomes })
    }
}
