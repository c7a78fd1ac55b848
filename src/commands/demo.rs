use std::path::Path;

use crate::cli::args::DemoArgs;
use crate::config::Config;
use crate::models::{Rating, ReviewInput};
use crate::pipeline::ReviewPipeline;
use crate::platforms::{Credentials, LocalDirectoryPlatform, MockPlatform};

use super::{print_outcomes, print_review};

pub const DEMO_LOCATION: &str = "New York";

/// The two canned visits the demo walks through.
pub fn sample_inputs() -> anyhow::Result<Vec<ReviewInput>> {
    Ok(vec![
        ReviewInput::new(
            "Mario's Italian Bistro",
            "Amazing pasta, friendly staff, cozy atmosphere. The tiramisu was incredible!",
        )
        .with_rating(Rating::new(5)?)
        .with_visit_date("2024-03-15"),
        ReviewInput::new(
            "TechFix Computer Repair",
            "Fixed my laptop quickly and at a fair price. Very knowledgeable technician.",
        )
        .with_rating(Rating::new(4)?)
        .with_visit_date("2024-03-18"),
    ])
}

fn demo_pipeline(config: &Config, reviews_dir: &Path) -> anyhow::Result<ReviewPipeline> {
    let demo_credentials: Credentials = [("username", "demo"), ("password", "demo")]
        .into_iter()
        .collect();

    Ok(ReviewPipeline::new(config.review_generator()?)
        .with_target(
            Box::new(MockPlatform::with_reviews_dir("Google Reviews", reviews_dir)),
            demo_credentials.clone(),
        )
        .with_target(
            Box::new(MockPlatform::with_reviews_dir("Yelp", reviews_dir)),
            demo_credentials,
        )
        .with_target(
            Box::new(LocalDirectoryPlatform::new(config.local_directory_url.clone())),
            Credentials::new().with("api_key", "demo_key"),
        ))
}

/// Run every sample through the pipeline. A platform failure on one sample
/// does not stop the next; failures are returned as `(sample, platform)`.
async fn post_samples(
    pipeline: &mut ReviewPipeline,
    samples: &[ReviewInput],
) -> anyhow::Result<Vec<(usize, String)>> {
    let mut failures = Vec::new();

    for (i, input) in samples.iter().enumerate() {
        println!("\n🔄 Processing Review {}/{}...", i + 1, samples.len());
        println!("Business: {}", input.business_name());
        println!("Experience: {}", input.experience_text());
        if let Some(rating) = input.rating() {
            println!("Rating: {}/5", rating);
        }

        let report = pipeline.run(input, Some(DEMO_LOCATION)).await?;
        print_review(&report.review);

        println!("\n📤 Posting to {} platforms...", report.outcomes.len());
        let failed = print_outcomes(&report);
        if failed.is_empty() {
            println!("✅ Review {} posted successfully!", i + 1);
        } else {
            println!("⚠️  Review {} failed on {} platform(s)", i + 1, failed.len());
            failures.extend(failed.into_iter().map(|platform| (i + 1, platform)));
        }
    }

    Ok(failures)
}

pub async fn handle_demo_command(args: &DemoArgs, config: &Config) -> anyhow::Result<()> {
    let reviews_dir = args.reviews_dir.clone().unwrap_or_else(|| config.reviews_dir.clone());

    println!("🎤 Review Agent - Demo Mode!");
    println!("{}", "=".repeat(50));
    if config.generation_provider()?.is_none() {
        println!("⚠️  No text generation service configured, using the built-in template");
    }

    let samples = sample_inputs()?;
    let mut pipeline = demo_pipeline(config, &reviews_dir)?;
    let failures = post_samples(&mut pipeline, &samples).await?;

    if !failures.is_empty() {
        let failed: Vec<String> = failures
            .iter()
            .map(|(review, platform)| format!("{} (review {})", platform, review))
            .collect();
        anyhow::bail!("Posting failed on: {}", failed.join(", "));
    }

    println!("\n🎉 Demo complete! Reviews have been posted to multiple platforms.");
    println!("📁 Check the '{}' folder to see your generated reviews.", reviews_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::ai::ReviewGenerator;
    use crate::infrastructure::PlatformError;
    use crate::models::{BusinessId, PostReceipt};
    use crate::platforms::{MemoryReviewStore, PlatformKind, ReviewPlatform};

    struct RejectingPlatform;

    #[async_trait]
    impl ReviewPlatform for RejectingPlatform {
        fn name(&self) -> &str {
            "Rejecting"
        }

        fn kind(&self) -> PlatformKind {
            PlatformKind::Mock
        }

        fn is_authenticated(&self) -> bool {
            false
        }

        async fn login(&mut self, _credentials: &Credentials) -> Result<bool, PlatformError> {
            Err(PlatformError::invalid_credentials("Rejecting", "no access"))
        }

        async fn search_business(
            &self,
            _business_name: &str,
            _location: Option<&str>,
        ) -> Result<BusinessId, PlatformError> {
            Err(PlatformError::auth_required("Rejecting", "search businesses"))
        }

        async fn post_review(
            &self,
            _business_id: &BusinessId,
            _review_text: &str,
            _rating: Rating,
        ) -> Result<PostReceipt, PlatformError> {
            Err(PlatformError::auth_required("Rejecting", "post reviews"))
        }
    }

    #[tokio::test]
    async fn test_failing_platform_does_not_stop_later_samples() {
        let store = Arc::new(MemoryReviewStore::new());
        let mut pipeline = ReviewPipeline::new(ReviewGenerator::fallback_only())
            .with_target(Box::new(RejectingPlatform), Credentials::new())
            .with_target(
                Box::new(MockPlatform::new("Yelp", store.clone())),
                Credentials::new(),
            );

        let samples = sample_inputs().unwrap();
        let failures = post_samples(&mut pipeline, &samples).await.unwrap();

        assert_eq!(
            failures,
            vec![(1, "Rejecting".to_string()), (2, "Rejecting".to_string())]
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_sample_inputs() {
        let samples = sample_inputs().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].business_name(), "Mario's Italian Bistro");
        assert_eq!(samples[0].rating().map(Rating::value), Some(5));
        assert_eq!(samples[1].rating().map(Rating::value), Some(4));
    }

    #[test]
    fn test_demo_pipeline_targets() {
        let config = Config::default();
        let pipeline = demo_pipeline(&config, Path::new("mock_reviews")).unwrap();
        let names: Vec<&str> = pipeline.targets().iter().map(|t| t.platform.name()).collect();
        assert_eq!(names, vec!["Google Reviews", "Yelp", "Local Directory"]);
    }
}
