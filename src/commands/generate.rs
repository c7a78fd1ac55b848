use crate::cli::args::GenerateArgs;
use crate::config::Config;
use crate::models::{Rating, ReviewInput};
use crate::pipeline::{PipelineReport, ReviewPipeline};
use crate::platforms::{Credentials, MockPlatform, PlatformKind};

use super::{print_review, report_outcomes};

pub const CLI_PLATFORM_NAME: &str = "Demo Platform";

pub fn review_input_from_args(args: &GenerateArgs) -> anyhow::Result<ReviewInput> {
    let mut input = ReviewInput::new(args.business.clone(), args.experience.clone())
        .with_rating(Rating::new(args.rating)?);
    if let Some(date) = &args.date {
        input = input.with_visit_date(date.clone());
    }
    Ok(input)
}

/// Generate a single review and, unless `--no-post`, post it to the mock
/// platform plus every enabled remote platform with configured credentials.
pub async fn handle_generate_command(args: &GenerateArgs, config: &Config) -> anyhow::Result<()> {
    let input = review_input_from_args(args)?;
    println!("🤖 Generating review for {}...", input.business_name());

    let mut pipeline = ReviewPipeline::new(config.review_generator()?);
    let review = pipeline.generate(&input).await;
    if review.is_fallback() {
        println!("⚠️  Text generation unavailable, using the built-in template");
    }
    print_review(&review);

    if args.no_post {
        return Ok(());
    }

    let reviews_dir = args.reviews_dir.clone().unwrap_or_else(|| config.reviews_dir.clone());
    if config.platform_enabled(PlatformKind::Mock) {
        pipeline.add_target(
            Box::new(MockPlatform::with_reviews_dir(CLI_PLATFORM_NAME, reviews_dir)),
            Credentials::new(),
        );
    }
    for (platform, credentials) in config.extra_platforms() {
        pipeline.add_target(platform, credentials);
    }

    if pipeline.targets().is_empty() {
        println!("\n⚠️  No usable platforms selected, review not posted");
        return Ok(());
    }

    println!("\n📤 Posting to {} platform(s)...", pipeline.targets().len());
    let outcomes = pipeline.publish(&review, &input, args.location.as_deref()).await?;
    report_outcomes(&PipelineReport { review, outcomes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(rating: u8) -> GenerateArgs {
        GenerateArgs {
            business: "TechFix".to_string(),
            experience: "fixed my laptop".to_string(),
            rating,
            location: None,
            date: Some("2024-03-18".to_string()),
            no_post: true,
            reviews_dir: None,
        }
    }

    #[test]
    fn test_review_input_from_args() {
        let input = review_input_from_args(&args(4)).unwrap();
        assert_eq!(input.business_name(), "TechFix");
        assert_eq!(input.rating().map(Rating::value), Some(4));
        assert_eq!(input.visit_date(), Some("2024-03-18"));
    }

    #[test]
    fn test_out_of_range_rating_is_rejected() {
        assert!(review_input_from_args(&args(9)).is_err());
    }
}
