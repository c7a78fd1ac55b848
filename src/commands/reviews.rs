use crate::cli::args::ReviewsArgs;
use crate::config::Config;
use crate::models::PostedReviewRecord;
use crate::platforms::MockPlatform;

/// Keep only the records for `business`, when given.
pub fn filter_reviews(reviews: Vec<PostedReviewRecord>, business: Option<&str>) -> Vec<PostedReviewRecord> {
    match business {
        Some(id) => reviews
            .into_iter()
            .filter(|r| r.business_id.as_str() == id)
            .collect(),
        None => reviews,
    }
}

pub async fn handle_reviews_command(args: &ReviewsArgs, config: &Config) -> anyhow::Result<()> {
    let reviews_dir = args.reviews_dir.clone().unwrap_or_else(|| config.reviews_dir.clone());
    let platform = MockPlatform::with_reviews_dir("Mock", &reviews_dir);

    let reviews = filter_reviews(platform.get_all_reviews().await?, args.business.as_deref());
    if reviews.is_empty() {
        println!("📭 No reviews found in {}", reviews_dir.display());
        return Ok(());
    }

    println!("📚 {} review(s) in {}", reviews.len(), reviews_dir.display());
    for review in &reviews {
        println!("\n{} | {} | {}★ | {}", review.timestamp, review.platform, review.rating, review.business_id);
        println!("  {}", review.review_text);
    }
    Ok(())
}
