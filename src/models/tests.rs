use super::*;

#[test]
fn test_rating_bounds() {
    assert!(Rating::new(0).is_err());
    assert!(Rating::new(6).is_err());
    for value in 1..=5 {
        assert_eq!(Rating::new(value).unwrap().value(), value);
    }
    assert_eq!(
        Rating::new(7),
        Err(crate::infrastructure::ValidationError::RatingOutOfRange(7))
    );
}

#[test]
fn test_rating_rejected_when_deserialized() {
    assert!(serde_json::from_str::<Rating>("3").is_ok());
    assert!(serde_json::from_str::<Rating>("9").is_err());
}

#[test]
fn test_review_input_builder() {
    let input = ReviewInput::new("Mario's Italian Bistro", "Amazing pasta")
        .with_rating(Rating::new(5).unwrap())
        .with_visit_date("2024-03-15");

    assert_eq!(input.business_name(), "Mario's Italian Bistro");
    assert_eq!(input.experience_text(), "Amazing pasta");
    assert_eq!(input.rating().map(Rating::value), Some(5));
    assert_eq!(input.visit_date(), Some("2024-03-15"));

    let bare = ReviewInput::new("Cafe", "Fine coffee");
    assert!(bare.rating().is_none());
    assert!(bare.visit_date().is_none());
}

#[test]
fn test_record_json_layout() {
    let record = PostedReviewRecord {
        platform: "Yelp".to_string(),
        business_id: BusinessId::from("cafe"),
        review_text: "Nice".to_string(),
        rating: Rating::new(4).unwrap(),
        timestamp: "2024-03-21T10:00:00.000000".to_string(),
        status: STATUS_POSTED.to_string(),
    };

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["business_id"], "cafe");
    assert_eq!(value["rating"], 4);
    assert_eq!(value["status"], "posted_successfully");
}

#[test]
fn test_receipt_reference() {
    let remote = PostReceipt::Remote(serde_json::json!({"id": 42}));
    assert_eq!(remote.reference(), Some("42".to_string()));

    let remote = PostReceipt::Remote(serde_json::json!({"ok": true}));
    assert_eq!(remote.reference(), None);

    let submitted = PostReceipt::Submitted {
        url: "https://example.com".to_string(),
    };
    assert_eq!(submitted.reference(), Some("https://example.com".to_string()));
}

#[test]
fn test_generated_review_source() {
    assert!(GeneratedReview::from_fallback("text").is_fallback());
    let review = GeneratedReview::from_service("text", "openai");
    assert!(!review.is_fallback());
    assert_eq!(
        review.source,
        GenerationSource::Service {
            provider: "openai".to_string()
        }
    );
}
