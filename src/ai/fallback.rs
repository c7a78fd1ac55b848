use crate::models::{Rating, ReviewInput};

/// Canned sentence for each rating.
pub fn rating_phrase(rating: Option<Rating>) -> &'static str {
    match rating.map(Rating::value) {
        Some(5) => "Excellent experience!",
        Some(4) => "Very good experience.",
        Some(3) => "Good experience overall.",
        Some(2) => "Okay experience, could be better.",
        Some(1) => "Poor experience.",
        _ => "Had an experience.",
    }
}

/// Closing sentence: 4 and 5 recommend, 1 and 2 hope for better, 3 says nothing.
pub fn recommendation_suffix(rating: Option<Rating>) -> Option<&'static str> {
    match rating.map(Rating::value) {
        Some(r) if r >= 4 => Some("Highly recommended!"),
        Some(r) if r <= 2 => Some("Hope they can improve."),
        _ => None,
    }
}

/// Deterministic review used when no completion service is available.
pub fn fallback_review(input: &ReviewInput) -> String {
    let rating = input.rating();
    let score = rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "an unknown number".to_string());

    let mut review = format!(
        "I visited {} and {} {} I would rate this {} out of 5 stars.",
        input.business_name(),
        input.experience_text(),
        rating_phrase(rating),
        score
    );

    if let Some(suffix) = recommendation_suffix(rating) {
        review.push(' ');
        review.push_str(suffix);
    }

    review
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with(rating: u8) -> ReviewInput {
        ReviewInput::new("TechFix Computer Repair", "fixed my laptop quickly.")
            .with_rating(Rating::new(rating).unwrap())
    }

    #[test]
    fn test_phrase_and_suffix_for_every_rating() {
        let expected = [
            (1, "Poor experience.", Some("Hope they can improve.")),
            (2, "Okay experience, could be better.", Some("Hope they can improve.")),
            (3, "Good experience overall.", None),
            (4, "Very good experience.", Some("Highly recommended!")),
            (5, "Excellent experience!", Some("Highly recommended!")),
        ];

        for (rating, phrase, suffix) in expected {
            let review = fallback_review(&input_with(rating));
            assert!(review.contains(phrase), "rating {}: {}", rating, review);
            assert!(review.contains(&format!("I would rate this {} out of 5 stars.", rating)));
            match suffix {
                Some(suffix) => assert!(review.ends_with(suffix), "rating {}: {}", rating, review),
                None => {
                    assert!(!review.contains("Highly recommended!"));
                    assert!(!review.contains("Hope they can improve."));
                    assert!(review.ends_with("out of 5 stars."));
                }
            }
        }
    }

    #[test]
    fn test_exact_text() {
        let review = fallback_review(&input_with(3));
        assert_eq!(
            review,
            "I visited TechFix Computer Repair and fixed my laptop quickly. \
             Good experience overall. I would rate this 3 out of 5 stars."
        );
    }

    #[test]
    fn test_missing_rating() {
        let review = fallback_review(&ReviewInput::new("Cafe", "had coffee."));
        assert!(review.contains("Had an experience."));
        assert!(review.contains("an unknown number out of 5 stars."));
        assert!(recommendation_suffix(None).is_none());
    }
}
