/// Deterministic business id derived from the name and optional location.
///
/// The name is lower-cased, spaces become underscores and commas are dropped.
/// A non-empty location is appended as `_<location>` with the same space
/// handling (commas in the location are kept).
pub fn business_slug(business_name: &str, location: Option<&str>) -> String {
    let mut slug = business_name.to_lowercase().replace(' ', "_").replace(',', "");

    if let Some(location) = location.filter(|l| !l.is_empty()) {
        slug.push('_');
        slug.push_str(&location.to_lowercase().replace(' ', "_"));
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_with_location() {
        assert_eq!(
            business_slug("Mario's Bistro", Some("New York")),
            "mario's_bistro_new_york"
        );
    }

    #[test]
    fn test_slug_is_stable() {
        let first = business_slug("Mario's Bistro", Some("New York"));
        for _ in 0..5 {
            assert_eq!(business_slug("Mario's Bistro", Some("New York")), first);
        }
    }

    #[test]
    fn test_slug_strips_commas_from_name() {
        assert_eq!(business_slug("Smith, Jones & Co", None), "smith_jones_&_co");
    }

    #[test]
    fn test_empty_location_is_ignored() {
        assert_eq!(business_slug("TechFix", Some("")), "techfix");
        assert_eq!(business_slug("TechFix", None), "techfix");
    }
}
