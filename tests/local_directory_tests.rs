use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use review_agent::infrastructure::PlatformError;
use review_agent::models::{BusinessId, PostReceipt, Rating};
use review_agent::platforms::local_directory::simulated_review_id;
use review_agent::platforms::{Credentials, LocalDirectoryPlatform, ReviewPlatform};

const UNREACHABLE: &str = "http://127.0.0.1:1";

async fn logged_in(base_url: &str, credentials: Credentials) -> LocalDirectoryPlatform {
    let mut platform = LocalDirectoryPlatform::new(base_url);
    assert!(platform.login(&credentials).await.unwrap());
    platform
}

#[tokio::test]
async fn test_unreachable_directory_is_simulated() {
    let platform = logged_in(UNREACHABLE, Credentials::new().with("api_key", "demo_key")).await;

    let id = platform
        .search_business("Mario's Italian Bistro", Some("New York"))
        .await
        .unwrap();
    assert_eq!(id.as_str(), "mario's_italian_bistro_new_york");

    let receipt = platform
        .post_review(&id, "Fantastic pasta.", Rating::new(5).unwrap())
        .await
        .unwrap();

    let PostReceipt::Simulated(post) = receipt else {
        panic!("expected a simulated post");
    };
    assert_eq!(post.status, "posted_successfully");
    assert_eq!(post.platform, "Local Directory (Simulated)");
    assert_eq!(post.id, simulated_review_id(&id, "Fantastic pasta."));
    assert!(post.id.starts_with("review_mario's_italian_bistro_new_york_"));
    let n: u64 = post.id.rsplit('_').next().unwrap().parse().unwrap();
    assert!(n < 10_000);
}

#[tokio::test]
async fn test_search_returns_first_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/businesses/search"))
        .and(query_param("name", "TechFix"))
        .and(query_param("location", "New York"))
        .and(header("authorization", "Bearer demo_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "businesses": [{"id": "biz-42", "name": "TechFix"}, {"id": "biz-43", "name": "TechFix 2"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let platform = logged_in(&server.uri(), Credentials::new().with("api_key", "demo_key")).await;
    let id = platform.search_business("TechFix", Some("New York")).await.unwrap();
    assert_eq!(id.as_str(), "biz-42");
}

#[tokio::test]
async fn test_search_creates_missing_business() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/businesses/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"businesses": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/businesses"))
        .and(body_partial_json(json!({
            "name": "New Cafe",
            "location": "Unknown Location",
            "category": "General Business"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let platform = logged_in(&server.uri(), Credentials::new()).await;
    let id = platform.search_business("New Cafe", None).await.unwrap();
    assert_eq!(id.as_str(), "7");
}

#[tokio::test]
async fn test_rejected_creation_uses_slug() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/businesses/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"businesses": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/businesses"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let platform = logged_in(&server.uri(), Credentials::new()).await;
    let id = platform.search_business("New Cafe", Some("Paris")).await.unwrap();
    assert_eq!(id.as_str(), "new_cafe_paris");
}

#[tokio::test]
async fn test_failed_search_uses_slug() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/businesses/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let platform = logged_in(&server.uri(), Credentials::new()).await;
    let id = platform.search_business("Smith, Jones", None).await.unwrap();
    assert_eq!(id.as_str(), "smith_jones");
}

#[tokio::test]
async fn test_post_review() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/businesses/biz-42/reviews"))
        .and(body_partial_json(json!({
            "text": "Quick repair.",
            "rating": 4,
            "author": "Review Agent User"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "rev-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let platform = logged_in(&server.uri(), Credentials::new()).await;
    let receipt = platform
        .post_review(&BusinessId::from("biz-42"), "Quick repair.", Rating::new(4).unwrap())
        .await
        .unwrap();

    assert_eq!(receipt, PostReceipt::Remote(json!({"id": "rev-1"})));
    assert_eq!(receipt.reference().as_deref(), Some("rev-1"));
}

#[tokio::test]
async fn test_slug_with_reserved_characters_is_escaped_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/businesses/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/businesses/joe%27s_diner_%232/reviews"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "rev-7"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/businesses/joe's_diner_"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "wrong"})))
        .expect(0)
        .mount(&server)
        .await;

    let platform = logged_in(&server.uri(), Credentials::new()).await;
    let id = platform.search_business("Joe's Diner #2", None).await.unwrap();
    assert_eq!(id.as_str(), "joe's_diner_#2");

    let receipt = platform
        .post_review(&id, "Great pancakes.", Rating::new(5).unwrap())
        .await
        .unwrap();
    assert_eq!(receipt.reference().as_deref(), Some("rev-7"));

    let requests = server.received_requests().await.unwrap();
    let post = requests.iter().find(|r| r.method.to_string() == "POST").unwrap();
    assert_eq!(post.url.path(), "/api/businesses/joe%27s_diner_%232/reviews");
}

#[tokio::test]
async fn test_rejected_post_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/businesses/biz-42/reviews"))
        .respond_with(ResponseTemplate::new(422).set_body_string("rating missing"))
        .mount(&server)
        .await;

    let platform = logged_in(&server.uri(), Credentials::new()).await;
    let err = platform
        .post_review(&BusinessId::from("biz-42"), "Quick repair.", Rating::new(4).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, PlatformError::PostingFailed { .. }));
    assert!(err.to_string().contains("rating missing"));
}

#[tokio::test]
async fn test_business_reviews() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/businesses/biz-42/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reviews": [{"id": "rev-1"}, {"id": "rev-2"}]
        })))
        .mount(&server)
        .await;

    let platform = logged_in(&server.uri(), Credentials::new()).await;
    assert_eq!(platform.get_business_reviews(&BusinessId::from("biz-42")).await.len(), 2);

    let offline = LocalDirectoryPlatform::new(UNREACHABLE);
    assert!(offline.get_business_reviews(&BusinessId::from("biz-42")).await.is_empty());
}
