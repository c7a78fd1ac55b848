use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use review_agent::ai::providers::build_http_client;
use review_agent::ai::{CompletionProvider, CompletionRequest, OllamaProvider, OpenAIProvider, ReviewGenerator};
use review_agent::models::{GenerationSource, Rating, ReviewInput};

fn bistro_input() -> ReviewInput {
    ReviewInput::new(
        "Mario's Italian Bistro",
        "Amazing pasta, friendly staff, cozy atmosphere. The tiramisu was incredible!",
    )
    .with_rating(Rating::new(5).unwrap())
    .with_visit_date("2024-03-15")
}

fn openai(server: &MockServer) -> OpenAIProvider {
    OpenAIProvider::new(
        build_http_client(Duration::from_secs(5)).unwrap(),
        "sk-test".to_string(),
        Some(server.uri()),
        None,
    )
}

fn ollama(server: &MockServer) -> OllamaProvider {
    OllamaProvider::new(
        build_http_client(Duration::from_secs(5)).unwrap(),
        Some(server.uri()),
        Some("mistral".to_string()),
    )
}

#[tokio::test]
async fn test_openai_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "gpt-3.5-turbo", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "  What a lovely dinner.  "}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = openai(&server)
        .complete(&CompletionRequest::new("write a review"))
        .await
        .unwrap();
    assert_eq!(text, "What a lovely dinner.");
}

#[tokio::test]
async fn test_openai_error_carries_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .mount(&server)
        .await;

    let err = openai(&server)
        .complete(&CompletionRequest::new("write a review"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Incorrect API key provided"));
}

#[tokio::test]
async fn test_generator_uses_service_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "The tiramisu alone is worth the trip."}}]
        })))
        .mount(&server)
        .await;

    let generator = ReviewGenerator::new(Box::new(openai(&server)));
    let review = generator.generate(&bistro_input()).await;

    assert_eq!(review.text, "The tiramisu alone is worth the trip.");
    assert_eq!(
        review.source,
        GenerationSource::Service {
            provider: "openai".to_string()
        }
    );
}

#[tokio::test]
async fn test_generator_falls_back_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let generator = ReviewGenerator::new(Box::new(openai(&server)));
    let review = generator.generate(&bistro_input()).await;

    assert!(review.is_fallback());
    assert!(review.text.contains("Mario's Italian Bistro"));
    assert!(review
        .text
        .contains("Amazing pasta, friendly staff, cozy atmosphere. The tiramisu was incredible!"));
    assert!(review.text.contains("5 out of 5 stars."));
    assert!(review.text.ends_with("Highly recommended!"));
}

#[tokio::test]
async fn test_generator_falls_back_when_unreachable() {
    let provider = OpenAIProvider::new(
        build_http_client(Duration::from_secs(2)).unwrap(),
        "sk-test".to_string(),
        Some("http://127.0.0.1:1".to_string()),
        None,
    );

    let review = ReviewGenerator::new(Box::new(provider))
        .generate(&bistro_input())
        .await;
    assert!(review.is_fallback());
}

#[tokio::test]
async fn test_ollama_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"model": "mistral", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Great spot for pasta.\n",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let review = ReviewGenerator::new(Box::new(ollama(&server)))
        .generate(&bistro_input())
        .await;

    assert_eq!(review.text, "Great spot for pasta.");
    assert!(!review.is_fallback());
}

#[tokio::test]
async fn test_ollama_error_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "model 'mistral' not found"
        })))
        .mount(&server)
        .await;

    let err = ollama(&server)
        .complete(&CompletionRequest::new("hi"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("model 'mistral' not found"));

    let review = ReviewGenerator::new(Box::new(ollama(&server)))
        .generate(&bistro_input())
        .await;
    assert!(review.is_fallback());
}
