use serde_json::json;
use vertbot::models::ConversationTurn;
use vertbot::services::completion::{CompletionError, CompletionService, OpenAiClient};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(
        server.uri(),
        "test-key".to_string(),
        "gpt-4.1-mini".to_string(),
    )
}

fn history() -> Vec<ConversationTurn> {
    vec![
        ConversationTurn::user("Where do I park?"),
        ConversationTurn::assistant("In the garage under the building."),
        ConversationTurn::user("And the wifi?"),
    ]
}

#[tokio::test]
async fn test_returns_trimmed_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "  The code is cabin-net.  "}}]
        })))
        .mount(&server)
        .await;

    let reply = client(&server)
        .complete("You are a concierge.", &history(), 0.7, Some(500))
        .await
        .unwrap();
    assert_eq!(reply, "The code is cabin-net.");
}

#[tokio::test]
async fn test_sends_bearer_auth_and_system_prompt_first() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4.1-mini",
            "messages": [
                {"role": "system", "content": "You are a concierge."},
                {"role": "user", "content": "Where do I park?"},
                {"role": "assistant", "content": "In the garage under the building."},
                {"role": "user", "content": "And the wifi?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server)
        .complete("You are a concierge.", &history(), 0.7, Some(500))
        .await
        .unwrap();
    assert_eq!(reply, "ok");
}

#[tokio::test]
async fn test_max_tokens_is_omitted_when_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        })))
        .mount(&server)
        .await;

    client(&server)
        .complete("extract", &history(), 0.0, None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("max_tokens").is_none());
    assert_eq!(body["temperature"], json!(0.0));
}

#[tokio::test]
async fn test_empty_choices_yield_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let reply = client(&server)
        .complete("sys", &history(), 0.7, Some(500))
        .await
        .unwrap();
    assert_eq!(reply, "");
}

#[tokio::test]
async fn test_null_content_yields_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        })))
        .mount(&server)
        .await;

    let reply = client(&server)
        .complete("sys", &history(), 0.7, Some(500))
        .await
        .unwrap();
    assert_eq!(reply, "");
}

#[tokio::test]
async fn test_upstream_error_maps_to_api_variant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "type": "requests"}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete("sys", &history(), 0.7, Some(500))
        .await
        .unwrap_err();
    match err {
        CompletionError::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "Rate limit reached");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete("sys", &history(), 0.7, Some(500))
        .await
        .unwrap_err();
    match err {
        CompletionError::Api { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "bad gateway");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_maps_to_http_variant() {
    // Nothing listens on this port.
    let client = OpenAiClient::new(
        "http://127.0.0.1:1".to_string(),
        "test-key".to_string(),
        "gpt-4.1-mini".to_string(),
    );
    let err = client
        .complete("sys", &history(), 0.7, Some(500))
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::Http(_)));
}
