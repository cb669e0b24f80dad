mod helpers;

use axum::http::Method;
use helpers::{default_server, test_server, MockDescriber, MockReply, PHOTO_JPEG, PHOTO_PNG, TEST_API_KEY};
use serde_json::{json, Value};
use snaptogether_core::{GenerationMode, ServiceConfig};
use std::time::Duration;

fn body(pose: &str) -> Value {
    json!({
        "prompt": "Create a highly realistic photo of these two people together",
        "photo1": PHOTO_PNG,
        "photo2": PHOTO_JPEG,
        "pose": pose,
    })
}

#[tokio::test]
async fn test_generate_success_returns_placeholder_image() {
    let describer = MockDescriber::replying("Both people smiling, warm light.");
    let server = default_server(describer.clone()).await;

    let response = server.post("/api/generate").json(&body("hugging")).await;

    assert_eq!(response.status_code(), 200);
    let json = response.json::<Value>();
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Analysis complete");
    assert_eq!(json["analysis"], "Both people smiling, warm light.");
    assert_eq!(json["imageUrl"], PHOTO_PNG);
    assert!(json["note"].as_str().is_some());
    assert!(json.get("mode").is_none());

    let calls = describer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].api_key, TEST_API_KEY);
    assert_eq!(calls[0].images[0].media_type, "image/png");
    assert_eq!(calls[0].images[1].media_type, "image/jpeg");
    assert_eq!(calls[0].images[1].data, "/9j/4AAQSkZJRg==");
    assert!(calls[0]
        .instruction
        .starts_with("Create a highly realistic photo of these two people together"));
    assert!(calls[0].instruction.contains("in the specified pose: hugging."));
}

#[tokio::test]
async fn test_generate_missing_photo2_is_bad_request() {
    let describer = MockDescriber::replying("unused");
    let server = default_server(describer.clone()).await;

    let response = server
        .post("/api/generate")
        .json(&json!({
            "prompt": "p",
            "photo1": PHOTO_PNG,
            "pose": "hugging",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let json = response.json::<Value>();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Missing required parameters");
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(describer.calls().is_empty());
}

#[tokio::test]
async fn test_generate_blank_pose_is_bad_request() {
    let server = default_server(MockDescriber::replying("unused")).await;

    let response = server.post("/api/generate").json(&body("  ")).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["error"], "Missing required parameters");
}

#[tokio::test]
async fn test_generate_without_credential_names_variable() {
    let describer = MockDescriber::replying("unused");
    let server = test_server(ServiceConfig::default(), describer.clone(), None).await;

    let response = server.post("/api/generate").json(&body("hugging")).await;

    assert_eq!(response.status_code(), 500);
    let json = response.json::<Value>();
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "API key not configured. Please set GEMINI_API_KEY in the server environment."
    );
    assert_eq!(json["code"], "CONFIGURATION_ERROR");
    assert!(describer.calls().is_empty());
}

#[tokio::test]
async fn test_generate_with_placeholder_credential_fails() {
    let describer = MockDescriber::replying("unused");
    let server = test_server(ServiceConfig::default(), describer.clone(), Some("your-api-key")).await;

    let response = server.post("/api/generate").json(&body("hugging")).await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(response.json::<Value>()["code"], "CONFIGURATION_ERROR");
    assert!(describer.calls().is_empty());
}

#[tokio::test]
async fn test_generate_rejects_non_data_uri_photo() {
    let describer = MockDescriber::replying("unused");
    let server = default_server(describer.clone()).await;

    let response = server
        .post("/api/generate")
        .json(&json!({
            "prompt": "p",
            "photo1": "https://example.com/me.jpg",
            "photo2": PHOTO_JPEG,
            "pose": "hugging",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let json = response.json::<Value>();
    assert_eq!(json["code"], "INVALID_INPUT");
    assert!(json["error"].as_str().unwrap().contains("data URI"));
    assert!(describer.calls().is_empty());
}

#[tokio::test]
async fn test_generate_upstream_failure_is_server_error() {
    let describer = MockDescriber::new(MockReply::Status(
        429,
        "Resource has been exhausted".to_string(),
    ));
    let server = default_server(describer).await;

    let response = server.post("/api/generate").json(&body("hugging")).await;

    assert_eq!(response.status_code(), 500);
    let json = response.json::<Value>();
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert_eq!(json["recoverable"], true);
    assert_eq!(
        json["error"],
        "Gemini API request failed: 429 - Resource has been exhausted"
    );
}

#[tokio::test]
async fn test_generate_upstream_timeout() {
    let config = ServiceConfig {
        upstream_timeout_secs: 1,
        ..Default::default()
    };
    let describer = MockDescriber::new(MockReply::Delay(Duration::from_secs(5)));
    let server = test_server(config, describer, Some(TEST_API_KEY)).await;

    let response = server.post("/api/generate").json(&body("hugging")).await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(response.json::<Value>()["code"], "UPSTREAM_TIMEOUT");
}

#[tokio::test]
async fn test_generate_analysis_mode_echoes_inputs() {
    let config = ServiceConfig {
        generation_mode: GenerationMode::Analysis,
        ..Default::default()
    };
    let describer = MockDescriber::replying("Person 1 wears a blue jacket.");
    let server = test_server(config, describer.clone(), Some(TEST_API_KEY)).await;

    let response = server.post("/api/generate").json(&body("sitting")).await;

    assert_eq!(response.status_code(), 200);
    let json = response.json::<Value>();
    assert_eq!(json["success"], true);
    assert_eq!(json["mode"], "client-side-merge");
    assert_eq!(json["photo1"], PHOTO_PNG);
    assert_eq!(json["photo2"], PHOTO_JPEG);
    assert_eq!(json["pose"], "sitting");
    assert_eq!(json["imageUrl"], PHOTO_PNG);

    let instruction = &describer.calls()[0].instruction;
    assert!(instruction.starts_with("Analyze these two photos"));
    assert!(instruction.contains("for a sitting pose"));
}

#[tokio::test]
async fn test_generate_malformed_json_is_bad_request() {
    let server = default_server(MockDescriber::replying("unused")).await;

    let response = server
        .post("/api/generate")
        .add_header("Content-Type", "application/json")
        .text("{\"prompt\": ")
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_generate_body_over_limit_is_rejected() {
    let config = ServiceConfig {
        max_request_body_bytes: 1024,
        ..Default::default()
    };
    let describer = MockDescriber::replying("unused");
    let server = test_server(config, describer.clone(), Some(TEST_API_KEY)).await;

    let large_photo = format!("data:image/png;base64,{}", "A".repeat(4096));
    let response = server
        .post("/api/generate")
        .json(&json!({
            "prompt": "p",
            "photo1": large_photo,
            "photo2": PHOTO_JPEG,
            "pose": "hugging",
        }))
        .await;

    assert_eq!(response.status_code(), 413);
    assert_eq!(response.json::<Value>()["code"], "PAYLOAD_TOO_LARGE");
    assert!(describer.calls().is_empty());
}

#[tokio::test]
async fn test_other_methods_are_not_allowed() {
    let server = default_server(MockDescriber::replying("unused")).await;

    for response in [
        server.get("/api/generate").await,
        server.put("/api/generate").json(&body("hugging")).await,
        server.delete("/api/generate").await,
    ] {
        assert_eq!(response.status_code(), 405);
        let json = response.json::<Value>();
        assert_eq!(json["error"], "Method not allowed");
        assert_eq!(json["success"], false);
    }
}

#[tokio::test]
async fn test_options_preflight_is_answered_with_cors_headers() {
    let describer = MockDescriber::replying("unused");
    let server = default_server(describer.clone()).await;

    let response = server
        .method(Method::OPTIONS, "/api/generate")
        .add_header("Origin", "http://localhost:5173")
        .add_header("Access-Control-Request-Method", "POST")
        .add_header("Access-Control-Request-Headers", "content-type")
        .await;

    assert_eq!(response.status_code(), 200);
    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "*"
    );
    let methods = headers
        .get("access-control-allow-methods")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("OPTIONS"));
    assert!(headers
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("content-type"));
    assert!(describer.calls().is_empty());
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let config = ServiceConfig {
        cors_origins: vec!["https://snaptogether.example".to_string()],
        ..Default::default()
    };
    let server = test_server(config, MockDescriber::replying("ok text"), Some(TEST_API_KEY)).await;

    let allowed = server
        .post("/api/generate")
        .add_header("Origin", "https://snaptogether.example")
        .json(&body("hugging"))
        .await;
    assert_eq!(
        allowed.headers().get("access-control-allow-origin").unwrap(),
        "https://snaptogether.example"
    );

    let other = server
        .post("/api/generate")
        .add_header("Origin", "https://evil.example")
        .json(&body("hugging"))
        .await;
    assert!(other.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_health_reports_provider_and_mode() {
    let server = default_server(MockDescriber::replying("unused")).await;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 200);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "alive");
    assert_eq!(json["provider"], "gemini");
    assert_eq!(json["mode"], "merge");
    assert_eq!(json["providers"], json!(["gemini"]));
}

#[tokio::test]
async fn test_error_details_follow_configured_environment() {
    let development = default_server(MockDescriber::replying("unused")).await;
    let response = development
        .post("/api/generate")
        .json(&json!({ "prompt": "p", "pose": "hugging" }))
        .await;
    let json = response.json::<Value>();
    assert_eq!(json["error_type"], "BadRequest");
    assert!(json["details"].as_str().is_some());

    let config = ServiceConfig {
        environment: "production".to_string(),
        cors_origins: vec!["https://snaptogether.example".to_string()],
        ..Default::default()
    };
    let production = test_server(config, MockDescriber::replying("unused"), Some(TEST_API_KEY)).await;
    let response = production
        .post("/api/generate")
        .json(&json!({ "prompt": "p", "pose": "hugging" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let json = response.json::<Value>();
    assert_eq!(json["error"], "Missing required parameters");
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json.get("details").is_none());
    assert!(json.get("error_type").is_none());
}
