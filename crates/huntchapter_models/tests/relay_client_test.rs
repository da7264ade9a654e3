//! Tests for the relay clients against an in-process relay.

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Json;
use huntchapter_core::{GenerationRequest, ImagePrompt, RelayRequest};
use huntchapter_error::BackendErrorKind;
use huntchapter_interface::{ImageGenerator, TextGenerator};
use huntchapter_models::{RelayClient, RelayImageClient};
use serde_json::json;

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn echo(Json(body): Json<RelayRequest>) -> impl IntoResponse {
    Json(json!({ "text": format!("{{\"echo\": \"{}\"}}", body.prompt) }))
}

#[tokio::test]
async fn test_relay_returns_text() {
    let base = spawn(Router::new().route("/api/generate", post(echo))).await;
    let client = RelayClient::new(base).unwrap();

    let text = client.generate(&GenerationRequest::new("hello")).await.unwrap();
    assert_eq!(text, "{\"echo\": \"hello\"}");
    assert_eq!(client.provider_name(), "relay");
}

#[tokio::test]
async fn test_gateway_timeout_maps_to_timeout() {
    let router = Router::new().route(
        "/api/generate",
        post(|| async {
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({ "error": "aborted", "aborted": true })),
            )
        }),
    );
    let client = RelayClient::new(spawn(router).await).unwrap();

    let err = client.generate(&GenerationRequest::new("x")).await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_upstream_error_maps_to_unavailable() {
    let router = Router::new().route(
        "/api/generate",
        post(|| async {
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Upstream error", "status": 503 })),
            )
        }),
    );
    let client = RelayClient::new(spawn(router).await).unwrap();

    let err = client.generate(&GenerationRequest::new("x")).await.unwrap_err();
    match err.kind {
        BackendErrorKind::Unavailable(message) => {
            assert!(message.contains("Upstream error"));
            assert!(message.contains("503"));
        }
        other => panic!("unexpected kind: {other}"),
    }
}

#[tokio::test]
async fn test_empty_text_is_unavailable() {
    let router = Router::new().route(
        "/api/generate",
        post(|| async { Json(json!({ "text": "" })) }),
    );
    let client = RelayClient::new(spawn(router).await).unwrap();

    let err = client.generate(&GenerationRequest::new("x")).await.unwrap_err();
    assert!(matches!(err.kind, BackendErrorKind::Unavailable(_)));
}

#[tokio::test]
async fn test_unreachable_relay_is_unavailable() {
    let client = RelayClient::new("http://127.0.0.1:1").unwrap();
    let err = client.generate(&GenerationRequest::new("x")).await.unwrap_err();
    assert!(matches!(err.kind, BackendErrorKind::Unavailable(_)));
}

#[tokio::test]
async fn test_image_relay_returns_data_uri() {
    let router = Router::new().route(
        "/api/generate-image",
        post(|| async { Json(json!({ "image": "data:image/png;base64,AAAA" })) }),
    );
    let client = RelayImageClient::new(spawn(router).await).unwrap();

    let image = client
        .generate_image(&ImagePrompt {
            text: "a tower".to_string(),
            seed: 7,
        })
        .await
        .unwrap();
    assert!(image.is_data_uri());
}

#[tokio::test]
async fn test_image_relay_rejects_non_image_payload() {
    let router = Router::new().route(
        "/api/generate-image",
        post(|| async { Json(json!({ "image": "https://example.com/x.png" })) }),
    );
    let client = RelayImageClient::new(spawn(router).await).unwrap();

    let result = client
        .generate_image(&ImagePrompt {
            text: "a tower".to_string(),
            seed: 7,
        })
        .await;
    assert!(result.is_err());
}
