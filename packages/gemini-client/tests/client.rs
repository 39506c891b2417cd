//! Client behavior against a local stand-in for the Gemini API.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use gemini_client::{GeminiClient, GeminiError, TaskType};
use serde_json::{json, Value};

async fn handle(Path(action): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match action.as_str() {
        "text-embedding-004:embedContent" => {
            let dims = if body["taskType"] == "RETRIEVAL_QUERY" { 2 } else { 3 };
            (
                StatusCode::OK,
                Json(json!({ "embedding": { "values": vec![0.5; dims] } })),
            )
        }
        "gemini-2.5-flash:generateContent" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "code": 404, "message": "model not found", "status": "NOT_FOUND" } })),
        ),
        "gemini-pro-latest:generateContent" => {
            let prompt = body["contents"][0]["parts"][0]["text"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            (
                StatusCode::OK,
                Json(json!({
                    "candidates": [{ "content": { "parts": [{ "text": format!("echo: {}", prompt) }] } }]
                })),
            )
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "code": 400, "message": "unknown action" } })),
        ),
    }
}

async fn spawn_server() -> String {
    let app = Router::new().route("/v1beta/models/:action", post(handle));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1beta", addr)
}

#[tokio::test]
async fn test_embed_content_sends_task_type() {
    let base = spawn_server().await;
    let client = GeminiClient::new("test-key").with_base_url(base);

    let query = client
        .embed_content("fees", TaskType::RetrievalQuery)
        .await
        .unwrap();
    let document = client
        .embed_content("fees", TaskType::RetrievalDocument)
        .await
        .unwrap();

    assert_eq!(query.len(), 2);
    assert_eq!(document.len(), 3);
}

#[tokio::test]
async fn test_generate_falls_back_when_model_not_found() {
    let base = spawn_server().await;
    let client = GeminiClient::new("test-key").with_base_url(base);

    let reply = client.generate_content("hi").await.unwrap();
    assert_eq!(reply, "echo: hi");
}

#[tokio::test]
async fn test_generate_without_fallback_reports_not_found() {
    let base = spawn_server().await;
    let client = GeminiClient::new("test-key")
        .with_base_url(base)
        .with_fallback_model(None);

    let err = client.generate_content("hi").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, GeminiError::Api { ref message, .. } if message == "model not found"));
}
