//! HttpDocumentApi 对本地桩后端的集成测试

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use doc_chat::{
    ClientConfig, DocChatError, DocumentApi, ExportFormat, HttpDocumentApi, SessionId, UploadFile,
};

/// 桩后端收到的上传部件：(字段名, 文件名, 字节数)
type Parts = Arc<Mutex<Vec<(String, String, usize)>>>;

async fn upload(State(parts): State<Parts>, mut multipart: Multipart) -> Response {
    let mut names = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        names.push(file_name.clone());
        parts.lock().unwrap().push((field_name, file_name, len));
    }

    Json(json!({
        "session_id": "abc123",
        "message": "Files processed successfully",
        "processed_files": names,
    }))
    .into_response()
}

async fn chat(Json(body): Json<Value>) -> Response {
    if body["session_id"] == "missing" {
        return (StatusCode::NOT_FOUND, "Session not found").into_response();
    }
    Json(json!({
        "response": format!("**echo** {}", body["message"].as_str().unwrap_or_default()),
        "sources": ["policy.pdf"],
    }))
    .into_response()
}

async fn download(Json(body): Json<Value>) -> Response {
    let format = body["format"].as_str().unwrap_or_default().to_string();
    format!("Chat History ({})", format).into_bytes().into_response()
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": "1.0.0",
        "timestamp": "2024-01-01T00:00:00",
        "services": { "gemini": true, "azure_vision": false },
    }))
}

async fn spawn_backend() -> (SocketAddr, Parts) {
    let parts: Parts = Arc::default();
    let app = Router::new()
        .route("/api/upload", post(upload))
        .route("/api/chat", post(chat))
        .route("/api/download", post(download))
        .route("/health", get(health))
        .with_state(parts.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, parts)
}

fn client(addr: SocketAddr) -> HttpDocumentApi {
    // 末尾的斜杠应当被去掉
    let config = ClientConfig::new().with_base_url(format!("http://{}/", addr));
    HttpDocumentApi::new(config).unwrap()
}

#[tokio::test]
async fn test_upload_sends_one_part_per_file() {
    let (addr, parts) = spawn_backend().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.pdf"), b"%PDF-1.4 test").unwrap();
    std::fs::write(dir.path().join("b.txt"), b"hello").unwrap();

    let files = vec![
        UploadFile::from_path(dir.path().join("a.pdf")).unwrap(),
        UploadFile::from_path(dir.path().join("b.txt")).unwrap(),
    ];

    let receipt = client(addr).upload(&files).await.unwrap();
    assert_eq!(receipt.session_id, SessionId::new("abc123"));
    assert_eq!(receipt.processed_files, vec!["a.pdf", "b.txt"]);

    let parts = parts.lock().unwrap().clone();
    assert_eq!(
        parts,
        vec![
            ("files".to_string(), "a.pdf".to_string(), 13),
            ("files".to_string(), "b.txt".to_string(), 5),
        ]
    );
}

#[tokio::test]
async fn test_chat_round_trip() {
    let (addr, _) = spawn_backend().await;
    let reply = client(addr)
        .send_message(&SessionId::new("abc123"), "What is the refund policy?")
        .await
        .unwrap();

    assert_eq!(reply.response, "**echo** What is the refund policy?");
    assert_eq!(reply.sources, vec!["policy.pdf"]);
}

#[tokio::test]
async fn test_error_status_surfaces() {
    let (addr, _) = spawn_backend().await;
    let err = client(addr)
        .send_message(&SessionId::new("missing"), "hi")
        .await
        .unwrap_err();

    match err {
        DocChatError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Session not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_download_returns_raw_bytes() {
    let (addr, _) = spawn_backend().await;
    let bytes = client(addr)
        .download(&SessionId::new("abc123"), ExportFormat::Pdf)
        .await
        .unwrap();
    assert_eq!(bytes, b"Chat History (pdf)");
}

#[tokio::test]
async fn test_health() {
    let (addr, _) = spawn_backend().await;
    let status = client(addr).health().await.unwrap();
    assert!(status.is_healthy());
    assert_eq!(status.summary(), "healthy (version 1.0.0) [azure_vision=off, gemini=on]");
}

#[tokio::test]
async fn test_unreachable_backend_is_http_error() {
    let (addr, _) = spawn_backend().await;
    let config = ClientConfig::new().with_base_url(format!("http://{}", addr));
    let api = HttpDocumentApi::new(config).unwrap();
    let bogus = HttpDocumentApi::new(ClientConfig::new().with_base_url("http://127.0.0.1:9")).unwrap();

    assert!(api.health().await.is_ok());
    assert!(matches!(bogus.health().await, Err(DocChatError::Http(_))));
}
