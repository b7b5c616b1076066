//! HTTP-level tests driving the router with `oneshot`.

use std::io;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use medchat::index::{Document, FlatIndex};
use medchat::rag::ExtractiveGenerator;
use medchat::semantic::StubEmbedder;
use medchat::{Chatbot, Embedder, KnowledgeBase, RagConfig, RagOrchestrator, Retriever};
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use tower::ServiceExt;

fn static_state(config: ServerConfig) -> Arc<ServerState> {
    let bot = Chatbot::new(Arc::new(KnowledgeBase::default()), None);
    Arc::new(ServerState::with_chatbot(config, bot))
}

async fn rag_state() -> Arc<ServerState> {
    let stub = StubEmbedder::new(128);
    let mut index = FlatIndex::new(stub.name(), 128);
    let text = "Cholera is an acute diarrhoeal infection caused by contaminated water.";
    index
        .insert(
            Document::new("cholera.txt#0", text, "cholera.txt"),
            stub.embed(text).await.unwrap(),
        )
        .unwrap();
    let retriever = Retriever::new(Arc::new(stub), Arc::new(index)).unwrap();
    let rag = RagOrchestrator::new(
        retriever,
        Arc::new(ExtractiveGenerator::new(2)),
        &RagConfig::default(),
    );
    let bot = Chatbot::new(Arc::new(KnowledgeBase::default()), Some(Arc::new(rag)));
    Arc::new(ServerState::with_chatbot(ServerConfig::default(), bot))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn send_message_response_shape() {
    let app = build_router(static_state(ServerConfig::default()));
    let (status, body) = send(
        &app,
        post_json(
            "/send_message",
            json!({"message": "I have a fever", "conversation_id": "c1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["conversation_id"], "c1");
    assert_eq!(body["response"]["type"], "symptom");
    assert!(body["response"]["text"]
        .as_str()
        .unwrap()
        .contains("Regarding **fever**"));
    assert_eq!(body["response"]["timestamp"].as_str().unwrap().len(), 5);
}

#[tokio::test]
async fn emergency_message() {
    let app = build_router(static_state(ServerConfig::default()));
    let (_, body) = send(
        &app,
        post_json("/send_message", json!({"message": "CHEST PAIN since an hour"})),
    )
    .await;
    assert_eq!(body["response"]["type"], "emergency");
    assert_eq!(body["conversation_id"], "default");
}

#[tokio::test]
async fn medical_question_with_rag() {
    let app = build_router(rag_state().await);
    let (status, body) = send(
        &app,
        post_json("/send_message", json!({"message": "what is cholera"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["type"], "rag");
    assert!(body["response"]["text"]
        .as_str()
        .unwrap()
        .contains("Cholera"));
}

#[tokio::test]
async fn medical_question_without_rag_apologises() {
    let app = build_router(static_state(ServerConfig::default()));
    let (status, body) = send(
        &app,
        post_json("/send_message", json!({"message": "what is cholera"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["response"]["type"], "general");
    assert_eq!(body["response"]["text"], KnowledgeBase::default().apology);
}

#[tokio::test]
async fn empty_body_fields_default() {
    let app = build_router(static_state(ServerConfig::default()));
    let (status, body) = send(&app, post_json("/send_message", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["type"], "general");
    assert_eq!(body["conversation_id"], "default");
}

#[tokio::test]
async fn overlong_message_rejected() {
    let config = ServerConfig {
        max_message_chars: 10,
        ..ServerConfig::default()
    };
    let app = build_router(static_state(config));
    let (status, body) = send(
        &app,
        post_json("/send_message", json!({"message": "a".repeat(11)})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MESSAGE_TOO_LONG");
}

#[tokio::test]
async fn overlong_emergency_message_still_alerts() {
    let state = static_state(ServerConfig::default());
    let app = build_router(state.clone());
    let message = format!("chest pain and I can't breathe. {}", "details ".repeat(300));
    assert!(message.chars().count() > state.config.max_message_chars);

    let (status, body) = send(
        &app,
        post_json("/send_message", json!({"message": message, "conversation_id": "e1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["type"], "emergency");
    assert!(body["response"]["text"]
        .as_str()
        .unwrap()
        .contains("EMERGENCY ALERT"));
    assert_eq!(state.conversations.history("e1").len(), 2);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = build_router(static_state(ServerConfig::default()));
    let request = Request::post("/send_message")
        .header("content-type", "application/json")
        .body(Body::from("{\"message\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = send(&app, post_json("/clear_chat", json!({"conversation_id": 7}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn history_and_idempotent_clear() {
    let state = static_state(ServerConfig::default());
    let app = build_router(state.clone());

    send(
        &app,
        post_json("/send_message", json!({"message": "hello", "conversation_id": "c9"})),
    )
    .await;
    send(
        &app,
        post_json("/send_message", json!({"message": "headache", "conversation_id": "c9"})),
    )
    .await;

    let (_, history) = send(&app, get("/history/c9")).await;
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["speaker"], "user");
    assert_eq!(messages[0]["text"], "hello");
    assert_eq!(messages[3]["type"], "symptom");

    for _ in 0..2 {
        let (status, body) =
            send(&app, post_json("/clear_chat", json!({"conversation_id": "c9"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }
    assert!(state.conversations.history("c9").is_empty());

    let (status, _) = send(&app, post_json("/clear_chat", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn disclaimer() {
    let app = build_router(static_state(ServerConfig::default()));
    let (status, body) = send(&app, get("/get_disclaimer")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "disclaimer");
    assert!(body["text"]
        .as_str()
        .unwrap()
        .starts_with("**IMPORTANT DISCLAIMER**"));
}

#[tokio::test]
async fn readiness_reports_rag() {
    let (_, degraded) = send(
        &build_router(static_state(ServerConfig::default())),
        get("/ready"),
    )
    .await;
    assert_eq!(degraded["components"]["rag"], "unavailable");
    assert_eq!(degraded["status"], "degraded");

    let (status, ready) = send(&build_router(rag_state().await), get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["components"]["rag"], "ready");
}

#[tokio::test]
async fn request_id_echoed_and_unknown_routes_404() {
    let app = build_router(static_state(ServerConfig::default()));
    let response = app
        .clone()
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let (status, body) = send(&app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn request_log_carries_request_id() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = build_router(static_state(ServerConfig::default()));
    let response = app
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "req-7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<&str> = output
        .lines()
        .filter(|line| line.contains("Request started") || line.contains("Request completed"))
        .collect();
    assert_eq!(lines.len(), 2, "{output}");
    assert!(lines.iter().all(|line| line.contains("request_id=req-7")), "{output}");
}
