//! The HTTP backend talking to a live promptdeck server

use std::net::SocketAddr;
use std::sync::Arc;

use promptdeck_core::app::App;
use promptdeck_core::logger::Logger;
use promptdeck_core::prompt::{Category, PromptInput};
use promptdeck_core::server;
use promptdeck_core::store::{HttpBackend, MemoryBackend, PromptsClient};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn spawn_server() -> SocketAddr {
    let app = Arc::new(App::new(Arc::new(MemoryBackend::new()), Logger::memory().0));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server::router(app)).await.unwrap();
    });
    addr
}

fn remote_client(addr: SocketAddr) -> PromptsClient {
    let backend = HttpBackend::new(&format!("http://{}", addr)).unwrap();
    PromptsClient::new(Arc::new(backend), Logger::memory().0)
}

#[tokio::test]
async fn test_crud_through_http_backend() {
    let addr = spawn_server().await;
    let client = remote_client(addr);

    let created = client
        .create(
            PromptInput::new("Explain", "Explain this code")
                .with_category(Category::Code)
                .with_tags(["rust"]),
        )
        .await
        .unwrap();
    assert!(!created.id.is_empty());

    let updated = client
        .update(&created.id, PromptInput::new("Explain briefly", "In one paragraph"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Explain briefly");
    assert_eq!(updated.created_at, created.created_at);

    let all = client.get_all().await.unwrap();
    assert_eq!(all.len(), 1);

    client.delete(&created.id).await.unwrap();
    let err = client.delete(&created.id).await.unwrap_err();
    assert_eq!(err.category(), "not_found");
}

#[tokio::test]
async fn test_rest_errors_and_views() {
    let addr = spawn_server().await;
    let http = reqwest::Client::new();
    let base = format!("http://{}", addr);

    let response = http
        .post(format!("{}/prompts", base))
        .json(&json!({ "title": "  ", "content": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], json!(true));
    assert_eq!(body["category"], json!("validation"));

    let response = http
        .post(format!("{}/prompts", base))
        .json(&json!({ "title": "Ode", "category": "Poetry" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["category"], json!("arguments"));

    for (title, category) in [("one", "Code"), ("two", "Writing")] {
        let response = http
            .post(format!("{}/prompts", base))
            .json(&json!({ "title": title, "category": category, "tags": ["t"] }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    let view: Value = http
        .get(format!("{}/prompts/view?category=Code", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["view"]["prompts"].as_array().unwrap().len(), 1);

    let stats: Value = http
        .get(format!("{}/stats", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["totalPrompts"], json!(2));

    let response = http.post(format!("{}/migration", base)).send().await.unwrap();
    assert_eq!(response.status(), 409);
}
