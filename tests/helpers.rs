#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use article_referent::{api::routes::create_router, config::Config, AppState};

pub const API_KEY: &str = "test-key";

pub fn article_html() -> String {
    let paragraph = "Researchers have published a long study about memory safety in systems \
        programming languages and what it means for the software industry at large.";
    format!(
        "<html><head><title>Memory safety study</title></head><body>\
         <nav>Home | World | Tech</nav>\
         <article><h1 class=\"entry-title\">Memory safety study</h1>\
         <script>trackPageView();</script><p>{p}</p><p>{p}</p></article>\
         <footer>All rights reserved</footer></body></html>",
        p = paragraph
    )
}

pub fn completion(content: &str) -> Value {
    json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
}

pub fn long_article() -> Value {
    json!({
        "title": "Memory safety study",
        "content": "Researchers have published a long study about memory safety in systems languages."
    })
}

/// Config pointed at the mock servers, with a text key and no image key.
pub fn test_config(provider: &MockServer) -> Config {
    Config {
        openrouter_api_key: Some(API_KEY.to_string()),
        openrouter_base_url: provider.uri(),
        huggingface_base_url: format!("{}/models", provider.uri()),
        huggingface_model: "test-model".to_string(),
        ..Config::default()
    }
}

pub fn test_app(config: Config) -> Router {
    create_router(AppState::new(config).unwrap())
}

pub async fn mount_article(site: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_html())
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(site)
        .await;
}

pub async fn mount_completion(provider: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
        .mount(provider)
        .await;
}

pub async fn post_json(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
