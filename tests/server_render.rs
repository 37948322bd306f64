//! End-to-end page serving over a live listener.

use reqwest::StatusCode;
use serde_json::json;

use pagewright::config::Environment;
use pagewright::http::X_REQUEST_ID;

mod common;

#[tokio::test]
async fn test_renders_dynamic_route() {
    let app = common::spawn_app(common::registry(), |_| {}).await;

    let response = reqwest::get(app.url("/blog/42?ref=home")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/html; charset=utf-8"
    );

    let policy = response.headers()["content-security-policy"]
        .to_str()
        .unwrap()
        .to_string();
    assert!(policy.starts_with("script-src 'nonce-"));
    let nonce = policy
        .trim_start_matches("script-src 'nonce-")
        .trim_end_matches('\'')
        .to_string();

    let request_id = response.headers()[X_REQUEST_ID].to_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&request_id).is_ok());

    let body = response.text().await.unwrap();
    assert!(body.starts_with("<!DOCTYPE html>"));
    assert!(body.contains(r#"<article data-id="42"><h1>Hello</h1></article>"#));
    assert!(body.contains("<title>Hello</title>"));
    assert!(body.contains(r#""routeContext":{"params":{"id":"42"},"query":{"ref":"home"},"pathPattern":"/blog/:id"}"#));
    assert!(body.contains(r#""hasProvidedApp":false"#));
    assert!(body.contains(r#"href="/_assets/pages/blog/[id].css""#));
    assert!(body.contains(r#""preact":"/_assets/vendor/preact.js""#));
    assert!(body.contains(&format!(r#"nonce="{nonce}""#)));
}

#[tokio::test]
async fn test_repeated_query_keys() {
    let app = common::spawn_app(common::registry(), |_| {}).await;

    let body = reqwest::get(app.url("/blog/7?tag=a&tag=b"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(r#""query":{"tag":["a","b"]}"#));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = common::spawn_app(common::registry(), |_| {}).await;

    let response = reqwest::Client::new()
        .get(app.url("/"))
        .header(X_REQUEST_ID, "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()[X_REQUEST_ID], "trace-me");
    assert!(response.text().await.unwrap().contains("<main>Welcome</main>"));
}

#[tokio::test]
async fn test_unknown_path_serves_user_404() {
    let app = common::spawn_app(common::registry(), |config| {
        config.build.asset_base_url = "https://cdn.test/".into();
    })
    .await;

    let response = reqwest::get(app.url("/nope/at/all")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("content-security-policy"));
    assert!(response.headers().contains_key(X_REQUEST_ID));
    assert_eq!(
        response.text().await.unwrap(),
        r#"<html><link href="https://cdn.test/styles.css"><h1>Lost</h1></html>"#
    );
}

#[tokio::test]
async fn test_component_failure_is_500() {
    let app = common::spawn_app(common::registry(), |_| {}).await;

    let response = reqwest::get(app.url("/broken")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().await.unwrap().contains("boom"));
}

#[tokio::test]
async fn test_production_hides_error_chain() {
    let app = common::spawn_app(common::registry(), |config| {
        config.environment = Environment::Production;
    })
    .await;

    let response = reqwest::get(app.url("/broken")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.text().await.unwrap().contains("boom"));

    // Memoized artifacts still serve the next request
    let response = reqwest::get(app.url("/blog/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_load_endpoint() {
    let app = common::spawn_app(common::registry(), |_| {}).await;

    let response = reqwest::get(app.url("/load/pages/blog/[id].json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let data: serde_json::Value = response.json().await.unwrap();
    assert_eq!(data, json!({"title": "Hello"}));

    // Route without a data module
    let data: serde_json::Value = reqwest::get(app.url("/load/pages/index.json"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(data, json!({}));

    let response = reqwest::get(app.url("/load/pages/missing.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = reqwest::get(app.url("/load/pages/fail.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("database offline"));
}

#[tokio::test]
async fn test_healthz() {
    let app = common::spawn_app(common::registry(), |_| {}).await;

    let response = reqwest::get(app.url("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(X_REQUEST_ID));
    assert_eq!(response.text().await.unwrap(), "OK");
}
