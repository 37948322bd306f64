//! Error pages and HTML responses.
//!
//! # Responsibilities
//! - 404 and 500 pages, user-supplied or built in
//! - Stream page bodies with the CSP header attached
//!
//! # Design Decisions
//! - User pages live next to the routes as `404.html` / `500.html`
//! - The error chain is only exposed outside production

use std::path::PathBuf;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::config::AppConfig;
use crate::error::{error_chain, PageError};
use crate::render::nonce::{content_security_policy, generate_nonce};
use crate::render::HtmlStream;

/// Replaced by the configured asset base URL.
pub const ASSET_BASE_URL_TOKEN: &str = "%ASSET_BASE_URL%";
/// Replaced by the error chain outside production.
pub const STACK_TOKEN: &str = "<!--stack-->";

const BUILTIN_NOT_FOUND: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Not Found</title>
<link rel="stylesheet" href="%ASSET_BASE_URL%styles.css">
</head>
<body>
<h1>404</h1>
<p>This page could not be found.</p>
</body>
</html>
"#;

const BUILTIN_SERVER_ERROR: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Internal Server Error</title>
<link rel="stylesheet" href="%ASSET_BASE_URL%styles.css">
</head>
<body>
<h1>500</h1>
<p>Something went wrong.</p>
<pre><!--stack--></pre>
</body>
</html>
"#;

fn user_page(config: &AppConfig, name: &str) -> PathBuf {
    PathBuf::from(&config.build.root_dir)
        .join(&config.build.route_dir)
        .join(name)
}

async fn load_page(config: &AppConfig, name: &str, builtin: &str) -> String {
    let html = match tokio::fs::read_to_string(user_page(config, name)).await {
        Ok(html) => html,
        Err(_) => builtin.to_string(),
    };
    html.replace(ASSET_BASE_URL_TOKEN, &config.build.asset_base_url)
}

/// Body of the 404 page.
pub async fn not_found_html(config: &AppConfig) -> String {
    load_page(config, "404.html", BUILTIN_NOT_FOUND).await
}

/// Body of the 500 page for `error`.
pub async fn server_error_html(config: &AppConfig, error: &PageError) -> String {
    let html = load_page(config, "500.html", BUILTIN_SERVER_ERROR).await;
    if config.is_production() {
        html
    } else {
        html.replace(STACK_TOKEN, &escape_html(&error_chain(error)))
    }
}

/// Full response for a failed page request.
pub async fn error_response(config: &AppConfig, error: &PageError) -> Response {
    let status = error.status();
    let html = if status == StatusCode::NOT_FOUND {
        not_found_html(config).await
    } else {
        tracing::error!(error = %error_chain(error), "Page request failed");
        server_error_html(config, error).await
    };
    let mut response = (status, Html(html)).into_response();
    set_script_policy(&mut response, &generate_nonce());
    response
}

/// Streaming page response carrying the nonce policy.
pub fn html_stream_response(stream: HtmlStream, nonce: &str) -> Response {
    let mut response = Html::from(Body::from_stream(stream)).into_response();
    set_script_policy(&mut response, nonce);
    response
}

fn set_script_policy(response: &mut Response, nonce: &str) {
    if let Ok(policy) = HeaderValue::from_str(&content_security_policy(nonce)) {
        response
            .headers_mut()
            .insert(header::CONTENT_SECURITY_POLICY, policy);
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
