//! Request handlers.
//!
//! # Responsibilities
//! - `/healthz` liveness probe
//! - `/load/<route file>.json` page data for client navigation
//! - Page render for every other path
//!
//! # Design Decisions
//! - Route matching finishes before any module is loaded
//! - The first chunk of a page is rendered before the status line is sent,
//!   so failures at the top of the tree still produce a 500 page

use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::config::AppConfig;
use crate::error::PageError;
use crate::http::request::request_id;
use crate::http::response::{error_response, html_stream_response};
use crate::http::server::AppState;
use crate::modules::server_path;
use crate::observability::metrics;
use crate::render::data::data_module_path;
use crate::render::{DataModule, PageData, RenderRequest};
use crate::routing::{match_path, parse_query};

/// Liveness probe.
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Page data of a route, addressed by its output file with a `.json`
/// extension (`/load/pages/blog.json`).
pub async fn load_data_handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let config = state.config();
    let response = load_data(&state, &config, &file, request_id(&headers)).await;
    metrics::record_request("data", response.status().as_u16(), start);
    response
}

async fn load_data(state: &AppState, config: &AppConfig, file: &str, request_id: &str) -> Response {
    let Some(route_file) = file.strip_suffix(".json").map(|stem| format!("{stem}.js")) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    let routes = match state.artifacts().route_manifest(&config.build).await {
        Ok(routes) => routes,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Route manifest unavailable");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Build artifacts unavailable").into_response();
        }
    };
    if !routes.chunks().any(|(_, chunk)| chunk.file == route_file) {
        tracing::debug!(request_id = %request_id, file = %file, "No route for data request");
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let path = server_path(&data_module_path(&route_file));
    let data = match state.loader().try_load_default::<DataModule>(&path).await {
        Some(module) => module.load().await.transpose(),
        None => Ok(None),
    };

    match data {
        Ok(data) => Json(data.unwrap_or_default()).into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, route = %route_file, error = %e, "Data loader failed");
            metrics::record_render_failure("data");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(error_body(&e.to_string()))).into_response()
        }
    }
}

fn error_body(message: &str) -> PageData {
    let mut body = PageData::new();
    body.insert("error".into(), message.into());
    body
}

/// Render the page matching the request path.
pub async fn page_handler(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let start = Instant::now();
    let config = state.config();
    let request_id = request_id(&headers);

    tracing::debug!(request_id = %request_id, path = %uri.path(), "Rendering page");

    let response = match render_page(&state, &config, &uri).await {
        Ok(response) => response,
        Err(e) => {
            if e.status().is_server_error() {
                metrics::record_render_failure("compose");
            } else {
                tracing::debug!(request_id = %request_id, path = %uri.path(), "No route matched");
            }
            error_response(&config, &e).await
        }
    };

    metrics::record_request("page", response.status().as_u16(), start);
    response
}

async fn render_page(state: &AppState, config: &AppConfig, uri: &Uri) -> Result<Response, PageError> {
    let artifacts = state.artifacts();
    let routes = artifacts.route_manifest(&config.build).await?;
    let route = match_path(uri.path(), &routes)?;
    let query = parse_query(uri.query());

    let composed = state
        .composer()
        .compose(RenderRequest {
            route: &route,
            query,
            route_manifest: routes.clone(),
            client_manifest: artifacts.client_manifest().await?,
            import_map: artifacts.import_map().await?,
            build: &config.build,
        })
        .await?;

    let stream = state.renderer().render_primed(composed.tree).await?;
    Ok(html_stream_response(stream, &composed.nonce))
}
