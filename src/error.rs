//! Request-boundary errors.

use axum::http::StatusCode;
use thiserror::Error;

use crate::manifest::ArtifactError;
use crate::render::{RenderError, StreamRenderError};
use crate::routing::RouteNotFound;

/// Everything that can end a page request early.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    NotFound(#[from] RouteNotFound),

    #[error("build artifacts unavailable: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Stream(#[from] StreamRenderError),
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            PageError::NotFound(_) => StatusCode::NOT_FOUND,
            PageError::Artifact(_) | PageError::Render(_) | PageError::Stream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// `error: cause: cause` rendering of an error and its sources.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !chain.ends_with(&message) {
            chain.push_str(": ");
            chain.push_str(&message);
        }
        source = cause.source();
    }
    chain
}
