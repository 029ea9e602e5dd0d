//! REST API server for countries and persons behind JWT bearer authentication.

pub mod auth;
pub mod config;
pub mod cors;
pub mod dto;
pub mod error;
pub mod openapi;
pub mod pattern;
pub mod routes;
pub mod state;

use std::sync::Arc;

use atlas_core::AppError;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::Cors;
use crate::state::AppState;

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// The router wrapped in request tracing, a body size limit and CORS.
/// CORS is outermost so preflight requests never reach authentication.
pub fn app(state: Arc<AppState>, cors: &Cors) -> Result<Router, AppError> {
    Ok(routes::router(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors.layer()?))
}
