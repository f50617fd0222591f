//! Axum HTTP API for vtext.
//!
//! This crate provides:
//! - Font catalog listing and style sample images
//! - Synchronous overlay jobs confined to upload/output directories
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
