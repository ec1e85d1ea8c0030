//! HTTP surface
//!
//! Exposes the stateless hashing service and the ledger read path. Writes
//! are not routed through here: issuers sign and submit calls to the ledger
//! themselves.

pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::verifier::Verifier;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Verifier,
}

impl AppState {
    pub fn new(verifier: Verifier) -> Self {
        Self { verifier }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/hash", post(handlers::hash_certificate))
        .route(
            "/verify/:cert_id",
            get(handlers::get_certificate).post(handlers::check_certificate),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .with_state(state)
}
