//! API Routes
//!
//! - `POST /skill` - Chat skill webhook: queue the job, acknowledge immediately
//! - `POST /api/process-job` - Queue delivery: answer the job, POST to its callback
//! - `GET /` - Liveness probe

pub mod health;
pub mod jobs;
pub mod skill;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!(
        signed_deliveries = state.verifier.is_some(),
        "Creating application router"
    );

    Router::new()
        .merge(skill::router(state.clone()))
        .merge(jobs::router(state))
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
}
