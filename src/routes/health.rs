use axum::{http::StatusCode, routing::get, Router};

pub const LIVENESS_MESSAGE: &str = "Dr.LIKE Health Consultation Bot (QStash Ready & Stable) is running!";

pub fn router() -> Router {
    Router::new().route("/", get(health_check))
}

async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, LIVENESS_MESSAGE)
}
