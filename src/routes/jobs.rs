use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    routing::post,
    Json, Router,
};
use tracing::{error, info};

use crate::middleware::verify_queue_signature;
use crate::models::AppState;
use crate::queue::Job;

pub const JOB_PATH: &str = "/api/process-job";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(JOB_PATH, post(process_job))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            verify_queue_signature,
        ))
        .with_state(state)
}

/// Queue delivery endpoint. Machine-to-machine: status code and plain text only.
pub async fn process_job(
    State(state): State<AppState>,
    payload: Result<Json<Job>, JsonRejection>,
) -> (StatusCode, &'static str) {
    info!("[/api/process-job] Received job from queue");

    let job = match payload {
        Ok(Json(job)) => job,
        Err(rejection) => {
            error!(error = %rejection, "[/api/process-job] Malformed job payload");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process job.");
        }
    };

    match state.worker.process_job(&job).await {
        Ok(()) => (StatusCode::OK, "Job processed successfully."),
        Err(e) => {
            error!(error = %e, "[/api/process-job] Error processing job");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process job.")
        }
    }
}
