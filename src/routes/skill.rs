use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{error, info, warn};

use crate::envelope::{format_ack, format_error, INVALID_REQUEST_MESSAGE, SUBMIT_FAILED_MESSAGE};
use crate::models::{AppState, SkillRequest};
use crate::queue::Job;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/skill", post(handle_skill))
        .with_state(state)
}

/// Queue the question and tell the platform the answer will arrive by callback
pub async fn handle_skill(
    State(state): State<AppState>,
    payload: Result<Json<SkillRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "[/skill] Unreadable request body");
            return (StatusCode::BAD_REQUEST, Json(format_error(INVALID_REQUEST_MESSAGE)))
                .into_response();
        }
    };

    let job = match Job::from_request(&request) {
        Ok(job) => job,
        Err(e) => {
            warn!(error = %e, "[/skill] Rejected request");
            return (e.status_code(), Json(format_error(INVALID_REQUEST_MESSAGE))).into_response();
        }
    };

    info!(input_len = job.user_input.len(), "[/skill] Received request. Publishing job...");

    match state.publisher.submit(&job).await {
        Ok(receipt) => {
            info!(message_id = %receipt.message_id, "[/skill] Job published");
            (StatusCode::OK, Json(format_ack())).into_response()
        }
        Err(e) => {
            error!(error = %e, "[/skill] Failed to publish job");
            (e.status_code(), Json(format_error(SUBMIT_FAILED_MESSAGE))).into_response()
        }
    }
}
