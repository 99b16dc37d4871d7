// Skill Relay - deferred-response relay between a chat skill platform, a job queue and an LLM

pub mod agents;
pub mod callback;
pub mod config;
pub mod envelope;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod queue;
pub mod routes;
pub mod types;
pub mod utils;

use std::sync::Arc;

use tracing::{info, warn};

use crate::agents::{AnswerAgent, PromptSet};
use crate::callback::CallbackClient;
use crate::config::QueueProvider;
use crate::middleware::SignatureVerifier;
use crate::queue::{JobPublisher, LocalQueue, QStashPublisher, Worker};
use crate::types::AppResult;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}

/// Wire the publisher, worker and delivery verifier described by `config`.
///
/// Must run inside a Tokio runtime: the local queue spawns its dispatcher.
pub fn build_state(config: &Config) -> AppResult<AppState> {
    let prompts = PromptSet::load(config.llm.prompt_dir.as_deref())?;
    let generator = AnswerAgent::from_config(&config.llm, prompts)?;
    let callback = CallbackClient::new(config.callback.timeout)?;
    let worker = Arc::new(Worker::new(Arc::new(generator), callback));

    let publisher: Arc<dyn JobPublisher> = match config.queue.provider {
        QueueProvider::QStash => {
            let job_url = config.queue.job_url();
            info!(job_url = %job_url, "Publishing jobs to QStash");
            Arc::new(QStashPublisher::new(
                &config.queue.qstash_url,
                &config.queue.qstash_token,
                &job_url,
            ))
        }
        QueueProvider::Local => {
            info!("Running jobs on the in-process queue");
            Arc::new(LocalQueue::spawn(worker.clone()))
        }
    };

    let state = AppState::new(publisher, worker);

    match &config.queue.current_signing_key {
        Some(key) => Ok(state.with_verifier(
            SignatureVerifier::new(key.clone(), config.queue.next_signing_key.clone())
                .with_expected_url(config.queue.job_url()),
        )),
        None => {
            if config.queue.provider == QueueProvider::QStash {
                warn!("QSTASH_CURRENT_SIGNING_KEY is not set; /api/process-job accepts unsigned deliveries");
            }
            Ok(state)
        }
    }
}
