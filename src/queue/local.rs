// In-process queue for running without a hosted broker

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::queue::jobs::{Job, PublishReceipt};
use crate::queue::publisher::JobPublisher;
use crate::queue::workers::Worker;
use crate::types::{AppError, AppResult};

const LOCAL_QUEUE_CAPACITY: usize = 64;

/// Publisher backed by a bounded channel. A dispatcher task hands each job to
/// its own task, so jobs run independently and may finish out of order.
pub struct LocalQueue {
    sender: mpsc::Sender<(String, Job)>,
}

impl LocalQueue {
    /// Start the dispatcher on the current runtime
    pub fn spawn(worker: Arc<Worker>) -> Self {
        let (sender, mut receiver) = mpsc::channel::<(String, Job)>(LOCAL_QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some((message_id, job)) = receiver.recv().await {
                let worker = worker.clone();
                tokio::spawn(async move {
                    match worker.process_job(&job).await {
                        Ok(()) => info!(message_id = %message_id, "Local job completed"),
                        Err(e) => error!(message_id = %message_id, error = %e, "Local job failed"),
                    }
                });
            }
            warn!("Local queue closed");
        });

        Self { sender }
    }
}

#[async_trait]
impl JobPublisher for LocalQueue {
    async fn submit(&self, job: &Job) -> AppResult<PublishReceipt> {
        let message_id = format!("local_{}", Uuid::new_v4());
        self.sender
            .try_send((message_id.clone(), job.clone()))
            .map_err(|e| AppError::Delivery(format!("local queue unavailable: {}", e)))?;
        Ok(PublishReceipt { message_id })
    }
}
