// Job execution: generate the answer and deliver it to the callback URL

use std::sync::Arc;

use tracing::info;

use crate::agents::AnswerGenerator;
use crate::callback::CallbackClient;
use crate::envelope::format_answer;
use crate::queue::jobs::Job;
use crate::types::AppResult;

/// Runs delivered jobs. Shared by the queue webhook and the in-process queue.
pub struct Worker {
    generator: Arc<dyn AnswerGenerator>,
    callback: CallbackClient,
}

impl Worker {
    pub fn new(generator: Arc<dyn AnswerGenerator>, callback: CallbackClient) -> Self {
        Self {
            generator,
            callback,
        }
    }

    /// Process one job. No callback is sent unless an answer was produced.
    pub async fn process_job(&self, job: &Job) -> AppResult<()> {
        info!(input_len = job.user_input.len(), "Processing job");

        let answer = self.generator.generate(&job.user_input).await?;
        let envelope = format_answer(&answer.response_text, &answer.follow_up_questions);

        self.callback.deliver(&job.callback_url, &envelope).await?;

        info!(
            follow_ups = answer.follow_up_questions.len(),
            "Job processed and callback sent"
        );
        Ok(())
    }
}
