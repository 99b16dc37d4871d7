// Job definition carried through the queue

use serde::{Deserialize, Serialize};

use crate::models::SkillRequest;
use crate::types::{AppError, AppResult};

/// Work handed from the intake endpoint to the execution endpoint.
///
/// The wire shape is what the queue stores and later delivers verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub user_input: String,
    pub callback_url: String,
}

impl Job {
    pub fn new(user_input: impl Into<String>, callback_url: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            callback_url: callback_url.into(),
        }
    }

    /// Build a job from a skill request, rejecting missing or empty fields
    pub fn from_request(request: &SkillRequest) -> AppResult<Self> {
        let user_input = request
            .utterance()
            .ok_or_else(|| AppError::Validation("userRequest.utterance is required".into()))?;
        let callback_url = request
            .callback_url()
            .ok_or_else(|| AppError::Validation("userRequest.callbackUrl is required".into()))?;

        Ok(Self::new(user_input, callback_url))
    }
}

/// Acknowledgment returned by a publisher once the queue owns the job
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReceipt {
    pub message_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_wire_shape() {
        let job = Job::new("hello", "https://cb.example/1");
        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            json!({ "userInput": "hello", "callbackUrl": "https://cb.example/1" })
        );
    }

    #[test]
    fn test_from_request_copies_fields() {
        let request: SkillRequest = serde_json::from_value(json!({
            "userRequest": { "utterance": "열이 나요", "callbackUrl": "https://cb.example/2" }
        }))
        .unwrap();

        let job = Job::from_request(&request).unwrap();
        assert_eq!(job, Job::new("열이 나요", "https://cb.example/2"));
    }

    #[test]
    fn test_from_request_rejects_missing_callback() {
        let request: SkillRequest = serde_json::from_value(json!({
            "userRequest": { "utterance": "열이 나요" }
        }))
        .unwrap();

        assert!(matches!(
            Job::from_request(&request),
            Err(AppError::Validation(_))
        ));
    }
}
