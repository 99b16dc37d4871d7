use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::middleware::SignatureVerifier;
use crate::queue::{JobPublisher, Worker};

#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<dyn JobPublisher>,
    pub worker: Arc<Worker>,
    /// Present only when queue signing keys are configured
    pub verifier: Option<Arc<SignatureVerifier>>,
}

impl AppState {
    pub fn new(publisher: Arc<dyn JobPublisher>, worker: Arc<Worker>) -> Self {
        Self {
            publisher,
            worker,
            verifier: None,
        }
    }

    pub fn with_verifier(mut self, verifier: SignatureVerifier) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }
}

/// Structured answer the model is asked to produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    pub response_text: String,
    pub follow_up_questions: Vec<String>,
}

// API Request types

/// Inbound skill webhook; the platform sends many more fields than the two read here
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequest {
    #[serde(default)]
    pub user_request: Option<UserRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(default)]
    pub utterance: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

impl SkillRequest {
    pub fn utterance(&self) -> Option<&str> {
        self.user_request
            .as_ref()
            .and_then(|r| r.utterance.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.user_request
            .as_ref()
            .and_then(|r| r.callback_url.as_deref())
            .filter(|s| !s.is_empty())
    }
}
