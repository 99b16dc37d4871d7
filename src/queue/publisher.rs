// Job publishers: the hand-off from the intake endpoint to a queue

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::queue::jobs::{Job, PublishReceipt};
use crate::types::{AppError, AppResult};

#[async_trait]
pub trait JobPublisher: Send + Sync {
    /// Hand the job to the queue. Once this returns `Ok` the queue owns it.
    async fn submit(&self, job: &Job) -> AppResult<PublishReceipt>;
}

/// Publishes jobs to Upstash QStash, which later POSTs them to `destination`
pub struct QStashPublisher {
    client: Client,
    base_url: String,
    token: String,
    destination: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    message_id: String,
}

impl QStashPublisher {
    pub fn new(base_url: &str, token: &str, destination: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            destination: destination.to_string(),
        }
    }

    fn publish_url(&self) -> String {
        format!("{}/v2/publish/{}", self.base_url, self.destination)
    }
}

#[async_trait]
impl JobPublisher for QStashPublisher {
    async fn submit(&self, job: &Job) -> AppResult<PublishReceipt> {
        let response = self
            .client
            .post(self.publish_url())
            .bearer_auth(&self.token)
            .json(job)
            .send()
            .await
            .map_err(|e| AppError::Delivery(format!("QStash publish failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Delivery(format!(
                "QStash publish rejected ({}): {}",
                status, error_text
            )));
        }

        let published: PublishResponse = response
            .json()
            .await
            .map_err(|e| AppError::Delivery(format!("Unexpected QStash response: {}", e)))?;

        debug!(message_id = %published.message_id, "Job published to QStash");

        Ok(PublishReceipt {
            message_id: published.message_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const DESTINATION: &str = "https://relay.example.app/api/process-job";

    #[test]
    fn test_publish_url_embeds_destination() {
        let publisher = QStashPublisher::new("https://qstash.upstash.io/", "token", DESTINATION);
        assert_eq!(
            publisher.publish_url(),
            "https://qstash.upstash.io/v2/publish/https://relay.example.app/api/process-job"
        );
    }

    #[tokio::test]
    async fn test_submit_posts_job_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", format!("/v2/publish/{}", DESTINATION).as_str())
            .match_header("authorization", "Bearer qstash-token")
            .match_body(Matcher::Json(json!({
                "userInput": "열이 나요",
                "callbackUrl": "https://cb.example/1"
            })))
            .with_status(201)
            .with_body(r#"{"messageId":"msg_123"}"#)
            .expect(1)
            .create_async()
            .await;

        let publisher = QStashPublisher::new(&server.url(), "qstash-token", DESTINATION);
        let receipt = publisher
            .submit(&Job::new("열이 나요", "https://cb.example/1"))
            .await
            .unwrap();

        assert_eq!(receipt.message_id, "msg_123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_failure_is_delivery_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(401)
            .with_body("invalid token")
            .create_async()
            .await;

        let publisher = QStashPublisher::new(&server.url(), "wrong", DESTINATION);
        match publisher.submit(&Job::new("q", "https://cb.example/1")).await {
            Err(AppError::Delivery(msg)) => assert!(msg.contains("401")),
            other => panic!("expected delivery error, got {:?}", other),
        }
    }
}
