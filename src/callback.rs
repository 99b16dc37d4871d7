// Delivery of finished answers to the caller-supplied callback URL

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::envelope::ResponseEnvelope;
use crate::types::{AppError, AppResult};

#[derive(Clone)]
pub struct CallbackClient {
    client: Client,
}

impl CallbackClient {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("cannot build callback client: {}", e)))?;
        Ok(Self { client })
    }

    /// POST the envelope; any transport failure or non-2xx answer is a delivery error
    pub async fn deliver(&self, callback_url: &str, envelope: &ResponseEnvelope) -> AppResult<()> {
        let response = self
            .client
            .post(callback_url)
            .json(envelope)
            .send()
            .await
            .map_err(|e| AppError::Delivery(format!("callback request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Delivery(format!(
                "callback rejected ({}): {}",
                status, body
            )));
        }

        debug!(status = %status, "Callback accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::format_answer;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_deliver_posts_envelope() {
        let envelope = format_answer("X", &["Q1", "Q2"]);
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/callback/abc")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::to_value(&envelope).unwrap()))
            .with_status(200)
            .with_body(r#"{"taskId":"abc","status":"SUCCESS"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = CallbackClient::new(Duration::from_secs(5)).unwrap();
        client
            .deliver(&format!("{}/callback/abc", server.url()), &envelope)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_callback_is_delivery_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/callback/expired")
            .with_status(410)
            .with_body("callback expired")
            .create_async()
            .await;

        let client = CallbackClient::new(Duration::from_secs(5)).unwrap();
        let result = client
            .deliver(
                &format!("{}/callback/expired", server.url()),
                &format_answer("X", &["Q1"]),
            )
            .await;

        match result {
            Err(AppError::Delivery(msg)) => assert!(msg.contains("410")),
            other => panic!("expected delivery error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_callback_is_delivery_error() {
        let client = CallbackClient::new(Duration::from_secs(1)).unwrap();
        let result = client
            .deliver("http://127.0.0.1:9/unreachable", &format_answer("X", &["Q1"]))
            .await;
        assert!(matches!(result, Err(AppError::Delivery(_))));
    }
}
