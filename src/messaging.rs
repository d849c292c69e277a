use async_trait::async_trait;
use chrono::Utc;
use failsafe::futures::CircuitBreaker;
use serde_json::{json, Value};
use std::time::Duration;

use crate::circuit_breaker::{create_messaging_circuit_breaker, MessagingCircuitBreaker};
use crate::contacts::whatsapp_recipient;
use crate::errors::AppError;
use crate::models::DeliveryReceipt;

/// Outbound "send text message to recipient" capability.
///
/// Proposals and stage notifications only depend on this trait; the
/// transport behind it is swappable.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends `body` to the customer reachable at `recipient` (a phone number
    /// in any common Brazilian format).
    async fn send_message(&self, recipient: &str, body: &str) -> Result<DeliveryReceipt, AppError>;
}

/// Client for the WhatsApp Business Cloud API.
#[derive(Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    base_url: String,
    phone_number_id: String,
    access_token: String,
    breaker: MessagingCircuitBreaker,
}

impl WhatsAppClient {
    /// Creates a new `WhatsAppClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Graph API base URL including the version segment.
    /// * `phone_number_id` - Id of the sending business phone number.
    /// * `access_token` - Bearer token for the Graph API.
    pub fn new(
        base_url: String,
        phone_number_id: String,
        access_token: String,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create WhatsApp client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            phone_number_id,
            access_token,
            breaker: create_messaging_circuit_breaker(),
        })
    }

    async fn post_text(&self, to: &str, body: &str) -> Result<Option<String>, AppError> {
        let url = format!("{}/{}/messages", self.base_url, self.phone_number_id);

        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": { "body": body }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("WhatsApp request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "WhatsApp returned {}: {}",
                status, error_text
            )));
        }

        let data: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse WhatsApp response: {}", e))
        })?;

        Ok(data
            .get("messages")
            .and_then(|m| m.get(0))
            .and_then(|m| m.get("id"))
            .and_then(|id| id.as_str())
            .map(str::to_string))
    }
}

#[async_trait]
impl MessageSender for WhatsAppClient {
    async fn send_message(&self, recipient: &str, body: &str) -> Result<DeliveryReceipt, AppError> {
        let to = whatsapp_recipient(recipient)?;
        tracing::info!("Sending WhatsApp message to {}", to);

        match self.breaker.call(self.post_text(&to, body)).await {
            Ok(message_id) => {
                tracing::info!("✓ WhatsApp message accepted for {}: {:?}", to, message_id);
                Ok(DeliveryReceipt {
                    message_id,
                    recipient: to,
                    sent_at: Utc::now(),
                })
            }
            Err(failsafe::Error::Inner(e)) => {
                tracing::error!("WhatsApp send to {} failed: {}", to, e);
                Err(e)
            }
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("WhatsApp circuit open, not sending to {}", to);
                Err(AppError::ExternalApiError(
                    "WhatsApp circuit open; message not sent".to_string(),
                ))
            }
        }
    }
}
