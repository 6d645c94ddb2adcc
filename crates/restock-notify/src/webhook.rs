//! Webhook delivery of notification threads.
//!
//! Posts JSON statuses to a configured endpoint; replying into a thread is
//! expressed through `in_reply_to`. Delivery is strictly best-effort: every
//! failure is logged and swallowed, so a lost notification never leaks into
//! stored state beyond an unset thread id.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use restock_core::{Notifier, Product};

use crate::error::NotifyError;
use crate::format;

/// Response body of a successful status post.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    id: i64,
}

/// [`Notifier`] implementation over a status-posting webhook.
pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl WebhookNotifier {
    /// Creates a notifier posting to `endpoint`, optionally authenticated
    /// with a bearer `token`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        endpoint: &str,
        token: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
            token: token.map(str::to_owned),
        })
    }

    async fn post_status(
        &self,
        message: &str,
        in_reply_to: Option<i64>,
    ) -> Result<i64, NotifyError> {
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "message": message,
            "in_reply_to": in_reply_to,
        }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let parsed: StatusResponse = response.json().await?;
        Ok(parsed.id)
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn create_thread(&self, product: &Product, shop_name: &str) -> Option<i64> {
        let message = format::available_message(shop_name, product);
        match self.post_status(&message, None).await {
            Ok(id) => {
                tracing::info!(thread_id = id, %message, "thread opened");
                Some(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, %message, "cannot open thread");
                None
            }
        }
    }

    async fn close_thread(&self, thread_id: i64, open_duration: Duration) -> Option<i64> {
        let message = format::closing_reply(open_duration);
        match self.post_status(&message, Some(thread_id)).await {
            Ok(id) => {
                tracing::info!(thread_id, reply_id = id, "thread closed");
                Some(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, thread_id, "cannot close thread");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "webhook_test.rs"]
mod tests;
