//! The Notifier (§4.4): best-effort, fire-and-forget alert delivery to a chat webhook.
//!
//! Delivery failures are logged and swallowed -- a notifier outage must never block or fail the
//! Pulse Ingestor or Sweeper, which have already committed the check's new state by the time the
//! Notifier runs.

pub mod payload;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info, instrument};

use crate::state_machine::Alert;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `alert` to `webhook_url`, authenticated with `api_token`. Never returns an error:
    /// failures are logged internally.
    async fn notify(&self, api_token: &str, webhook_url: &str, alert: &Alert);
}

#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: Client,
}

impl HttpNotifier {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("building the notifier's HTTP client must not fail");
        Self { client }
    }
}

impl Default for HttpNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[instrument(skip(self, api_token, webhook_url), fields(check_id = %alert.check_id, level = ?alert.level))]
    async fn notify(&self, api_token: &str, webhook_url: &str, alert: &Alert) {
        if api_token.is_empty() {
            error!("no API token configured; dropping alert silently");
            return;
        }
        if webhook_url.is_empty() {
            error!("no webhook configured for this alert level; dropping alert");
            return;
        }

        let payload = payload::build_payload(alert);

        match self
            .client
            .post(webhook_url)
            .bearer_auth(api_token)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!("alert delivered");
            }
            Ok(response) => {
                error!("notifier webhook returned status {}", response.status());
            }
            Err(e) => {
                error!("failed to deliver alert: {e}");
            }
        }
    }
}
