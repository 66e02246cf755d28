//! Webhook registration upkeep.
//!
//! Telegram silently drops webhook registrations now and then, and free-tier
//! hosts recycle instances without warning. The announcer re-posts
//! `setWebhook` on a fixed interval for the life of the process. Failures
//! are logged and retried on the next tick. The task holds no locks shared
//! with update handling, so a slow Bot API call never stalls a handler.

use std::time::Duration;

use wl_core::{config::Config, errors::Error, Result};

pub struct WebhookAnnouncer {
    http: reqwest::Client,
    endpoint: String,
    webhook_url: String,
    host: String,
    interval: Duration,
}

impl WebhookAnnouncer {
    pub fn new(cfg: &Config, webhook_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: set_webhook_endpoint(&cfg.bot_token),
            webhook_url,
            host: cfg.webhook_host.clone().unwrap_or_default(),
            interval: cfg.webhook_refresh,
        }
    }

    /// Fire and forget: announce now and on every interval after that.
    pub fn spawn(self) {
        tokio::spawn(async move {
            loop {
                match self.announce().await {
                    // The registered URL embeds the bot token, so log the
                    // public host only.
                    Ok(()) => println!("[WEBHOOK] registration refreshed for {}", self.host),
                    Err(e) => eprintln!("[WEBHOOK] registration failed: {e}"),
                }
                tokio::time::sleep(self.interval).await;
            }
        });
    }

    async fn announce(&self) -> Result<()> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "url": self.webhook_url }))
            .send()
            .await
            .map_err(|e| Error::External(format!("setWebhook request failed: {}", e.without_url())))?;

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::External(format!("setWebhook response unreadable: {}", e.without_url())))?;

        if body.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            return Err(Error::External(format!(
                "telegram rejected setWebhook: {body}"
            )));
        }
        Ok(())
    }
}

fn set_webhook_endpoint(token: &str) -> String {
    format!("https://api.telegram.org/bot{token}/setWebhook")
}
