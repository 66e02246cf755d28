//! Outbound port.

use async_trait::async_trait;

use crate::{domain::ChatId, Result};

/// The one capability the relay needs from the outside world: deliver a text
/// message to a chat. The Telegram adapter implements it over the Bot API;
/// tests substitute in-memory fakes.
#[async_trait]
pub trait SendPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;
}
