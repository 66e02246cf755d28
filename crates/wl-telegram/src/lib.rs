//! Telegram adapter (teloxide).
//!
//! This crate implements the `wl-core` SendPort over the Telegram Bot API
//! and hosts the update handlers, dispatcher wiring and webhook plumbing.

use async_trait::async_trait;

use teloxide::prelude::*;

pub mod handlers;
pub mod links;
pub mod router;
pub mod webhook;

use wl_core::{domain::ChatId, errors::Error, outbound::SendPort, Result};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl SendPort for TelegramMessenger {
    /// One `sendMessage` call, no retries. The relay promises at-most-once
    /// delivery, so a flood-control wait and a blocked bot both surface as a
    /// failed forward instead of a delayed duplicate.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.bot
            .send_message(Self::tg_chat(chat_id), text.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}
