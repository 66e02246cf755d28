use std::sync::Arc;

use teloxide::prelude::*;

use wl_core::domain::UserId;
use wl_core::relay::ForwardOutcome;

use crate::router::AppState;

use super::commands::send_own_link;

pub async fn handle_text(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = UserId(user.id.0 as i64);
    let outcome = state.relay.forward(user_id, text).await;

    // No open session means the user is not writing to anyone; treat the
    // message as them looking for their own link.
    if outcome == ForwardOutcome::NoPendingIntent {
        return send_own_link(&bot, msg.chat.id, user_id, &state).await;
    }

    if let Some(reply) = reply_for(outcome) {
        let _ = bot.send_message(msg.chat.id, reply).await;
    }
    Ok(())
}

/// Sender-facing status per outcome. `Skipped` stays silent on purpose, and
/// `NoPendingIntent` is handled by the caller before this mapping applies.
fn reply_for(outcome: ForwardOutcome) -> Option<&'static str> {
    match outcome {
        ForwardOutcome::Delivered => Some("✅ Message sent!"),
        ForwardOutcome::StaleLink => Some("❌ This link has expired."),
        ForwardOutcome::DeliveryFailed => Some("❌ Couldn't deliver the message."),
        ForwardOutcome::Skipped | ForwardOutcome::NoPendingIntent => None,
    }
}
