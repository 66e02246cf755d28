use std::sync::Arc;

use teloxide::prelude::*;

use wl_core::domain::UserId;

use crate::links::{link_keyboard, personal_link, reset_message, RESET_CALLBACK};
use crate::router::AppState;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let cb_id = q.id.clone();
    let data = q.data.clone().unwrap_or_default();

    // Always answer the callback query so the client stops its spinner.
    if data != RESET_CALLBACK {
        let _ = bot.answer_callback_query(cb_id).await;
        return Ok(());
    }

    // The rotation is keyed on whoever pressed the button, not on the chat
    // the button lives in, so a forwarded keyboard cannot reset someone
    // else's link.
    let user_id = UserId(q.from.id.0 as i64);
    let code = state.registry.rotate(user_id).await;
    let link = personal_link(&state.bot_username, code.as_str());

    let _ = bot
        .answer_callback_query(cb_id)
        .text("Link reset".to_string())
        .await;

    match &q.message {
        // Rewrite the message the button was attached to, keyboard included,
        // so the chat shows only the live link.
        Some(msg) => {
            let _ = bot
                .edit_message_text(msg.chat.id, msg.id, reset_message(&link))
                .reply_markup(link_keyboard(&link))
                .await;
        }
        // Too old to edit in place; fall back to a fresh message.
        None => {
            let _ = bot
                .send_message(teloxide::types::ChatId(user_id.0), reset_message(&link))
                .reply_markup(link_keyboard(&link))
                .await;
        }
    }

    Ok(())
}
