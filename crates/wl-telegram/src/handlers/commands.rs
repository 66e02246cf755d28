use std::sync::Arc;

use teloxide::prelude::*;

use wl_core::domain::{AccessCode, UserId};
use wl_core::relay::SessionStart;

use crate::links::{issued_message, link_keyboard, personal_link, reset_message};
use crate::router::AppState;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = UserId(user.id.0 as i64);
    let chat_id = msg.chat.id;
    let (cmd, arg) = parse_command(text);

    match cmd.as_str() {
        // `/start <code>` is how a deep link opens: the payload is someone
        // else's access code and the sender wants to write to them.
        "start" if !arg.is_empty() => {
            match state.relay.begin_session(user_id, AccessCode(arg)).await {
                SessionStart::Accepted => {
                    let _ = bot
                        .send_message(chat_id, "🤫 Send your anonymous message:")
                        .await;
                }
                SessionStart::Rejected => {
                    let _ = bot
                        .send_message(chat_id, "❌ That link is not valid.")
                        .await;
                }
            }
            Ok(())
        }

        // Bare `/start`: the user wants their own link.
        "start" => send_own_link(&bot, chat_id, user_id, &state).await,

        "newlink" => {
            let code = state.registry.rotate(user_id).await;
            let link = personal_link(&state.bot_username, code.as_str());
            let _ = bot
                .send_message(chat_id, reset_message(&link))
                .reply_markup(link_keyboard(&link))
                .await;
            Ok(())
        }

        "help" => {
            let _ = bot
                .send_message(
                    chat_id,
                    "📬 This bot relays anonymous messages.\n\n\
                     /start - get your personal link\n\
                     /newlink - reset your link; the old one stops working\n\n\
                     Anyone who opens your link can send you one anonymous \
                     message per visit. You never see who wrote it.",
                )
                .await;
            Ok(())
        }

        // Unknown commands are dropped, same as non-text noise.
        _ => Ok(()),
    }
}

/// The owner flow shared by bare `/start` and the no-session text fallback.
pub(super) async fn send_own_link(
    bot: &Bot,
    chat_id: teloxide::types::ChatId,
    user_id: UserId,
    state: &AppState,
) -> ResponseResult<()> {
    let issued = state.registry.get_or_create(user_id).await;
    let link = personal_link(&state.bot_username, issued.code.as_str());

    let _ = bot
        .send_message(chat_id, issued_message(&link, issued.created))
        .reply_markup(link_keyboard(&link))
        .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_argumented_commands() {
        assert_eq!(
            parse_command("/start"),
            ("start".to_string(), String::new())
        );
        assert_eq!(
            parse_command("/start Ab3-_x"),
            ("start".to_string(), "Ab3-_x".to_string())
        );
    }

    #[test]
    fn strips_bot_mention_and_lowercases() {
        assert_eq!(
            parse_command("/NewLink@WhisperRelayBot"),
            ("newlink".to_string(), String::new())
        );
        assert_eq!(
            parse_command("/START@WhisperRelayBot xYz"),
            ("start".to_string(), "xYz".to_string())
        );
    }

    #[test]
    fn keeps_argument_case_and_trims_whitespace() {
        assert_eq!(
            parse_command("  /start   CoDe123  "),
            ("start".to_string(), "CoDe123".to_string())
        );
    }
}
