//! Link materialization and the texts that travel with it.
//!
//! The core hands out opaque codes; this module turns them into the
//! `t.me` deep link users actually share, plus the inline keyboard and
//! reply copy attached wherever a link is shown.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Callback payload carried by the reset button.
pub const RESET_CALLBACK: &str = "reset_link";

/// The personal deep link for an access code.
pub fn personal_link(bot_username: &str, code: &str) -> String {
    format!("https://t.me/{bot_username}?start={code}")
}

/// Telegram's share screen, pre-filled with the link.
fn share_url(link: &str) -> String {
    format!("https://t.me/share/url?url={link}")
}

/// Two rows: share the link, reset the link.
pub fn link_keyboard(link: &str) -> InlineKeyboardMarkup {
    // Bot usernames and codes are url-safe ASCII, so this parse cannot fail
    // on real input.
    let share: url::Url = share_url(link).parse().expect("share url is well-formed");
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url("🔗 Share link", share)],
        vec![InlineKeyboardButton::callback("🔄 Reset link", RESET_CALLBACK)],
    ])
}

/// Reply for the owner asking for their link. New links and repeat lookups
/// get different phrasing so users can tell whether anything changed.
pub fn issued_message(link: &str, created: bool) -> String {
    if created {
        format!("📬 Your personal link:\n{link}\n\nShare it anywhere. It stays valid until you reset it.")
    } else {
        format!("Your current link:\n{link}\n\nIt is already active. Use the buttons below to share or reset it.")
    }
}

/// Reply after a rotation, whichever surface triggered it.
pub fn reset_message(link: &str) -> String {
    format!("✅ Link reset!\nYour new link:\n{link}\n\nThe old link no longer works.")
}
