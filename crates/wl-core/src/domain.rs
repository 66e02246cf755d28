//! Identifiers shared across the relay.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl UserId {
    /// The chat shared with this user. Telegram private chats reuse the
    /// user's numeric id as the chat id.
    pub fn private_chat(self) -> ChatId {
        ChatId(self.0)
    }
}

/// 8 random bytes encode to 11 url-safe characters. Enough entropy that a
/// freshly generated code colliding with a live one is not a handled case.
const CODE_ENTROPY_BYTES: usize = 8;

/// Unguessable capability token bound to one link owner.
///
/// Knowing the code is the whole protocol: whoever presents it may send the
/// owner one anonymous message. Codes carry no interior structure and are
/// compared byte-for-byte.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccessCode(pub String);

impl AccessCode {
    /// Generate a fresh code from the OS random source.
    pub fn generate() -> Self {
        let mut buf = [0u8; CODE_ENTROPY_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut buf);
        Self(URL_SAFE_NO_PAD.encode(buf))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccessCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
