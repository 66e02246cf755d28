//! Runtime configuration.
//!
//! Everything comes from environment variables, with an optional `.env` file
//! for local runs. `TELEGRAM_BOT_TOKEN` is the only required setting; the
//! rest defaults to a local long-polling bot with an in-memory registry.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Typed view of the process environment.
#[derive(Clone, Debug)]
pub struct Config {
    /// Bot API token. Also used as the webhook URL path, which keeps the
    /// update endpoint unguessable.
    pub bot_token: String,
    /// Port the webhook listener binds in webhook mode.
    pub port: u16,
    /// Public HTTPS hostname Telegram should deliver updates to.
    /// `None` means long polling.
    pub webhook_host: Option<String>,
    /// Override for the bot's @username. Resolved via `getMe` when unset.
    pub bot_username: Option<String>,
    /// Path of the persisted registry document. `None` keeps bindings in
    /// memory only.
    pub storage_file: Option<PathBuf>,
    /// How often the background announcer re-posts the webhook registration.
    pub webhook_refresh: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        // WEBHOOK_HOST wins; RENDER_EXTERNAL_HOSTNAME is what the hosted
        // platform exports automatically.
        let webhook_host = env_str("WEBHOOK_HOST")
            .and_then(non_empty)
            .or_else(|| env_str("RENDER_EXTERNAL_HOSTNAME").and_then(non_empty));

        Ok(Self {
            bot_token,
            port: env_u16("PORT").unwrap_or(8000),
            webhook_host,
            bot_username: env_str("BOT_USERNAME").and_then(non_empty),
            storage_file: env_path("STORAGE_FILE"),
            webhook_refresh: Duration::from_secs(
                env_u64("WEBHOOK_REFRESH_SECS").unwrap_or(720),
            ),
        })
    }

    /// Full webhook URL, or `None` when running without a public host.
    pub fn webhook_url(&self) -> Option<String> {
        self.webhook_host
            .as_ref()
            .map(|host| format!("https://{host}/{}", self.bot_token))
    }
}

/// Minimal `.env` loader: `KEY=value` lines, `#` comments, optional quotes.
/// Real environment variables always win over file entries.
pub(crate) fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !key.is_empty() && env::var(key).is_err() {
            env::set_var(key, value);
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse().ok())
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_str(key).and_then(non_empty).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_env_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "wl-config-{name}-{}-{}.env",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn non_empty_rejects_blank_strings() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty(String::new()), None);
        assert_eq!(non_empty(" x ".to_string()), Some("x".to_string()));
    }

    #[test]
    fn dotenv_sets_only_unset_keys() {
        // Keys are unique to this test so parallel tests cannot interfere.
        let path = tmp_env_file(
            "precedence",
            "# comment\nWL_TEST_DOTENV_A=file\nWL_TEST_DOTENV_B=\"quoted\"\n",
        );
        env::set_var("WL_TEST_DOTENV_A", "process");
        load_dotenv_if_present(&path);
        assert_eq!(env::var("WL_TEST_DOTENV_A").unwrap(), "process");
        assert_eq!(env::var("WL_TEST_DOTENV_B").unwrap(), "quoted");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn dotenv_skips_malformed_lines() {
        let path = tmp_env_file("malformed", "no equals sign\n=WL_TEST_EMPTY_KEY\n");
        load_dotenv_if_present(&path);
        assert!(env::var("no equals sign").is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn webhook_url_joins_host_and_token() {
        let cfg = Config {
            bot_token: "123:abc".to_string(),
            port: 8000,
            webhook_host: Some("bot.example.com".to_string()),
            bot_username: None,
            storage_file: None,
            webhook_refresh: Duration::from_secs(720),
        };
        assert_eq!(
            cfg.webhook_url().as_deref(),
            Some("https://bot.example.com/123:abc")
        );
    }

    #[test]
    fn webhook_url_is_none_without_a_host() {
        let cfg = Config {
            bot_token: "123:abc".to_string(),
            port: 8000,
            webhook_host: None,
            bot_username: None,
            storage_file: None,
            webhook_refresh: Duration::from_secs(720),
        };
        assert_eq!(cfg.webhook_url(), None);
    }
}
