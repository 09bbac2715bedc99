use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://in.bookmyshow.com";

/// Operator-facing tuning. User toggles (interval, sound, chat) live in the
/// state store instead, next to the watch-list they apply to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound on a single page fetch so one slow entry cannot hold up the pass.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AlertConfig {
    /// Explicit TTS program. When unset the first known engine on PATH is used.
    #[serde(default)]
    pub speech_engine: Option<String>,
    /// Alert on every positive check instead of only when an entry turns available.
    ///
    /// Off by default: an entry that stays bookable is announced once, and
    /// later checks that still find it open stay quiet until it closes and
    /// reopens. Turn on to be alerted on every check that finds tickets.
    #[serde(default)]
    pub repeat_while_available: bool,
}

impl AlertConfig {
    /// One-line description of when alerts fire, for `status` and `config show`.
    pub fn alert_policy(&self) -> &'static str {
        if self.repeat_while_available {
            "on every check that finds tickets"
        } else {
            "once when tickets open (set alerts.repeat_while_available = true to repeat)"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationConfig {
    /// Gap between opening the booking page and the chat link.
    #[serde(default = "default_chat_delay_ms")]
    pub chat_delay_ms: u64,
    #[serde(default = "default_true")]
    pub open_browser: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_chat_delay_ms() -> u64 {
    1500
}

fn default_true() -> bool {
    true
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            chat_delay_ms: default_chat_delay_ms(),
            open_browser: default_true(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Missing file means defaults; a file that exists but does not parse is an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base = self.fetch.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(anyhow::anyhow!("fetch.base_url must be an http(s) URL, got '{}'", base));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(anyhow::anyhow!("fetch.timeout_secs must be greater than zero"));
        }
        if let Some(engine) = &self.alerts.speech_engine {
            if engine.trim().is_empty() {
                return Err(anyhow::anyhow!("alerts.speech_engine cannot be empty when set"));
            }
        }
        Ok(())
    }
}
