use serde::{Deserialize, Serialize};

pub const DEFAULT_CHECK_INTERVAL: u32 = 5;
pub const MIN_CHECK_INTERVAL: u32 = 1;
pub const MAX_CHECK_INTERVAL: u32 = 60;

/// User-facing toggles kept in the state store next to the watch-list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSettings {
    #[serde(default)]
    pub is_monitoring: bool,
    #[serde(default = "default_check_interval")]
    pub check_interval: u32,
    #[serde(default = "default_true")]
    pub enable_sound: bool,
    #[serde(default)]
    pub enable_teams_call: bool,
    #[serde(default)]
    pub teams_email: String,
}

fn default_check_interval() -> u32 {
    DEFAULT_CHECK_INTERVAL
}

fn default_true() -> bool {
    true
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            is_monitoring: false,
            check_interval: DEFAULT_CHECK_INTERVAL,
            enable_sound: true,
            enable_teams_call: false,
            teams_email: String::new(),
        }
    }
}

impl MonitorSettings {
    /// Contact address for the chat deep link, if the integration is usable.
    pub fn chat_contact(&self) -> Option<&str> {
        let email = self.teams_email.trim();
        (self.enable_teams_call && !email.is_empty()).then_some(email)
    }

    pub fn clamp_interval(minutes: u32) -> u32 {
        minutes.clamp(MIN_CHECK_INTERVAL, MAX_CHECK_INTERVAL)
    }
}
