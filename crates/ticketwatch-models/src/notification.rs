use serde::{Deserialize, Serialize};

/// Record of the most recent alert, kept so a later session can still tell
/// the user what happened while they were away.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LastNotification {
    /// Identifier of the watch entry that fired (stored as `movieId`).
    #[serde(rename = "movieId")]
    pub entry_id: String,
    pub title: String,
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub url: String,
}

impl LastNotification {
    /// Whole minutes between `timestamp` and `now_millis`, never negative.
    pub fn minutes_ago(&self, now_millis: i64) -> i64 {
        ((now_millis - self.timestamp) / 60_000).max(0)
    }

    pub fn age_text(&self, now_millis: i64) -> String {
        match self.minutes_ago(now_millis) {
            0 => "just now".to_string(),
            n => format!("{} min ago", n),
        }
    }
}
