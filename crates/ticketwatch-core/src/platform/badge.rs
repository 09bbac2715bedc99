use crate::capabilities::Badge;
use crate::error::NotifyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BadgeState {
    pub text: String,
    pub color: String,
    pub updated: DateTime<Utc>,
}

/// Keeps the badge in a small JSON file so `status` can show it from another process.
pub struct FileBadge {
    path: PathBuf,
}

impl FileBadge {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Badge for FileBadge {
    fn set_badge(&self, text: &str, color: &str) -> Result<(), NotifyError> {
        let state = BadgeState {
            text: text.to_string(),
            color: color.to_string(),
            updated: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&state).map_err(|e| NotifyError::Badge(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| NotifyError::Badge(e.to_string()))?;
        }
        std::fs::write(&self.path, content)
            .map_err(|e| NotifyError::Badge(format!("{}: {}", self.path.display(), e)))?;

        info!(operation = "set_badge", text = %text, color = %color, "Badge updated");
        Ok(())
    }
}

/// `None` when no badge has been written yet.
pub fn read_badge(path: &Path) -> Result<Option<BadgeState>, NotifyError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(NotifyError::Badge(format!("{}: {}", path.display(), e))),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| NotifyError::Badge(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("badge.json");
        assert!(read_badge(&path).unwrap().is_none());

        let badge = FileBadge::new(&path);
        badge.set_badge("!", "#ff0000").unwrap();
        badge.set_badge("✓", "#4CAF50").unwrap();

        let state = read_badge(&path).unwrap().unwrap();
        assert_eq!(state.text, "✓");
        assert_eq!(state.color, "#4CAF50");
    }

    #[test]
    fn test_garbage_badge_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("badge.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(read_badge(&path), Err(NotifyError::Badge(_))));
    }
}
