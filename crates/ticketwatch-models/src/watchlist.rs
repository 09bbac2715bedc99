use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::status::{CheckResult, CheckStatus};
use crate::target_date::TargetDate;

/// One movie + city (+ optional date) the user wants watched.
///
/// Field names follow the persisted `movies` record, so the stored
/// document stays readable by anything that already understands it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    pub id: String,
    pub title: String,
    pub movie_id: String,
    pub city: String,
    pub movie_slug: String,
    #[serde(default)]
    pub target_date: Option<TargetDate>,
    pub added: DateTime<Utc>,
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_status: Option<CheckStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl WatchEntry {
    pub fn new(
        title: impl Into<String>,
        movie_id: impl Into<String>,
        city: impl Into<String>,
        target_date: Option<TargetDate>,
    ) -> Self {
        let title = title.into();
        let movie_slug = slugify(&title);
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            movie_id: movie_id.into(),
            city: city.into().to_lowercase(),
            movie_slug,
            target_date,
            added: Utc::now(),
            last_checked: None,
            last_status: None,
            last_error: None,
        }
    }

    /// Use a slug taken from a pasted URL instead of the one derived from the title.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.movie_slug = slug.into();
        self
    }

    /// Record the outcome of a check. `last_error` is only kept for errors.
    pub fn record(&mut self, result: &CheckResult, checked_at: DateTime<Utc>) {
        self.last_checked = Some(checked_at);
        self.last_status = Some(result.status());
        self.last_error = result.error_message().map(str::to_string);
    }

    pub fn is_available(&self) -> bool {
        self.last_status == Some(CheckStatus::Available)
    }
}

/// Lower-case, collapse every run of non-alphanumerics into '-', trim dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}
