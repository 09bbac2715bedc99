use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of classifying one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Available,
    NotAvailable,
    /// Booking is open, but the page is not showing the requested date.
    /// Only produced for entries that carry a target date.
    DateMismatch,
    Error(String),
}

impl CheckResult {
    pub fn status(&self) -> CheckStatus {
        match self {
            CheckResult::Available => CheckStatus::Available,
            CheckResult::NotAvailable => CheckStatus::NotAvailable,
            CheckResult::DateMismatch => CheckStatus::DateMismatch,
            CheckResult::Error(_) => CheckStatus::Error,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, CheckResult::Available)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            CheckResult::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Persisted form of a [`CheckResult`], stored as `lastStatus` on an entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CheckStatus {
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "date-mismatch")]
    DateMismatch,
    #[serde(rename = "not available")]
    NotAvailable,
    #[serde(rename = "error")]
    Error,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Available => "available",
            CheckStatus::DateMismatch => "date-mismatch",
            CheckStatus::NotAvailable => "not available",
            CheckStatus::Error => "error",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
