use crate::classifier;
use crate::error::CheckError;
use crate::notify::Notifier;
use crate::store::StateStore;
use chrono::Utc;
use std::sync::Arc;
use ticketwatch_models::{CheckResult, CheckStatus, WatchEntry};
use ticketwatch_sources::{BookingUrls, PageFetcher};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Counts from one pass over the watch-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub checked: usize,
    pub available: usize,
    pub date_mismatch: usize,
    pub not_available: usize,
    pub errors: usize,
    /// Entries whose outcome could not be written back.
    pub persistence_failures: usize,
}

impl PassSummary {
    fn count(&mut self, result: &CheckResult) {
        self.checked += 1;
        match result.status() {
            CheckStatus::Available => self.available += 1,
            CheckStatus::DateMismatch => self.date_mismatch += 1,
            CheckStatus::NotAvailable => self.not_available += 1,
            CheckStatus::Error => self.errors += 1,
        }
    }
}

/// Fetch, classify, persist and (on a positive transition) announce.
pub struct MovieChecker {
    fetcher: Arc<dyn PageFetcher>,
    state: StateStore,
    urls: BookingUrls,
    notifier: Notifier,
    repeat_while_available: bool,
    // One pass at a time, whoever asked for it
    pass_lock: Mutex<()>,
}

impl MovieChecker {
    pub fn new(fetcher: Arc<dyn PageFetcher>, state: StateStore, urls: BookingUrls, notifier: Notifier) -> Self {
        Self {
            fetcher,
            state,
            urls,
            notifier,
            repeat_while_available: false,
            pass_lock: Mutex::new(()),
        }
    }

    pub fn with_repeat_while_available(mut self, repeat: bool) -> Self {
        self.repeat_while_available = repeat;
        self
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Check one entry and write the outcome against the stored entry with its id.
    ///
    /// Fetch failures are not errors here: they become `CheckResult::Error`
    /// on the entry. Only a failed write comes back as `Err`.
    pub async fn check_one(&self, entry: &WatchEntry) -> Result<CheckResult, CheckError> {
        let url = self.urls.page_url(entry);
        debug!(operation = "check_movie", entry_id = %entry.id, url = %url, "Checking movie");

        let result = match self.fetcher.fetch_text(&url).await {
            Ok(html) => classifier::classify(&html, entry.target_date.as_ref()),
            Err(e) => {
                warn!(
                    operation = "check_movie",
                    entry_id = %entry.id,
                    title = %entry.title,
                    source = self.fetcher.source_name(),
                    error = %e,
                    "Failed to fetch movie page"
                );
                CheckResult::Error(e.to_string())
            }
        };

        let Some(previous) = self.state.record_result(&entry.id, &result, Utc::now()).await? else {
            info!(
                operation = "check_movie",
                entry_id = %entry.id,
                "Entry was removed while it was being checked, dropping result"
            );
            return Ok(result);
        };

        info!(
            operation = "check_movie",
            entry_id = %entry.id,
            title = %entry.title,
            status = %result.status(),
            "Checked movie"
        );

        if result.is_available() {
            if self.repeat_while_available || !previous.is_available() {
                self.notifier.announce(entry, &url).await;
            } else {
                debug!(
                    operation = "check_movie",
                    entry_id = %entry.id,
                    "Still available, already announced"
                );
            }
        }

        Ok(result)
    }

    /// Check every entry in the stored watch-list, one after another.
    pub async fn check_all(&self) -> Result<PassSummary, CheckError> {
        let _pass = self.pass_lock.lock().await;
        let entries = self.state.watch_list().await?;
        info!(operation = "check_all", entries = entries.len(), "Starting check pass");

        let mut summary = PassSummary::default();
        for entry in &entries {
            match self.check_one(entry).await {
                Ok(result) => summary.count(&result),
                Err(e) => {
                    error!(
                        operation = "check_all",
                        entry_id = %entry.id,
                        error = %e,
                        "Failed to record check outcome"
                    );
                    summary.persistence_failures += 1;
                }
            }
        }

        info!(
            operation = "check_all",
            checked = summary.checked,
            available = summary.available,
            date_mismatch = summary.date_mismatch,
            not_available = summary.not_available,
            errors = summary.errors,
            persistence_failures = summary.persistence_failures,
            "Check pass complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests;
