use crate::capabilities::Timer;
use crate::check::MovieChecker;
use crate::error::TimerError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use ticketwatch_models::{MonitorSettings, DEFAULT_CHECK_INTERVAL};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Name of the one recurring schedule slot used for watch-list passes.
pub const CHECK_SLOT: &str = "checkTickets";

/// Owns the recurring check schedule. At most one schedule exists at a time.
pub struct MonitoringScheduler {
    timer: Arc<dyn Timer>,
    interval: Mutex<Option<u32>>,
}

impl MonitoringScheduler {
    pub fn new(timer: Arc<dyn Timer>) -> Self {
        Self {
            timer,
            interval: Mutex::new(None),
        }
    }

    /// Schedule passes every `interval_minutes` (default 5, clamped to 1..=60),
    /// replacing any schedule already running. Returns the interval in effect.
    pub async fn start(&self, interval_minutes: Option<u32>) -> Result<u32, TimerError> {
        let minutes = MonitorSettings::clamp_interval(interval_minutes.unwrap_or(DEFAULT_CHECK_INTERVAL));
        self.timer.schedule(CHECK_SLOT, period(minutes)).await?;
        *self.lock() = Some(minutes);
        info!(operation = "start_monitoring", interval_minutes = minutes, "Monitoring started");
        Ok(minutes)
    }

    pub async fn stop(&self) -> Result<(), TimerError> {
        self.timer.unschedule(CHECK_SLOT).await?;
        if self.lock().take().is_some() {
            info!(operation = "stop_monitoring", "Monitoring stopped");
        }
        Ok(())
    }

    /// Current interval in minutes, or `None` when not monitoring.
    pub fn interval(&self) -> Option<u32> {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<u32>> {
        self.interval.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn period(minutes: u32) -> Duration {
    Duration::from_secs(u64::from(minutes) * 60)
}

/// Run a watch-list pass for every wake-up of [`CHECK_SLOT`] until the channel closes.
pub async fn drive_wakeups(mut wakeups: mpsc::Receiver<String>, checker: Arc<MovieChecker>) {
    while let Some(slot) = wakeups.recv().await {
        if slot != CHECK_SLOT {
            debug!(operation = "wakeup", slot = %slot, "Ignoring unknown schedule slot");
            continue;
        }
        if let Err(e) = checker.check_all().await {
            error!(operation = "wakeup", error = %e, "Check pass failed");
        }
    }
    debug!(operation = "wakeup", "Wake-up channel closed");
}
