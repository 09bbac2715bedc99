use crate::capabilities::Timer;
use crate::error::TimerError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};
use uuid::Uuid;

/// Capacity 1: a wake-up that arrives while one is already pending is dropped,
/// so a slow pass never stacks up more passes behind it.
pub const WAKEUP_QUEUE: usize = 1;

/// Named repeating jobs on a `tokio-cron-scheduler`; each firing sends the slot name.
pub struct CronTimer {
    scheduler: JobScheduler,
    jobs: Mutex<HashMap<String, (Uuid, Duration)>>,
    wakeups: mpsc::Sender<String>,
}

impl CronTimer {
    /// Start the job scheduler and return the timer with its wake-up stream.
    pub async fn start() -> Result<(Self, mpsc::Receiver<String>), TimerError> {
        let (tx, rx) = mpsc::channel(WAKEUP_QUEUE);
        let scheduler = JobScheduler::new().await?;
        scheduler.start().await?;
        Ok((
            Self {
                scheduler,
                jobs: Mutex::new(HashMap::new()),
                wakeups: tx,
            },
            rx,
        ))
    }

    pub async fn period(&self, name: &str) -> Option<Duration> {
        self.jobs.lock().await.get(name).map(|(_, period)| *period)
    }

    pub async fn active_slots(&self) -> Vec<String> {
        let mut slots: Vec<String> = self.jobs.lock().await.keys().cloned().collect();
        slots.sort();
        slots
    }
}

#[async_trait]
impl Timer for CronTimer {
    async fn schedule(&self, name: &str, period: Duration) -> Result<(), TimerError> {
        let mut jobs = self.jobs.lock().await;
        if let Some((previous, _)) = jobs.remove(name) {
            self.scheduler.remove(&previous).await?;
            debug!(operation = "schedule", slot = %name, "Replaced existing schedule");
        }

        let tx = self.wakeups.clone();
        let slot = name.to_string();
        let job = Job::new_repeated_async(period, move |_id, _scheduler| {
            let tx = tx.clone();
            let slot = slot.clone();
            Box::pin(async move {
                if tx.try_send(slot.clone()).is_err() {
                    debug!(operation = "wakeup", slot = %slot, "Wake-up already pending, coalescing");
                }
            })
        })?;
        let id = self.scheduler.add(job).await?;
        jobs.insert(name.to_string(), (id, period));

        info!(operation = "schedule", slot = %name, period_secs = period.as_secs(), "Schedule registered");
        Ok(())
    }

    async fn unschedule(&self, name: &str) -> Result<(), TimerError> {
        if let Some((id, _)) = self.jobs.lock().await.remove(name) {
            self.scheduler.remove(&id).await?;
            info!(operation = "unschedule", slot = %name, "Schedule removed");
        }
        Ok(())
    }
}
