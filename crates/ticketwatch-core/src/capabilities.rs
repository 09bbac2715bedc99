use crate::error::{NotifyError, TimerError};
use async_trait::async_trait;
use std::time::Duration;

/// Voice parameters, on the 0.1..=10 / 0..=2 / 0..=1 scales speech engines usually take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechParams {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

pub trait Speaker: Send + Sync {
    /// Start speaking `text`, interrupting anything still being spoken.
    fn speak(&self, text: &str, params: SpeechParams) -> Result<(), NotifyError>;

    fn stop_speaking(&self);
}

pub trait Badge: Send + Sync {
    fn set_badge(&self, text: &str, color: &str) -> Result<(), NotifyError>;
}

pub trait TabOpener: Send + Sync {
    fn open_tab(&self, url: &str) -> Result<(), NotifyError>;
}

/// Named recurring wake-ups. Scheduling a name that is already scheduled replaces it.
#[async_trait]
pub trait Timer: Send + Sync {
    async fn schedule(&self, name: &str, period: Duration) -> Result<(), TimerError>;

    /// Cancel `name`. Unknown names are not an error.
    async fn unschedule(&self, name: &str) -> Result<(), TimerError>;
}
