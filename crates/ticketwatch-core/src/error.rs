use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("State store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("State store holds malformed data for '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("State file is not a JSON object: {0}")]
    Corrupt(String),

    #[error("Could not encode state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Watch entry '{0}' already exists")]
    DuplicateEntry(String),

    #[error("State store is read-only")]
    ReadOnly,
}

/// Failure of a user-facing side effect (speech, badge, tab). Logged, never fatal.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("No program available to {0}")]
    NoProgram(&'static str),

    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write badge: {0}")]
    Badge(String),
}

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl From<tokio_cron_scheduler::JobSchedulerError> for TimerError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        TimerError::Scheduler(format!("{:?}", err))
    }
}

/// The only failure that escapes a check cycle: the outcome could not be persisted.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Failed to persist check outcome: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Control channel I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed control message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Daemon closed the connection without replying")]
    Closed,

    #[error("The control channel is only supported on Unix-like systems")]
    Unsupported,
}
