pub mod alert;
pub mod capabilities;
pub mod check;
pub mod classifier;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod notify;
pub mod platform;
pub mod scheduler;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use alert::AlertDriver;
pub use capabilities::{Badge, Speaker, SpeechParams, TabOpener, Timer};
pub use check::{MovieChecker, PassSummary};
pub use classifier::classify;
pub use dispatch::{Command, Dispatcher, Response};
pub use error::{CheckError, ControlError, NotifyError, StoreError, TimerError};
pub use notify::Notifier;
pub use scheduler::{MonitoringScheduler, CHECK_SLOT};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, RemovedEntry, StateStore};
