pub mod notification;
pub mod settings;
pub mod status;
pub mod target_date;
pub mod watchlist;

pub use notification::LastNotification;
pub use settings::{MonitorSettings, DEFAULT_CHECK_INTERVAL, MAX_CHECK_INTERVAL, MIN_CHECK_INTERVAL};
pub use status::{CheckResult, CheckStatus};
pub use target_date::{TargetDate, TargetDateError};
pub use watchlist::{slugify, WatchEntry};
