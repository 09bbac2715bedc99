pub mod config;
pub mod paths;

pub use config::{AlertConfig, Config, FetchConfig, NotificationConfig, DEFAULT_BASE_URL};
pub use paths::{PathManager, container_base_path};
