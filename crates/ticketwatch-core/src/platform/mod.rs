//! Desktop implementations of the capability traits.

pub mod badge;
pub mod browser;
pub mod speech;
pub mod timer;

pub use badge::{read_badge, BadgeState, FileBadge};
pub use browser::{OpenerKind, SystemBrowser};
pub use speech::{CommandSpeaker, EngineKind, SPEECH_ENGINES};
pub use timer::CronTimer;
