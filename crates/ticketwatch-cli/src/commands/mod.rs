pub mod check;
pub mod clear;
pub mod config;
pub mod daemon;
pub mod monitor;
pub mod status;
pub mod watch;
