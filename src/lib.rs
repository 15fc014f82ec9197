// lazconv - Batch LAZ <-> LAS point-cloud converter
//
// This is the library crate containing the conversion engine and its collaborators.
// The binary crate (main.rs) provides the command-line shell.

pub mod cli;
pub mod config;
pub mod engine;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod observer;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use engine::{ConfigError, Converter, EventChannel, RunEvent};
pub use models::{AppInfo, Conversion, Direction, RunConfig, RunCounters, Settings, WorkItem};
pub use services::{LasCodec, PointCodec};
pub use state::{PhaseChange, RunPhase};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Title written at the top of every run log
pub const APP_TITLE: &str = "LAZ <-> LAS Converter";
