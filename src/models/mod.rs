//! Data models for the converter.
//!
//! - [`RunConfig`]: Parameters of one conversion run (input/output roots, direction, options)
//! - [`Direction`] / [`Conversion`]: Requested and resolved conversion direction
//! - [`WorkItem`]: One planned source → destination conversion
//! - [`RunCounters`]: Converted / skipped / failed tallies reported when a run ends
//! - [`Settings`]: User preferences loaded from `lazconv.yaml`
//! - [`AppInfo`]: Title and version echoed into every run log

pub mod conversion;
pub mod settings;

pub use conversion::{
    COMPRESSED_EXTENSION, Conversion, Direction, RunConfig, RunCounters, UNCOMPRESSED_EXTENSION,
    WorkItem, has_extension,
};
pub use settings::Settings;

/// Static application identity, supplied once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub title: String,
    pub version: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            title: crate::APP_TITLE.to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}
