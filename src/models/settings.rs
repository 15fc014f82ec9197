use crate::models::Direction;
use serde::{Deserialize, Serialize};

/// Persisted user settings from `lazconv.yaml`.
///
/// Every field has a default so partial files (and `LAZCONV_*` environment
/// overrides) deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Direction used when the command line does not force one.
    pub default_direction: Direction,

    pub preserve_structure: bool,

    pub overwrite_existing: bool,

    pub debug_mode: bool,

    /// Directory for the application's own rolling log (not the per-run log).
    pub log_dir: String,

    /// How often the terminal observer drains the event channel.
    pub poll_interval_ms: u64,

    /// Points moved per read/write call.
    pub block_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_direction: Direction::Auto,
            preserve_structure: true,
            overwrite_existing: false,
            debug_mode: false,
            log_dir: default_log_dir(),
            poll_interval_ms: default_poll_interval_ms(),
            block_size: crate::services::DEFAULT_BLOCK_SIZE,
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_poll_interval_ms() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.default_direction, Direction::Auto);
        assert!(settings.preserve_structure);
        assert!(!settings.overwrite_existing);
        assert_eq!(settings.poll_interval_ms, 120);
        assert_eq!(settings.block_size, 5_000_000);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let settings: Settings = serde_yaml_ng::from_str("overwrite_existing: true\n").unwrap();
        assert!(settings.overwrite_existing);
        assert!(settings.preserve_structure);
        assert_eq!(settings.log_dir, "logs");
    }
}
