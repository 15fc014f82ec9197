use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extension of the compressed point-cloud format.
pub const COMPRESSED_EXTENSION: &str = "laz";

/// Extension of the uncompressed point-cloud format.
pub const UNCOMPRESSED_EXTENSION: &str = "las";

/// Requested conversion direction.
///
/// `Auto` defers the decision to [`resolve_direction`](crate::services::resolve_direction),
/// which inspects the input tree once the run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "laz-to-las")]
    CompressedToUncompressed,
    #[serde(rename = "las-to-laz")]
    UncompressedToCompressed,
}

impl Direction {
    /// The concrete conversion for an explicit direction, `None` for `Auto`.
    pub fn explicit(self) -> Option<Conversion> {
        match self {
            Direction::Auto => None,
            Direction::CompressedToUncompressed => Some(Conversion::CompressedToUncompressed),
            Direction::UncompressedToCompressed => Some(Conversion::UncompressedToCompressed),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Auto => f.write_str("auto"),
            Direction::CompressedToUncompressed => f.write_str("laz-to-las"),
            Direction::UncompressedToCompressed => f.write_str("las-to-laz"),
        }
    }
}

/// A resolved, concrete conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    CompressedToUncompressed,
    UncompressedToCompressed,
}

impl Conversion {
    /// Extension (without the dot) of files this conversion reads.
    pub fn source_extension(self) -> &'static str {
        match self {
            Conversion::CompressedToUncompressed => COMPRESSED_EXTENSION,
            Conversion::UncompressedToCompressed => UNCOMPRESSED_EXTENSION,
        }
    }

    /// Extension (without the dot) of files this conversion writes.
    pub fn target_extension(self) -> &'static str {
        match self {
            Conversion::CompressedToUncompressed => UNCOMPRESSED_EXTENSION,
            Conversion::UncompressedToCompressed => COMPRESSED_EXTENSION,
        }
    }

    pub fn target_is_compressed(self) -> bool {
        self == Conversion::UncompressedToCompressed
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversion::CompressedToUncompressed => f.write_str("LAZ -> LAS"),
            Conversion::UncompressedToCompressed => f.write_str("LAS -> LAZ"),
        }
    }
}

/// Returns true when `path` carries `extension`, compared ASCII case-insensitively.
pub fn has_extension(path: &Utf8Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Parameters of a single conversion run.
///
/// Immutable once handed to [`Converter::start`](crate::engine::Converter::start).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input_root: Utf8PathBuf,
    pub output_root: Utf8PathBuf,
    pub direction: Direction,
    /// Mirror the input sub-directory layout below `output_root`.
    ///
    /// When false every output lands directly in `output_root`; two sources sharing a
    /// base name then write the same destination and the later one (in processing
    /// order) wins.
    pub preserve_structure: bool,
    pub overwrite_existing: bool,
}

impl RunConfig {
    /// Create a config with the default options: automatic direction, preserved
    /// structure, existing outputs skipped.
    pub fn new(input_root: impl Into<Utf8PathBuf>, output_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            direction: Direction::Auto,
            preserve_structure: true,
            overwrite_existing: false,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_preserve_structure(mut self, preserve: bool) -> Self {
        self.preserve_structure = preserve;
        self
    }

    pub fn with_overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }
}

/// One planned conversion: a source file and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub source: Utf8PathBuf,
    pub destination: Utf8PathBuf,
    pub target_extension: &'static str,
}

impl WorkItem {
    /// File name of the source, used in progress log lines.
    pub fn source_name(&self) -> &str {
        self.source.file_name().unwrap_or(self.source.as_str())
    }

    pub fn target_is_compressed(&self) -> bool {
        self.target_extension == COMPRESSED_EXTENSION
    }
}

/// Per-run outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunCounters {
    /// Number of work items that reached an outcome.
    pub fn processed(&self) -> usize {
        self.converted + self.skipped + self.failed
    }

    pub fn is_empty(&self) -> bool {
        self.processed() == 0
    }
}

impl fmt::Display for RunCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "converted={} skipped={} failed={}",
            self.converted, self.skipped, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_extensions_are_opposite() {
        for conversion in [
            Conversion::CompressedToUncompressed,
            Conversion::UncompressedToCompressed,
        ] {
            assert_ne!(conversion.source_extension(), conversion.target_extension());
        }
        assert_eq!(Conversion::CompressedToUncompressed.target_extension(), "las");
        assert!(Conversion::UncompressedToCompressed.target_is_compressed());
    }

    #[test]
    fn test_explicit_direction() {
        assert_eq!(Direction::Auto.explicit(), None);
        assert_eq!(
            Direction::UncompressedToCompressed.explicit(),
            Some(Conversion::UncompressedToCompressed)
        );
    }

    #[test]
    fn test_has_extension_ignores_case() {
        assert!(has_extension(Utf8Path::new("tiles/a.LAZ"), "laz"));
        assert!(has_extension(Utf8Path::new("a.las"), "las"));
        assert!(!has_extension(Utf8Path::new("a.las.bak"), "las"));
        assert!(!has_extension(Utf8Path::new("laz"), "laz"));
    }

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::new("/in", "/out");
        assert_eq!(config.direction, Direction::Auto);
        assert!(config.preserve_structure);
        assert!(!config.overwrite_existing);
    }

    #[test]
    fn test_counters_summary() {
        let counters = RunCounters {
            converted: 3,
            skipped: 1,
            failed: 2,
        };
        assert_eq!(counters.processed(), 6);
        assert_eq!(counters.to_string(), "converted=3 skipped=1 failed=2");
        assert!(RunCounters::default().is_empty());
    }

    #[test]
    fn test_direction_yaml_names() {
        let yaml = serde_yaml_ng::to_string(&Direction::CompressedToUncompressed).unwrap();
        assert_eq!(yaml.trim(), "laz-to-las");
        let parsed: Direction = serde_yaml_ng::from_str("las-to-laz").unwrap();
        assert_eq!(parsed, Direction::UncompressedToCompressed);
    }
}
