use crate::models::{Conversion, Direction};

/// Decide the effective conversion for a run.
///
/// Explicit directions pass through unchanged. For [`Direction::Auto`], compressed input
/// wins whenever any exists, even if uncompressed files are present too; otherwise
/// uncompressed input selects compression. `None` means there is nothing to convert,
/// which the run reports as a normal no-work outcome.
///
/// # Arguments
/// * `requested` - Direction from the run configuration
/// * `has_compressed` - Whether any `.laz` file exists under the input root
/// * `has_uncompressed` - Whether any `.las` file exists under the input root
pub fn resolve_direction(
    requested: Direction,
    has_compressed: bool,
    has_uncompressed: bool,
) -> Option<Conversion> {
    if let Some(explicit) = requested.explicit() {
        return Some(explicit);
    }

    let resolved = if has_compressed {
        Some(Conversion::CompressedToUncompressed)
    } else if has_uncompressed {
        Some(Conversion::UncompressedToCompressed)
    } else {
        None
    };

    tracing::debug!(
        "Auto direction: has_laz={}, has_las={} -> {:?}",
        has_compressed,
        has_uncompressed,
        resolved
    );

    resolved
}
