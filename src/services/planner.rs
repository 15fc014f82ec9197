use crate::models::{COMPRESSED_EXTENSION, Conversion, UNCOMPRESSED_EXTENSION, WorkItem, has_extension};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use thiserror::Error;
use walkdir::WalkDir;

/// Failure preparing a destination directory.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Point-cloud files found under an input root, each list sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInventory {
    pub compressed: Vec<Utf8PathBuf>,
    pub uncompressed: Vec<Utf8PathBuf>,
}

impl SourceInventory {
    pub fn has_compressed(&self) -> bool {
        !self.compressed.is_empty()
    }

    pub fn has_uncompressed(&self) -> bool {
        !self.uncompressed.is_empty()
    }

    /// Files that `conversion` reads.
    pub fn sources_for(&self, conversion: Conversion) -> &[Utf8PathBuf] {
        match conversion {
            Conversion::CompressedToUncompressed => &self.compressed,
            Conversion::UncompressedToCompressed => &self.uncompressed,
        }
    }
}

/// Recursively collect `.laz` and `.las` files below `root`.
///
/// Unreadable entries and non-UTF-8 paths are logged and skipped. Both lists are
/// sorted so the processing order is reproducible for identical directory contents.
pub fn scan_sources(root: &Utf8Path) -> SourceInventory {
    let mut inventory = SourceInventory::default();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root, e);
                continue;
            }
        };

        // Symlinked files count; links are not followed into directories
        if !entry.path().is_file() {
            continue;
        }

        let path = match Utf8PathBuf::try_from(entry.into_path()) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping non UTF-8 path: {}", e.as_path().display());
                continue;
            }
        };

        if has_extension(&path, COMPRESSED_EXTENSION) {
            inventory.compressed.push(path);
        } else if has_extension(&path, UNCOMPRESSED_EXTENSION) {
            inventory.uncompressed.push(path);
        }
    }

    inventory.compressed.sort();
    inventory.uncompressed.sort();

    tracing::debug!(
        "Scanned {}: {} laz, {} las",
        root,
        inventory.compressed.len(),
        inventory.uncompressed.len()
    );

    inventory
}

/// Maps source files to destination paths.
#[derive(Debug, Clone)]
pub struct PathPlanner<'a> {
    input_root: &'a Utf8Path,
    output_root: &'a Utf8Path,
    preserve_structure: bool,
}

impl<'a> PathPlanner<'a> {
    pub fn new(input_root: &'a Utf8Path, output_root: &'a Utf8Path, preserve_structure: bool) -> Self {
        Self {
            input_root,
            output_root,
            preserve_structure,
        }
    }

    /// Destination for `source` with its extension replaced by `target_extension`.
    ///
    /// With structure preservation the path relative to the input root is mirrored
    /// under the output root; otherwise only the base name is kept, so sources that
    /// share a base name map to the same destination.
    pub fn destination_for(&self, source: &Utf8Path, target_extension: &str) -> Utf8PathBuf {
        let relative = if self.preserve_structure {
            source.strip_prefix(self.input_root).ok()
        } else {
            None
        };

        let relative = match relative {
            Some(relative) => relative.to_path_buf(),
            None => Utf8PathBuf::from(source.file_name().unwrap_or(source.as_str())),
        };

        self.output_root
            .join(relative)
            .with_extension(target_extension)
    }

    /// Build the work list, keeping the order of `sources`.
    pub fn plan(&self, sources: &[Utf8PathBuf], conversion: Conversion) -> Vec<WorkItem> {
        let target_extension = conversion.target_extension();

        sources
            .iter()
            .map(|source| WorkItem {
                source: source.clone(),
                destination: self.destination_for(source, target_extension),
                target_extension,
            })
            .collect()
    }
}

/// Create the parent directory chain of `destination`.
///
/// Existing directories (including ones created concurrently by another process) are
/// fine; a path component that exists as a file is an error.
pub fn ensure_parent_dir(destination: &Utf8Path) -> Result<(), PlanError> {
    let Some(parent) = destination.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).map_err(|source| PlanError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })
}
