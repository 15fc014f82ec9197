use crate::services::codec::{BlockReader, BlockWriter, CodecError, PointCodec};
use camino::Utf8Path;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Points moved per read/write call.
///
/// Large enough to keep codec overhead low, small enough that files with hundreds of
/// millions of points never sit in memory at once.
pub const DEFAULT_BLOCK_SIZE: usize = 5_000_000;

/// Result of a single successful file conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscodeStats {
    pub points: u64,
    pub blocks: u64,
    pub duration: Duration,
}

/// Errors that abort the conversion of one file
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("failed to open source: {0}")]
    OpenSource(#[source] CodecError),

    #[error("failed to open destination: {0}")]
    OpenDestination(#[source] CodecError),

    #[error("failed after {points} points: {source}")]
    Stream {
        points: u64,
        #[source]
        source: CodecError,
    },

    #[error("failed to finalize destination: {0}")]
    Finish(#[source] CodecError),

    #[error("codec panicked: {0}")]
    Panicked(String),
}

/// Streams points from one file into another through a [`PointCodec`].
///
/// Reader and writer are scoped to [`transcode`](Self::transcode): both are dropped
/// (closing their files) on every exit path. A partially written destination is left
/// on disk when a conversion fails.
pub struct StreamTranscoder<C: PointCodec> {
    codec: Arc<C>,
    block_size: usize,
}

impl<C: PointCodec> StreamTranscoder<C> {
    pub fn new(codec: Arc<C>, block_size: usize) -> Self {
        Self {
            codec,
            block_size: block_size.max(1),
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Convert `source` into `destination`.
    ///
    /// The source header is handed to the writer verbatim, so coordinate reference
    /// system, scales, offsets, point format and extra-byte definitions pass through.
    /// A panic inside the codec is reported as [`TranscodeError::Panicked`] instead of
    /// unwinding into the run.
    ///
    /// # Arguments
    /// * `source` - File to read
    /// * `destination` - File to create or replace
    /// * `target_is_compressed` - Whether the destination is written compressed
    pub fn transcode(
        &self,
        source: &Utf8Path,
        destination: &Utf8Path,
        target_is_compressed: bool,
    ) -> Result<TranscodeStats, TranscodeError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.stream(source, destination, target_is_compressed)
        }));

        match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!("Codec panicked while converting {}: {}", source, message);
                Err(TranscodeError::Panicked(message))
            }
        }
    }

    fn stream(
        &self,
        source: &Utf8Path,
        destination: &Utf8Path,
        target_is_compressed: bool,
    ) -> Result<TranscodeStats, TranscodeError> {
        let start = Instant::now();

        let mut reader = self
            .codec
            .open_reader(source)
            .map_err(TranscodeError::OpenSource)?;

        let mut writer = self
            .codec
            .open_writer(destination, reader.header(), target_is_compressed)
            .map_err(TranscodeError::OpenDestination)?;

        let mut stats = TranscodeStats::default();
        let mut block = Vec::new();

        loop {
            block.clear();
            let read = reader
                .read_block(self.block_size, &mut block)
                .map_err(|source| TranscodeError::Stream {
                    points: stats.points,
                    source,
                })?;
            if read == 0 {
                break;
            }

            writer
                .write_block(&mut block)
                .map_err(|source| TranscodeError::Stream {
                    points: stats.points,
                    source,
                })?;

            stats.points += read as u64;
            stats.blocks += 1;
            tracing::trace!("{}: block {} ({} points)", source, stats.blocks, read);
        }

        writer.finish().map_err(TranscodeError::Finish)?;

        stats.duration = start.elapsed();
        tracing::debug!(
            "Converted {} -> {}: {} points in {} blocks, {:.2}s",
            source,
            destination,
            stats.points,
            stats.blocks,
            stats.duration.as_secs_f32()
        );

        Ok(stats)
    }
}
