// Point-cloud codec seam
//
// The engine never looks inside points or headers. It asks a codec for a reader that
// hands out bounded blocks and a writer that accepts them, and copies the reader's
// header to the writer. Only the codec's own compression record is rewritten.

use crate::models::{COMPRESSED_EXTENSION, has_extension};
use camino::Utf8Path;
use std::fs::File;
use std::io::BufWriter;
use thiserror::Error;

/// Errors raised by a codec implementation.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("cannot open {path}: {message}")]
    Open { path: String, message: String },

    #[error("read failed: {0}")]
    Read(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("close failed: {0}")]
    Close(String),

    #[error("{path} does not match requested compression (compress={compress})")]
    ExtensionMismatch { path: String, compress: bool },
}

/// Block-wise point source with its metadata header.
pub trait BlockReader {
    type Header;
    type Point;

    fn header(&self) -> &Self::Header;

    /// Append up to `max_points` points to `block`.
    ///
    /// Returns the number of points appended; `0` means the source is exhausted.
    fn read_block(
        &mut self,
        max_points: usize,
        block: &mut Vec<Self::Point>,
    ) -> Result<usize, CodecError>;
}

/// Block-wise point sink.
///
/// Dropping a writer without calling [`finish`](Self::finish) must still release the
/// underlying file handle.
pub trait BlockWriter {
    type Point;

    /// Write and drain every point in `block`.
    fn write_block(&mut self, block: &mut Vec<Self::Point>) -> Result<(), CodecError>;

    /// Flush pending data and close the destination.
    fn finish(self) -> Result<(), CodecError>;
}

/// External point-cloud codec collaborator.
pub trait PointCodec: Send + Sync + 'static {
    type Header;
    type Point;
    type Reader: BlockReader<Header = Self::Header, Point = Self::Point>;
    type Writer: BlockWriter<Point = Self::Point>;

    fn open_reader(&self, path: &Utf8Path) -> Result<Self::Reader, CodecError>;

    fn open_writer(
        &self,
        path: &Utf8Path,
        header: &Self::Header,
        compress: bool,
    ) -> Result<Self::Writer, CodecError>;
}

/// Codec backed by the `las` crate (LAZ support via its `laz` feature).
#[derive(Debug, Clone, Copy, Default)]
pub struct LasCodec;

pub struct LasBlockReader {
    inner: las::Reader,
}

pub struct LasBlockWriter {
    inner: las::Writer<BufWriter<File>>,
}

impl BlockReader for LasBlockReader {
    type Header = las::Header;
    type Point = las::Point;

    fn header(&self) -> &las::Header {
        self.inner.header()
    }

    fn read_block(
        &mut self,
        max_points: usize,
        block: &mut Vec<las::Point>,
    ) -> Result<usize, CodecError> {
        let read = self
            .inner
            .read_points_into(max_points as u64, block)
            .map_err(|e| CodecError::Read(e.to_string()))?;
        Ok(read as usize)
    }
}

impl BlockWriter for LasBlockWriter {
    type Point = las::Point;

    fn write_block(&mut self, block: &mut Vec<las::Point>) -> Result<(), CodecError> {
        for point in block.drain(..) {
            self.inner
                .write_point(point)
                .map_err(|e| CodecError::Write(e.to_string()))?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<(), CodecError> {
        self.inner
            .close()
            .map_err(|e| CodecError::Close(e.to_string()))
    }
}

impl PointCodec for LasCodec {
    type Header = las::Header;
    type Point = las::Point;
    type Reader = LasBlockReader;
    type Writer = LasBlockWriter;

    fn open_reader(&self, path: &Utf8Path) -> Result<LasBlockReader, CodecError> {
        let inner = las::Reader::from_path(path.as_std_path()).map_err(|e| CodecError::Open {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(LasBlockReader { inner })
    }

    fn open_writer(
        &self,
        path: &Utf8Path,
        header: &las::Header,
        compress: bool,
    ) -> Result<LasBlockWriter, CodecError> {
        // las picks compression from the destination extension
        if has_extension(path, COMPRESSED_EXTENSION) != compress {
            return Err(CodecError::ExtensionMismatch {
                path: path.to_string(),
                compress,
            });
        }

        let open_error = |e: las::Error| CodecError::Open {
            path: path.to_string(),
            message: e.to_string(),
        };

        let header = without_laszip_vlr(header).map_err(open_error)?;
        let inner = las::Writer::from_path(path.as_std_path(), header).map_err(open_error)?;
        Ok(LasBlockWriter { inner })
    }
}

/// Copy of `header` minus the LASzip VLR, which describes the source's compression
/// and is regenerated by the writer when the destination is compressed.
fn without_laszip_vlr(header: &las::Header) -> Result<las::Header, las::Error> {
    let mut builder = las::Builder::from(header.clone());
    builder.vlrs.retain(|vlr| !las::laz::is_laszip_vlr(vlr));
    builder.evlrs.retain(|vlr| !las::laz::is_laszip_vlr(vlr));
    builder.into_header()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_las_writer_rejects_mismatched_extension() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = camino::Utf8PathBuf::try_from(temp_dir.path().join("out.las")).unwrap();

        let result = LasCodec.open_writer(&path, &las::Header::default(), true);

        assert!(matches!(
            result,
            Err(CodecError::ExtensionMismatch { compress: true, .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_laszip_vlr_not_carried_into_destination_header() {
        let vlr = |user_id: &str, record_id: u16| las::Vlr {
            user_id: user_id.to_string(),
            record_id,
            description: String::new(),
            data: vec![0; 4],
        };
        let mut builder = las::Builder::from((1, 2));
        builder.vlrs.push(vlr("survey", 42));
        builder.vlrs.push(vlr("laszip encoded", 22204));
        let header = builder.into_header().unwrap();

        let cleaned = without_laszip_vlr(&header).unwrap();

        let ids: Vec<(&str, u16)> = cleaned
            .vlrs()
            .iter()
            .map(|vlr| (vlr.user_id.as_str(), vlr.record_id))
            .collect();
        assert_eq!(ids, vec![("survey", 42)]);
    }

    #[test]
    fn test_las_reader_reports_missing_file() {
        let result = LasCodec.open_reader(Utf8Path::new("/definitely/not/here.laz"));
        let err = result.err().unwrap();
        assert!(err.to_string().contains("/definitely/not/here.laz"));
    }
}
