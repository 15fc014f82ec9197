//! Services module - Pure conversion logic, independent of any observer or shell.
//!
//! # Components
//!
//! - [`resolve_direction`]: Chooses the effective conversion from the requested
//!   [`Direction`](crate::models::Direction) and the file kinds present under the input root.
//! - [`scan_sources`] / [`PathPlanner`]: Recursive discovery of `.laz`/`.las` files and the
//!   mapping from each source to its destination path.
//! - [`StreamTranscoder`]: Copies one file block by block through a [`PointCodec`].
//! - [`PointCodec`]: Seam to the external point-cloud codec; [`LasCodec`] is the default,
//!   backed by the `las` crate.
//!
//! Nothing here spawns threads or emits run events; orchestration lives in
//! [`crate::engine`].

pub mod codec;
pub mod direction;
pub mod planner;
pub mod transcoder;

pub use codec::{BlockReader, BlockWriter, CodecError, LasCodec, PointCodec};
pub use direction::resolve_direction;
pub use planner::{PathPlanner, PlanError, SourceInventory, ensure_parent_dir, scan_sources};
pub use transcoder::{DEFAULT_BLOCK_SIZE, StreamTranscoder, TranscodeError, TranscodeStats};
