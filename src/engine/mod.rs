//! Conversion engine - orchestrates batch runs on a background worker.
//!
//! [`Converter`] validates a [`RunConfig`], opens the run log, and hands a
//! [`ConversionRun`](run::ConversionRun) to a dedicated worker thread. The caller gets an
//! [`EventChannel`] back and drains it at its own pace; [`Converter::request_stop`] sets
//! the cooperative stop flag the run checks before each file.
//!
//! # Threading
//!
//! - **Caller / observer**: calls `start`, polls the channel with non-blocking drains,
//!   may call `request_stop` at any time.
//! - **Worker**: one `std::thread` per run, converting files strictly one after another.
//!
//! Only one run may be active per `Converter`; a new run can start once the previous one
//! has reached [`RunPhase::Finished`].

pub mod cancel;
pub mod events;
mod run;
pub mod run_log;

pub use cancel::{StopHandle, StopToken, stop_pair};
pub use events::{EventChannel, RunEvent};
pub use run_log::RunLog;

use crate::models::{AppInfo, RunConfig};
use crate::services::{DEFAULT_BLOCK_SIZE, LasCodec, PointCodec, StreamTranscoder};
use crate::state::{PhaseChange, PhaseTracker, RunPhase};
use camino::Utf8PathBuf;
use chrono::Local;
use run::ConversionRun;
use std::fs;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::broadcast;

/// Problems detected before a run is created. No events are emitted for these.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("input folder does not exist: {0}")]
    InputMissing(Utf8PathBuf),

    #[error("input path is not a folder: {0}")]
    InputNotDirectory(Utf8PathBuf),

    #[error("cannot create output folder {path}: {source}")]
    OutputUncreatable {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create run log: {0:#}")]
    LogUncreatable(anyhow::Error),

    #[error("a conversion run is already active")]
    Busy,

    #[error("failed to spawn conversion worker: {0}")]
    Worker(#[source] std::io::Error),
}

/// Batch conversion engine.
///
/// # Example
/// ```ignore
/// let converter = Converter::new();
/// let mut events = converter.start(RunConfig::new("scans", "converted"))?;
/// loop {
///     for event in events.try_drain() {
///         // update progress, print log lines ...
///     }
///     if events.is_done() {
///         break;
///     }
///     std::thread::sleep(Duration::from_millis(120));
/// }
/// ```
pub struct Converter<C: PointCodec = LasCodec> {
    codec: Arc<C>,
    info: AppInfo,
    block_size: usize,
    phase: PhaseTracker,

    /// Stop handle of the current (or last) run; also serializes `start` calls
    active_stop: Mutex<Option<StopHandle>>,
}

impl Converter<LasCodec> {
    /// Engine backed by the `las` codec.
    pub fn new() -> Self {
        Self::with_codec(LasCodec)
    }
}

impl Default for Converter<LasCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: PointCodec> Converter<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec: Arc::new(codec),
            info: AppInfo::default(),
            block_size: DEFAULT_BLOCK_SIZE,
            phase: PhaseTracker::new(),
            active_stop: Mutex::new(None),
        }
    }

    /// Title and version written into each run log header.
    pub fn with_app_info(mut self, info: AppInfo) -> Self {
        self.info = info;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Validate `config`, open the run log and launch the run on a worker thread.
    ///
    /// The log header is written before this returns; its lines are already queued on
    /// the returned channel.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the input root is missing or not a directory, the
    /// output root or run log cannot be created, another run is still active, or the
    /// worker thread cannot be spawned.
    pub fn start(&self, config: RunConfig) -> Result<EventChannel, ConfigError> {
        let mut active_stop = self.active_stop.lock().unwrap();

        if self.phase.current().is_active() {
            tracing::warn!("Start rejected: a run is already active");
            return Err(ConfigError::Busy);
        }

        if !config.input_root.exists() {
            return Err(ConfigError::InputMissing(config.input_root));
        }
        if !config.input_root.is_dir() {
            return Err(ConfigError::InputNotDirectory(config.input_root));
        }

        fs::create_dir_all(&config.output_root).map_err(|source| {
            ConfigError::OutputUncreatable {
                path: config.output_root.clone(),
                source,
            }
        })?;

        let started = Local::now();
        let mut log =
            RunLog::create(&config.output_root, started).map_err(ConfigError::LogUncreatable)?;

        let (events, channel) = events::event_channel();
        let (stop_handle, stop_token) = stop_pair();

        self.phase.transition(RunPhase::Scanning);
        for line in log.write_header(&self.info, &config, started) {
            events.send(RunEvent::LogLine(line));
        }

        let run = ConversionRun::new(
            config,
            StreamTranscoder::new(Arc::clone(&self.codec), self.block_size),
            events,
            stop_token,
            log,
            self.phase.clone(),
        );

        let spawned = std::thread::Builder::new()
            .name("lazconv-worker".to_string())
            .spawn(move || run.execute());

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn conversion worker: {}", e);
            self.phase.reset();
            return Err(ConfigError::Worker(e));
        }

        *active_stop = Some(stop_handle);
        Ok(channel)
    }

    /// Ask the active run to stop before its next file.
    ///
    /// Idempotent; a no-op when no run has been started or the last run has finished.
    pub fn request_stop(&self) {
        let active_stop = self.active_stop.lock().unwrap();
        match active_stop.as_ref() {
            Some(handle) if self.phase.current().is_active() => {
                if !handle.is_stop_requested() {
                    tracing::info!("Stop requested - run will halt after the current file");
                }
                handle.request_stop();
            }
            _ => tracing::debug!("Stop requested with no active run"),
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Current phase of the engine's latest run.
    pub fn phase(&self) -> RunPhase {
        self.phase.current()
    }

    pub fn is_running(&self) -> bool {
        self.phase.current().is_active()
    }

    /// Subscribe to run phase transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<PhaseChange> {
        self.phase.subscribe()
    }
}
