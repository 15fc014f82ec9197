use crate::engine::cancel::StopToken;
use crate::engine::events::{EventSender, RunEvent};
use crate::engine::run_log::RunLog;
use crate::metrics::RunMetrics;
use crate::models::{RunConfig, RunCounters, WorkItem};
use crate::services::{
    PathPlanner, PointCodec, StreamTranscoder, ensure_parent_dir, resolve_direction, scan_sources,
};
use crate::state::{PhaseTracker, RunPhase};

/// One batch conversion, executed to completion on the engine's worker thread.
///
/// The run owns its counters and log; the only shared pieces are the stop token (read
/// here, written by the observer) and the phase tracker.
pub(crate) struct ConversionRun<C: PointCodec> {
    config: RunConfig,
    transcoder: StreamTranscoder<C>,
    events: EventSender,
    stop: StopToken,
    log: RunLog,
    phase: PhaseTracker,
    metrics: RunMetrics,
    counters: RunCounters,
}

impl<C: PointCodec> ConversionRun<C> {
    pub(crate) fn new(
        config: RunConfig,
        transcoder: StreamTranscoder<C>,
        events: EventSender,
        stop: StopToken,
        log: RunLog,
        phase: PhaseTracker,
    ) -> Self {
        Self {
            config,
            transcoder,
            events,
            stop,
            log,
            phase,
            metrics: RunMetrics::new(),
            counters: RunCounters::default(),
        }
    }

    /// Scan, plan and process every work item, then emit `Done`.
    ///
    /// Always terminates with exactly one `Done` event; per-item failures are counted,
    /// never propagated.
    pub(crate) fn execute(mut self) -> RunCounters {
        tracing::info!(
            "Run started: {} -> {} ({})",
            self.config.input_root,
            self.config.output_root,
            self.config.direction
        );

        let inventory = scan_sources(&self.config.input_root);

        let Some(conversion) = resolve_direction(
            self.config.direction,
            inventory.has_compressed(),
            inventory.has_uncompressed(),
        ) else {
            self.log_line("No .laz or .las files found in the input folder.");
            return self.finish_without_work();
        };

        let planner = PathPlanner::new(
            &self.config.input_root,
            &self.config.output_root,
            self.config.preserve_structure,
        );
        let work = planner.plan(inventory.sources_for(conversion), conversion);

        if work.is_empty() {
            self.log_line(&format!(
                "No files to process for the selected mode ({}).",
                conversion
            ));
            return self.finish_without_work();
        }

        self.phase.transition(RunPhase::Processing);
        let total = work.len();
        self.events.send(RunEvent::Total(total));
        tracing::info!("Planned {} files ({})", total, conversion);

        for (offset, item) in work.iter().enumerate() {
            if self.stop.is_stopped() {
                self.log_line("Interrupted by user.");
                tracing::warn!(
                    "Run interrupted with {} of {} files remaining",
                    total - offset,
                    total
                );
                break;
            }

            let index = offset + 1;
            self.process_item(index, total, item);
            self.events.send(RunEvent::Progress(index));
        }

        self.finish()
    }

    fn process_item(&mut self, index: usize, total: usize, item: &WorkItem) {
        self.log_line(&format!("[proc] ({}/{}) {}", index, total, item.source_name()));

        if item.destination.exists() && !self.config.overwrite_existing {
            self.counters.skipped += 1;
            self.log_line(&format!(
                "[skip] {} -> {} (already exists)",
                item.source, item.destination
            ));
            return;
        }

        if let Err(e) = ensure_parent_dir(&item.destination) {
            self.counters.failed += 1;
            self.log_line(&format!("[fail] {} :: {}", item.source, e));
            return;
        }

        match self.transcoder.transcode(
            &item.source,
            &item.destination,
            item.target_is_compressed(),
        ) {
            Ok(stats) => {
                self.counters.converted += 1;
                self.metrics.record_transcode(&stats);
                self.log_line(&format!("[ok]   {} -> {}", item.source, item.destination));
            }
            Err(e) => {
                self.counters.failed += 1;
                self.log_line(&format!("[fail] {} :: {}", item.source, e));
            }
        }
    }

    fn finish_without_work(self) -> RunCounters {
        self.phase.transition(RunPhase::NoWork);
        self.finish()
    }

    fn finish(self) -> RunCounters {
        self.phase.transition(RunPhase::Finished);
        self.metrics.log_summary();
        tracing::info!(
            "Run finished: {} (log: {})",
            self.counters,
            self.log.path()
        );

        let counters = self.counters;
        self.events.send(RunEvent::Done {
            counters,
            log_path: self.log.path().to_path_buf(),
        });
        counters
    }

    /// Append to the run log and mirror the exact line to the observer.
    fn log_line(&mut self, message: &str) {
        tracing::info!(target: "lazconv::run", "{}", message);
        let line = self.log.append(message);
        self.events.send(RunEvent::LogLine(line));
    }
}
