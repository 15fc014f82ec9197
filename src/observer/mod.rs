// Observer module - consumes a run's event stream
//
// This module contains:
// - RunObserver: callback trait implemented by anything that displays run events
// - poll_events: periodic non-blocking drain loop feeding an observer
// - TerminalObserver: indicatif progress bar + log echo for the CLI

pub mod terminal;

pub use terminal::TerminalObserver;

use crate::engine::{EventChannel, RunEvent};
use crate::models::RunCounters;
use camino::Utf8PathBuf;
use std::time::Duration;

/// Receives run events in delivery order.
pub trait RunObserver {
    fn on_event(&mut self, event: &RunEvent);
}

/// Outcome of observing a run to its end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub counters: RunCounters,
    pub log_path: Utf8PathBuf,
}

/// Drain `channel` every `interval` until `Done` arrives.
///
/// Each tick takes whatever is queued without blocking, so the caller's task stays
/// responsive (for example to a Ctrl-C handler selected against this future). Returns
/// `None` if the run disappeared without sending `Done`.
pub async fn poll_events(
    channel: &mut EventChannel,
    observer: &mut dyn RunObserver,
    interval: Duration,
) -> Option<RunOutcome> {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        for event in channel.try_drain() {
            observer.on_event(&event);
            if let RunEvent::Done { counters, log_path } = event {
                return Some(RunOutcome { counters, log_path });
            }
        }

        if channel.is_disconnected() {
            tracing::error!("Conversion worker ended without reporting completion");
            return None;
        }
    }
}
