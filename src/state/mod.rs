// Run phase tracking
//
// PhaseTracker wraps the engine's current RunPhase in Arc<RwLock<T>> and broadcasts
// every transition, so observers can watch the run lifecycle without polling.

use std::fmt;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Lifecycle phase of the engine's current (or most recent) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Scanning,
    NoWork,
    Processing,
    Finished,
}

impl RunPhase {
    /// Whether a run is in progress and a new one must not start.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            RunPhase::Scanning | RunPhase::NoWork | RunPhase::Processing
        )
    }

    fn can_transition_to(self, next: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (self, next),
            (Idle | Finished, Scanning)
                | (Scanning, NoWork | Processing)
                | (NoWork | Processing, Finished)
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Scanning => "scanning",
            RunPhase::NoWork => "no-work",
            RunPhase::Processing => "processing",
            RunPhase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// A transition emitted by [`PhaseTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: RunPhase,
    pub to: RunPhase,
}

/// Thread-safe phase holder with change broadcasting.
///
/// Cloning shares the same underlying phase and channel.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    phase: Arc<RwLock<RunPhase>>,
    phase_tx: broadcast::Sender<PhaseChange>,
}

impl PhaseTracker {
    /// Create a tracker in [`RunPhase::Idle`] with a 32-event broadcast buffer.
    pub fn new() -> Self {
        let (phase_tx, _) = broadcast::channel(32);
        Self {
            phase: Arc::new(RwLock::new(RunPhase::Idle)),
            phase_tx,
        }
    }

    pub fn current(&self) -> RunPhase {
        *self.phase.read().unwrap()
    }

    /// Move to `next` if the transition is legal.
    ///
    /// Returns false (and leaves the phase unchanged) for an illegal transition.
    pub fn transition(&self, next: RunPhase) -> bool {
        let change = {
            let mut phase = self.phase.write().unwrap();
            if !phase.can_transition_to(next) {
                tracing::warn!("Rejected run phase transition {} -> {}", *phase, next);
                return false;
            }
            let change = PhaseChange {
                from: *phase,
                to: next,
            };
            *phase = next;
            change
        };

        tracing::debug!("Run phase {} -> {}", change.from, change.to);
        // Ignore send errors - it's OK if no one is listening
        let _ = self.phase_tx.send(change);
        true
    }

    /// Force the tracker back to idle, used when a run could not be launched.
    pub fn reset(&self) {
        let from = {
            let mut phase = self.phase.write().unwrap();
            std::mem::replace(&mut *phase, RunPhase::Idle)
        };
        let _ = self.phase_tx.send(PhaseChange {
            from,
            to: RunPhase::Idle,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PhaseChange> {
        self.phase_tx.subscribe()
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
