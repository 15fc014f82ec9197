// Run → observer event channel
//
// The run owns the only sender; the observer owns the receiver. Delivery is ordered
// and unbounded, so the run never blocks on a slow observer, and the observer can
// drain without blocking.

use crate::models::RunCounters;
use camino::Utf8PathBuf;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};

/// Events produced by a conversion run.
///
/// Ordering per run: at most one `Total` before any `Progress`; `Progress` indices go
/// 1, 2, 3, … without gaps; exactly one `Done` ends the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Number of planned work items.
    Total(usize),
    /// 1-based index of the item just handled, whatever its outcome.
    Progress(usize),
    /// A line as written to the run log file.
    LogLine(String),
    /// Terminal event with the final counters and the run log location.
    Done {
        counters: RunCounters,
        log_path: Utf8PathBuf,
    },
}

impl RunEvent {
    pub fn is_done(&self) -> bool {
        matches!(self, RunEvent::Done { .. })
    }
}

/// Producer half, held by the run.
#[derive(Debug, Clone)]
pub(crate) struct EventSender {
    tx: UnboundedSender<RunEvent>,
}

impl EventSender {
    pub(crate) fn send(&self, event: RunEvent) {
        if self.tx.send(event).is_err() {
            // Observer went away; the run still completes and writes its log
            tracing::debug!("Run event dropped: observer disconnected");
        }
    }
}

/// Observer half of a run's event stream.
#[derive(Debug)]
pub struct EventChannel {
    rx: UnboundedReceiver<RunEvent>,
    done: bool,
    disconnected: bool,
}

pub(crate) fn event_channel() -> (EventSender, EventChannel) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        EventSender { tx },
        EventChannel {
            rx,
            done: false,
            disconnected: false,
        },
    )
}

impl EventChannel {
    /// Next queued event without waiting.
    pub fn try_next(&mut self) -> Option<RunEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(self.observe(event)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    /// Every event queued right now, in order. Never blocks.
    pub fn try_drain(&mut self) -> Vec<RunEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for the next event; `None` once the run has dropped its sender and the
    /// queue is empty.
    pub async fn recv(&mut self) -> Option<RunEvent> {
        match self.rx.recv().await {
            Some(event) => Some(self.observe(event)),
            None => {
                self.disconnected = true;
                None
            }
        }
    }

    /// Blocking variant of [`recv`](Self::recv) for synchronous callers.
    ///
    /// Must not be called from inside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<RunEvent> {
        match self.rx.blocking_recv() {
            Some(event) => Some(self.observe(event)),
            None => {
                self.disconnected = true;
                None
            }
        }
    }

    /// Block until `Done` (or disconnection) and return every event received.
    pub fn collect_until_done(&mut self) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while !self.done {
            match self.blocking_recv() {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }

    /// Whether `Done` has been received.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether the run dropped its sender. Without a prior `Done`, the run died.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    fn observe(&mut self, event: RunEvent) -> RunEvent {
        if event.is_done() {
            self.done = true;
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_drain_is_ordered_and_non_blocking() {
        let (tx, mut channel) = event_channel();
        assert!(channel.try_drain().is_empty());

        tx.send(RunEvent::Total(2));
        tx.send(RunEvent::Progress(1));
        tx.send(RunEvent::LogLine("hello".to_string()));

        assert_eq!(
            channel.try_drain(),
            vec![
                RunEvent::Total(2),
                RunEvent::Progress(1),
                RunEvent::LogLine("hello".to_string())
            ]
        );
        assert!(channel.try_drain().is_empty());
        assert!(!channel.is_done());
    }

    #[test]
    fn test_done_is_tracked() {
        let (tx, mut channel) = event_channel();
        tx.send(RunEvent::Done {
            counters: RunCounters::default(),
            log_path: Utf8PathBuf::from("/out/convert.log"),
        });

        let events = channel.collect_until_done();

        assert_eq!(events.len(), 1);
        assert!(channel.is_done());
    }

    #[test]
    fn test_disconnect_without_done() {
        let (tx, mut channel) = event_channel();
        tx.send(RunEvent::Total(1));
        drop(tx);

        let events = channel.collect_until_done();

        assert_eq!(events, vec![RunEvent::Total(1)]);
        assert!(!channel.is_done());
        assert!(channel.is_disconnected());
    }

    #[test]
    fn test_send_after_observer_dropped_is_silent() {
        let (tx, channel) = event_channel();
        drop(channel);
        tx.send(RunEvent::Progress(1));
    }

    #[tokio::test]
    async fn test_async_recv() {
        let (tx, mut channel) = event_channel();
        tokio::spawn(async move {
            tx.send(RunEvent::Total(3));
        });

        assert_eq!(channel.recv().await, Some(RunEvent::Total(3)));
        assert_eq!(channel.recv().await, None);
    }
}
