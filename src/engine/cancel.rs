use tokio::sync::watch;

/// Observer side of a run's cooperative cancellation.
///
/// Only the observer writes the flag; only the run reads it.
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

/// Run side of the cancellation flag, checked before each work item.
#[derive(Debug, Clone)]
pub struct StopToken {
    rx: watch::Receiver<bool>,
}

/// Create a linked handle/token pair in the "not stopped" state.
pub fn stop_pair() -> (StopHandle, StopToken) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopToken { rx })
}

impl StopHandle {
    /// Request a stop. Idempotent; succeeds even after the run has ended.
    pub fn request_stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stop_requested(&self) -> bool {
        *self.tx.borrow()
    }
}

impl StopToken {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_is_visible_to_token() {
        let (handle, token) = stop_pair();
        assert!(!token.is_stopped());

        handle.request_stop();
        handle.request_stop();

        assert!(token.is_stopped());
        assert!(handle.is_stop_requested());
    }

    #[test]
    fn test_request_after_token_dropped() {
        let (handle, token) = stop_pair();
        drop(token);
        handle.request_stop();
        assert!(handle.is_stop_requested());
    }
}
