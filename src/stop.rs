//! A one-shot, broadcast stop signal.
//!
//! Tasks await [`StopSignal::stopped`] alongside their own suspension points,
//! so a stop is observed even while they are blocked on the mailbox or
//! pacing.
use tokio::sync::watch;

/// Creates a stop signal, returning the handle that raises it and a
/// receiver that observes it.
pub fn signal() -> (StopHandle, StopSignal) {
    let (sender, receiver) = watch::channel(false);
    (StopHandle(sender), StopSignal(receiver))
}

/// Raises a stop signal.
///
/// Dropping the handle without calling [`stop`](StopHandle::stop) also
/// stops every receiver, so a task can never wait on an owner that is gone.
#[derive(Debug)]
pub struct StopHandle(watch::Sender<bool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.send_replace(true);
    }
}

#[derive(Clone, Debug)]
pub struct StopSignal(watch::Receiver<bool>);

impl StopSignal {
    /// Resolves once the signal has been raised.
    pub async fn stopped(&mut self) {
        // An error means the handle was dropped, which counts as a stop.
        let _ = self.0.wait_for(|stopped| *stopped).await;
    }

    /// Returns whether the signal has been raised.
    pub fn is_stopped(&self) -> bool {
        *self.0.borrow() || self.0.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;

    #[tokio::test]
    async fn stopped_resolves_once_raised() {
        let (handle, mut signal) = signal();
        assert!(!signal.is_stopped());

        let mut stopped = task::spawn(signal.stopped());
        assert_pending!(stopped.poll());

        handle.stop();
        assert!(stopped.is_woken());
        assert_ready!(stopped.poll());
        drop(stopped);
        assert!(signal.is_stopped());
    }

    #[tokio::test]
    async fn dropping_the_handle_stops() {
        let (handle, mut signal) = signal();
        drop(handle);
        signal.stopped().await;
        assert!(signal.is_stopped());
    }

    #[tokio::test]
    async fn reaches_every_clone() {
        let (handle, signal) = signal();
        let mut other = signal.clone();
        handle.stop();
        other.stopped().await;
        assert!(signal.is_stopped());
    }
}
