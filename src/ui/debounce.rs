//! Trailing-edge debounce over tokio tasks

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delivers the last value passed to [`Debouncer::call`] once no further
/// call has arrived for `delay`
///
/// Each call cancels the pending one. Values come out of the receiver returned
/// by [`Debouncer::new`], so the owner handles them on its own task.
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                tx,
                pending: None,
            },
            rx,
        )
    }

    /// Schedule `value`, replacing anything still waiting
    pub fn call(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session ended
            let _ = tx.send(value);
        }));
    }

    /// Drop the pending value, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_value_is_delivered() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));

        debouncer.call("r");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.call("ru");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.call("rust");
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(301)).await;
        assert_eq!(rx.recv().await, Some("rust"));
        assert!(rx.try_recv().is_err());
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_value() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));

        debouncer.call(1);
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_fire() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::from_millis(50));

        debouncer.call("a");
        tokio::time::sleep(Duration::from_millis(60)).await;
        debouncer.call("b");
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(rx.recv().await, Some("a"));
        assert_eq!(rx.recv().await, Some("b"));
    }
}
