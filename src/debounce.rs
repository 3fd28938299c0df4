// src/debounce.rs - Timer-based coalescing of rapid triggers

use log::trace;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Coalesces calls arriving within a quiet window into a single delivery
/// carrying the arguments of the *last* call.
///
/// Each `schedule` aborts the previously armed timer, so superseded calls are
/// never delivered. Delivery happens over the receiver handed out by [`new`],
/// which keeps the debouncer usable from synchronous code while the timer
/// itself runs as a tokio task.
///
/// Must be used inside a tokio runtime.
///
/// [`new`]: Debouncer::new
#[derive(Debug)]
pub struct Debouncer<A: Send + 'static> {
    window: Duration,
    tx: mpsc::UnboundedSender<A>,
    pending: Option<JoinHandle<()>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<A>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                window,
                tx,
                pending: None,
            },
            rx,
        )
    }

    /// Arm the timer with `args`, discarding whatever was armed before.
    pub fn schedule(&mut self, args: A) {
        self.cancel();
        let tx = self.tx.clone();
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Receiver dropped means the owner is gone; nothing to deliver to.
            let _ = tx.send(args);
        }));
    }

    /// Drop the armed timer without delivering anything.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            trace!("superseding pending debounce timer");
            handle.abort();
        }
    }
}

impl<A: Send + 'static> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;

    const WINDOW: Duration = Duration::from_millis(200);

    #[tokio::test(start_paused = true)]
    async fn test_rapid_calls_coalesce_to_last() {
        let (mut debouncer, mut rx) = Debouncer::new(WINDOW);

        debouncer.schedule("w");
        debouncer.schedule("wa");
        debouncer.schedule("was");

        assert_eq!(rx.recv().await, Some("was"));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_outside_window_both_fire() {
        let (mut debouncer, mut rx) = Debouncer::new(WINDOW);

        debouncer.schedule("first");
        tokio::time::sleep(WINDOW + Duration::from_millis(1)).await;
        debouncer.schedule("second");

        assert_eq!(rx.recv().await, Some("first"));
        assert_eq!(rx.recv().await, Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_delivery() {
        let (mut debouncer, mut rx) = Debouncer::new(WINDOW);

        debouncer.schedule("doomed");
        debouncer.cancel();

        tokio::time::sleep(WINDOW * 2).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_window_fires_immediately() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::ZERO);

        debouncer.schedule(42u32);
        assert_eq!(rx.recv().await, Some(42));
    }
}
