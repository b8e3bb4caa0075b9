//! Inter-word delay timer seam.
//!
//! The controller schedules exactly one cursor advance at a time. Arming is
//! always preceded by an unconditional cancel, and fires are
//! generation-tagged so a timer armed for a previous word can never advance
//! the cursor after pause, stop, or re-arming — even if its fire was already
//! in flight when it was cancelled.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Generation tag for a scheduled advance.
///
/// The controller only honors the generation it most recently armed; stale
/// generations are dropped on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerGeneration(pub u64);

/// One-shot, re-armable delay timer.
pub trait DelayTimer: Send {
    /// Cancel any pending fire, then schedule one for `after` from now.
    fn arm(&mut self, after: Duration, generation: TimerGeneration);

    /// Cancel the pending fire, if any.
    fn cancel(&mut self);
}

/// Tokio-backed [`DelayTimer`].
///
/// Each arm spawns a sleep task that reports the generation back on the
/// channel handed out by [`TokioDelayTimer::new`]; re-arming or cancelling
/// aborts the previous task first.
#[derive(Debug)]
pub struct TokioDelayTimer {
    fire_tx: mpsc::UnboundedSender<TimerGeneration>,
    task: Option<JoinHandle<()>>,
}

impl TokioDelayTimer {
    /// Create a timer and the receiver its fires arrive on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerGeneration>) {
        let (fire_tx, fire_rx) = mpsc::unbounded_channel();
        (
            Self {
                fire_tx,
                task: None,
            },
            fire_rx,
        )
    }
}

impl DelayTimer for TokioDelayTimer {
    fn arm(&mut self, after: Duration, generation: TimerGeneration) {
        self.cancel();
        let fire_tx = self.fire_tx.clone();
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // A dropped receiver means the host loop is gone; nothing to do.
            let _ = fire_tx.send(generation);
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TokioDelayTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
