//! Debounced change handling.
//!
//! Editor change notifications arrive once per keystroke. Propagating on
//! every one would rewrite the whole document collection mid-word, so the
//! engine waits until a burst of edits has quieted for a fixed interval
//! before acting. Each new notification cancels the outstanding timer and
//! arms a fresh one, so only the last notification in a burst survives.
//!
//! The debouncer holds no domain knowledge: it runs whatever future it was
//! handed after the delay. In particular it knows nothing about
//! re-entrancy; callers check the [`ReentrancyGuard`](crate::guard) before
//! scheduling.

use std::sync::Mutex;
use std::time::Duration;

use tokio::task::AbortHandle;

use crate::error::LockResultExt;

/// Default debounce interval between the last edit and propagation (500ms).
///
/// Long enough to coalesce normal typing, short enough that the copies do
/// not visibly lag the edited line.
pub const DEFAULT_DEBOUNCE_DURATION: Duration = Duration::from_millis(500);

const LOG_TARGET: &str = "kagami::debounce";

/// Coalesces bursts of edit notifications into one deferred action.
///
/// There is a single timer slot: scheduling while a timer is pending aborts
/// the pending task outright. Cancellation via [`AbortHandle`] is
/// immediate, not cooperative; the sleeping task never runs its action.
pub struct ChangeDebouncer {
    pending: Mutex<Option<AbortHandle>>,
    delay: Duration,
}

impl Default for ChangeDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeDebouncer {
    /// Create a debouncer with the default interval.
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_DEBOUNCE_DURATION)
    }

    /// Create a debouncer with a custom interval.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            pending: Mutex::new(None),
            delay,
        }
    }

    /// Arm the timer with a new action, cancelling any outstanding one.
    ///
    /// After `delay` with no further `schedule` call, `action` runs exactly
    /// once on the tokio runtime. Must be called from within a runtime.
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.pending.lock().recover_poison("debounce.schedule");

        if let Some(prev) = slot.take() {
            prev.abort();
            log::trace!(target: LOG_TARGET, "Cancelled previous debounce timer");
        }

        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            log::debug!(target: LOG_TARGET, "Debounce timer expired, running action");
            action.await;
        });

        *slot = Some(task.abort_handle());
    }

    /// Abort the outstanding timer, if any. Called on shutdown.
    pub fn cancel(&self) {
        let mut slot = self.pending.lock().recover_poison("debounce.cancel");
        if let Some(handle) = slot.take() {
            handle.abort();
            log::trace!(target: LOG_TARGET, "Cancelled debounce timer on request");
        }
    }

    /// Whether a timer is armed and its action has not yet completed.
    ///
    /// Useful for testing.
    #[cfg(test)]
    pub(crate) fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .recover_poison("debounce.has_pending")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_action(counter: &Arc<AtomicUsize>, value: usize) -> impl Future<Output = ()> + use<> {
        let counter = Arc::clone(counter);
        async move {
            counter.store(value, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn rapid_schedules_run_only_the_last_action() {
        let debouncer = ChangeDebouncer::with_delay(Duration::from_millis(20));
        let runs = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));

        for i in 1..=5 {
            let runs = Arc::clone(&runs);
            let last = Arc::clone(&last);
            debouncer.schedule(async move {
                runs.fetch_add(1, Ordering::SeqCst);
                last.store(i, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn cancel_prevents_the_action_from_running() {
        let debouncer = ChangeDebouncer::with_delay(Duration::from_millis(20));
        let marker = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counting_action(&marker, 1));
        assert!(debouncer.has_pending());

        debouncer.cancel();
        assert!(!debouncer.has_pending());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(marker.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancel_without_a_pending_timer_is_a_noop() {
        let debouncer = ChangeDebouncer::with_delay(Duration::from_millis(20));
        debouncer.cancel();
        assert!(!debouncer.has_pending());
    }

    #[tokio::test]
    async fn action_runs_after_the_delay() {
        let debouncer = ChangeDebouncer::with_delay(Duration::from_millis(10));
        let marker = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counting_action(&marker, 42));
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(marker.load(Ordering::SeqCst), 42);
        assert!(!debouncer.has_pending());
    }
}
