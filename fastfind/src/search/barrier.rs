//! Termination detection for a tree of tasks.
//!
//! [`CompletionBarrier`] is a wait-group. Every scheduled task owns a
//! [`TaskToken`]; the pending count drops when the token does. A parent
//! enters the barrier on behalf of a child before handing the task to the
//! pool and keeps its own token until its listing is finished, so the count
//! only reaches zero once no task can schedule anything new.
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::trace;

/// Lets a caller block until every scheduled task has finished
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    pending: Mutex<usize>,
    quiescent: Condvar,
}

/// Membership of one task in a [`CompletionBarrier`].
///
/// The token owns a handle to the barrier so it can travel with a task onto
/// a pool thread.
#[derive(Debug)]
#[must_use = "dropping a token immediately marks its task as finished"]
pub struct TaskToken {
    barrier: Arc<CompletionBarrier>,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers one more pending task
    pub fn enter(self: &Arc<Self>) -> TaskToken {
        *self.lock() += 1;
        TaskToken {
            barrier: Arc::clone(self),
        }
    }

    fn leave(&self) {
        let mut pending = self.lock();
        debug_assert!(*pending > 0, "task left the barrier twice");
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            trace!("All tasks finished");
            self.quiescent.notify_all();
        }
    }

    /// Number of tasks scheduled but not yet finished
    pub fn pending(&self) -> usize {
        *self.lock()
    }

    /// Blocks until no task is pending
    pub fn wait_for_quiescence(&self) {
        let mut pending = self.lock();
        while *pending > 0 {
            pending = self
                .quiescent
                .wait(pending)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Like [`wait_for_quiescence`](Self::wait_for_quiescence) but gives up
    /// after `timeout`. Returns `true` if quiescence was reached.
    pub fn wait_for_quiescence_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.lock();
        while *pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            pending = self
                .quiescent
                .wait_timeout(pending, remaining)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
        true
    }
}

impl Drop for TaskToken {
    fn drop(&mut self) {
        self.barrier.leave();
    }
}
