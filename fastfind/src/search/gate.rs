//! Admission control for directory tasks.
//!
//! The gate is a counting semaphore built from a mutex and a condition
//! variable. A task holds a [`Permit`] for as long as it is active; dropping
//! the permit releases the slot, so the slot is returned on every exit path,
//! including early returns and unwinding.
use std::num::NonZeroUsize;
use std::sync::{Condvar, Mutex, MutexGuard};
use tracing::trace;

#[derive(Debug, Default)]
struct GateState {
    active: usize,
    peak: usize,
}

/// Bounds how many tasks may be active at the same time
#[derive(Debug)]
pub struct AdmissionGate {
    ceiling: usize,
    state: Mutex<GateState>,
    available: Condvar,
}

/// Proof of admission; releases its slot when dropped
#[derive(Debug)]
#[must_use = "dropping a permit immediately releases its slot"]
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
}

impl AdmissionGate {
    /// Creates a gate admitting at most `ceiling` concurrent tasks
    pub fn new(ceiling: NonZeroUsize) -> Self {
        Self {
            ceiling: ceiling.get(),
            state: Mutex::new(GateState::default()),
            available: Condvar::new(),
        }
    }

    /// Maximum number of concurrently admitted tasks
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    // The state is two integers that are never left half-updated, so a
    // poisoned lock still holds consistent data.
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Blocks until a slot is free, then takes it
    pub fn acquire(&self) -> Permit<'_> {
        let mut state = self.lock();
        while state.active >= self.ceiling {
            trace!("Admission gate full ({} active), waiting", state.active);
            state = self
                .available
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
        self.admit(&mut state);
        Permit { gate: self }
    }

    /// Takes a slot if one is free without blocking
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        let mut state = self.lock();
        if state.active >= self.ceiling {
            return None;
        }
        self.admit(&mut state);
        Some(Permit { gate: self })
    }

    fn admit(&self, state: &mut GateState) {
        state.active += 1;
        state.peak = state.peak.max(state.active);
    }

    fn release(&self) {
        let mut state = self.lock();
        debug_assert!(state.active > 0, "released more permits than acquired");
        state.active = state.active.saturating_sub(1);
        drop(state);
        self.available.notify_one();
    }

    /// Number of currently admitted tasks
    pub fn active(&self) -> usize {
        self.lock().active
    }

    /// Highest number of simultaneously admitted tasks seen so far
    pub fn peak(&self) -> usize {
        self.lock().peak
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
