use std::sync::Mutex;

use crate::results::MatchEvent;

/// Receives matches as they are accepted.
///
/// Sinks are called concurrently from every worker thread, in no particular
/// order across directories.
pub trait MatchSink: Send + Sync {
    fn on_match(&self, event: &MatchEvent);
}

impl<F> MatchSink for F
where
    F: Fn(&MatchEvent) + Send + Sync,
{
    fn on_match(&self, event: &MatchEvent) {
        self(event)
    }
}

/// Discards every match; useful when only the count matters
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MatchSink for NullSink {
    fn on_match(&self, _event: &MatchEvent) {}
}

/// Keeps every match in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<MatchEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the collected matches sorted by path
    pub fn sorted(&self) -> Vec<MatchEvent> {
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        events.sort_by(|a, b| a.path.cmp(&b.path));
        events
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MatchSink for CollectingSink {
    fn on_match(&self, event: &MatchEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
