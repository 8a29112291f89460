//! Concurrent, bounded, recursive file-name search.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────────────────┐
//!                 │        Searcher          │
//!                 │  - seeds the root task   │
//!                 │  - waits for quiescence  │
//!                 └────────────┬─────────────┘
//!                              │ schedule
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!  ┌─────▼─────┐         ┌─────▼─────┐         ┌─────▼─────┐
//!  │  Worker 1 │         │  Worker 2 │         │  Worker N │
//!  │ gate slot │         │ gate slot │         │ gate slot │
//!  │ read_dir  │         │ read_dir  │         │ read_dir  │
//!  └───────────┘         └───────────┘         └───────────┘
//!        │ subdirectories are scheduled back onto the pool
//! ```
//!
//! Every scheduled task holds a [`barrier::TaskToken`] from the moment it is
//! scheduled and a [`gate::Permit`] while it runs. Both are released by
//! `Drop`, so an unreadable directory, an early return on the match limit, or
//! a panic all leave the shared counters consistent.
//!
//! The match limit is a best-effort cutoff for traversal: tasks already
//! scheduled still run, but each stops listing its directory as soon as it
//! notices the limit, and the match counter never accepts more than the
//! limit, so the reported count never exceeds it.
pub mod accounting;
pub mod barrier;
pub mod engine;
pub mod gate;
pub mod matcher;
pub mod sink;
pub mod task;
mod walker;

pub use accounting::MatchCounter;
pub use barrier::{CompletionBarrier, TaskToken};
pub use engine::{search, SearchHandle, Searcher};
pub use gate::{AdmissionGate, Permit};
pub use matcher::NameMatcher;
pub use sink::{CollectingSink, MatchSink, NullSink};
pub use task::SearchTask;
