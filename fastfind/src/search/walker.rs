//! The recursive unit of work.
//!
//! Each task lists one directory, reports entries whose name contains the
//! pattern, and schedules a new task for every subdirectory. A task is
//! admitted by the [`AdmissionGate`] when it starts running on a worker, not
//! when its parent schedules it: a parent never waits for a slot while
//! holding its own, so the gate cannot deadlock however deep the tree is.
use rayon::ThreadPool;
use std::ffi::OsStr;
use std::fs;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::accounting::MatchCounter;
use super::barrier::{CompletionBarrier, TaskToken};
use super::gate::AdmissionGate;
use super::matcher::NameMatcher;
use super::sink::MatchSink;
use super::task::SearchTask;
use crate::metrics::WalkMetrics;
use crate::results::MatchEvent;

/// State shared by every task of one search
pub(crate) struct SearchContext {
    pub(crate) gate: AdmissionGate,
    pub(crate) counter: MatchCounter,
    pub(crate) barrier: Arc<CompletionBarrier>,
    pub(crate) metrics: WalkMetrics,
    pub(crate) sink: Arc<dyn MatchSink>,
    pub(crate) pool: Arc<ThreadPool>,
}

/// Registers `task` with the barrier and hands it to the worker pool
pub(crate) fn schedule(ctx: &Arc<SearchContext>, task: SearchTask) {
    let token = ctx.barrier.enter();
    let worker_ctx = Arc::clone(ctx);
    trace!("Scheduling {}", task.dir().display());
    ctx.pool.spawn(move || run_task(worker_ctx, task, token));
}

fn run_task(ctx: Arc<SearchContext>, task: SearchTask, token: TaskToken) {
    {
        let _permit = ctx.gate.acquire();
        walk_dir(&ctx, &task);
    }
    // The caller may observe quiescence as soon as the token is gone, so
    // nothing that references the context may outlive it.
    drop(task);
    drop(ctx);
    drop(token);
}

/// Lists one directory, reporting matches and scheduling subdirectories
pub(crate) fn walk_dir(ctx: &Arc<SearchContext>, task: &SearchTask) {
    let dir = task.dir();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Unable to read directory '{}': {}", dir.display(), e);
            ctx.metrics.record_read_error();
            return;
        }
    };
    ctx.metrics.record_dir_scanned();
    debug!("Scanning directory: {}", dir.display());
    let matcher = NameMatcher::new(Arc::clone(task.pattern()));

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Unable to read entry in '{}': {}", dir.display(), e);
                ctx.metrics.record_stat_error();
                continue;
            }
        };
        ctx.metrics.record_entry();

        let path = entry.path();
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(
                    "Unable to get file parameters for '{}': {}",
                    path.display(),
                    e
                );
                ctx.metrics.record_stat_error();
                continue;
            }
        };

        if ctx.counter.limit_reached() {
            debug!("Match limit reached, leaving {} early", dir.display());
            ctx.metrics.record_cut_short();
            return;
        }

        let name = entry.file_name();
        if let Some(span) = matcher.find(&name) {
            if let Some(ordinal) = ctx.counter.record_match() {
                trace!("Match #{}: {}", ordinal, path.display());
                let event = match_event(path.clone(), &name, span, ordinal);
                ctx.sink.on_match(&event);
            }
        }

        if metadata.is_dir() {
            schedule(ctx, task.child(path));
        }
    }
}

/// Builds the event for a match found at `span` within the entry `name`
fn match_event(path: PathBuf, name: &OsStr, span: Range<usize>, ordinal: usize) -> MatchEvent {
    let display = path.to_string_lossy().into_owned();
    let offset = display.len().saturating_sub(name.to_string_lossy().len());
    MatchEvent {
        path,
        display,
        span: offset + span.start..offset + span.end,
        ordinal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::sink::CollectingSink;
    use rayon::ThreadPoolBuilder;
    use std::num::NonZeroUsize;
    use std::path::Path;
    use tempfile::tempdir;

    fn context(limit: Option<usize>, sink: Arc<dyn MatchSink>) -> Arc<SearchContext> {
        context_with(2, 2, limit, sink)
    }

    fn context_with(
        threads: usize,
        ceiling: usize,
        limit: Option<usize>,
        sink: Arc<dyn MatchSink>,
    ) -> Arc<SearchContext> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        Arc::new(SearchContext {
            gate: AdmissionGate::new(NonZeroUsize::new(ceiling).unwrap()),
            counter: MatchCounter::new(limit.and_then(NonZeroUsize::new)),
            barrier: Arc::new(CompletionBarrier::new()),
            metrics: WalkMetrics::new(),
            sink,
            pool: Arc::new(pool),
        })
    }

    #[test]
    fn test_match_event_span_points_into_file_name() {
        let event = match_event(
            PathBuf::from("/alpha/sub/my-alpha.txt"),
            OsStr::new("my-alpha.txt"),
            3..8,
            1,
        );
        assert_eq!(event.matched(), "alpha");
        assert_eq!(event.split_display(), ("/alpha/sub/my-", "alpha", ".txt"));
    }

    #[test]
    fn test_walk_dir_single_level() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.txt"), "").unwrap();
        std::fs::write(dir.path().join("beta.txt"), "").unwrap();

        let sink = Arc::new(CollectingSink::new());
        let ctx = context(None, sink.clone());
        walk_dir(&ctx, &SearchTask::root(dir.path(), "alpha"));

        let events = sink.sorted();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].path, dir.path().join("alpha.txt"));
        assert_eq!(ctx.counter.count(), 1);
        assert_eq!(ctx.metrics.snapshot(0).entries_seen, 2);
    }

    #[test]
    fn test_missing_directory_is_local_error() {
        let sink = Arc::new(CollectingSink::new());
        let ctx = context(None, sink.clone());
        walk_dir(&ctx, &SearchTask::root(Path::new("/definitely/not/here"), "x"));

        let stats = ctx.metrics.snapshot(0);
        assert_eq!(stats.read_errors, 1);
        assert_eq!(stats.dirs_scanned, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_scheduled_subdirectories_reach_quiescence() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        std::fs::write(dir.path().join("a/b/c/needle"), "").unwrap();

        let sink = Arc::new(CollectingSink::new());
        let ctx = context(None, sink.clone());
        schedule(&ctx, SearchTask::root(dir.path(), "needle"));
        ctx.barrier.wait_for_quiescence();

        assert_eq!(ctx.counter.count(), 1);
        assert_eq!(ctx.gate.active(), 0);
        assert_eq!(ctx.metrics.snapshot(0).dirs_scanned, 4);
    }

    #[test]
    fn test_limit_stops_listing() {
        let dir = tempdir().unwrap();
        for i in 0..10 {
            std::fs::write(dir.path().join(format!("hit_{}", i)), "").unwrap();
        }

        let sink = Arc::new(CollectingSink::new());
        let ctx = context(Some(3), sink.clone());
        walk_dir(&ctx, &SearchTask::root(dir.path(), "hit"));

        assert_eq!(ctx.counter.count(), 3);
        assert_eq!(sink.len(), 3);
        assert_eq!(ctx.metrics.snapshot(0).dirs_cut_short, 1);
    }

    #[test]
    fn test_gate_holds_back_spare_workers() {
        let dir = tempdir().unwrap();
        for i in 0..16 {
            let sub = dir.path().join(format!("d{}", i));
            std::fs::create_dir(&sub).unwrap();
            std::fs::write(sub.join("leaf"), "").unwrap();
        }

        // more workers than slots, so admission has to block
        let sink = Arc::new(CollectingSink::new());
        let ctx = context_with(8, 1, None, sink.clone());
        schedule(&ctx, SearchTask::root(dir.path(), "leaf"));
        ctx.barrier.wait_for_quiescence();

        assert_eq!(ctx.counter.count(), 16);
        assert_eq!(ctx.gate.peak(), 1);
        assert_eq!(ctx.gate.active(), 0);
        assert_eq!(ctx.metrics.snapshot(0).dirs_scanned, 17);
    }
}
