use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

use super::accounting::MatchCounter;
use super::barrier::CompletionBarrier;
use super::gate::AdmissionGate;
use super::sink::MatchSink;
use super::task::SearchTask;
use super::walker::{schedule, SearchContext};
use crate::config::FindConfig;
use crate::errors::FindResult;
use crate::metrics::WalkMetrics;
use crate::results::SearchSummary;

/// Runs file-name searches on a fixed pool of worker threads.
///
/// The pool has as many threads as the configured task ceiling, so admission
/// only ever blocks briefly. A searcher can run any number of searches one
/// after another; every search gets its own shared state.
pub struct Searcher {
    config: FindConfig,
    root: PathBuf,
    pool: Arc<ThreadPool>,
}

impl Searcher {
    /// Validates `config`, resolves the root and builds the worker pool
    pub fn new(config: &FindConfig) -> FindResult<Self> {
        config.validate()?;
        let root = config.resolve_root()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.max_active_tasks.get())
            .thread_name(|i| format!("fastfind-worker-{}", i))
            .panic_handler(|_| error!("A search task panicked; its subtree was abandoned"))
            .build()?;

        Ok(Self {
            config: config.clone(),
            root,
            pool: Arc::new(pool),
        })
    }

    /// The directory searches start from
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &FindConfig {
        &self.config
    }

    /// Seeds the root task and returns immediately
    pub fn start(&self, sink: Arc<dyn MatchSink>) -> SearchHandle {
        info!(
            "Starting search for '{}' in {} (max {} active tasks)",
            self.config.pattern,
            self.root.display(),
            self.config.max_active_tasks
        );

        let ctx = Arc::new(SearchContext {
            gate: AdmissionGate::new(self.config.max_active_tasks),
            counter: MatchCounter::new(self.config.match_limit),
            barrier: Arc::new(CompletionBarrier::new()),
            metrics: WalkMetrics::new(),
            sink,
            pool: Arc::clone(&self.pool),
        });

        let started = Instant::now();
        schedule(
            &ctx,
            SearchTask::root(self.root.clone(), self.config.pattern.as_str()),
        );

        SearchHandle { ctx, started }
    }

    /// Runs a search to completion
    pub fn run(&self, sink: Arc<dyn MatchSink>) -> SearchSummary {
        self.start(sink).wait()
    }
}

/// A search in progress
pub struct SearchHandle {
    ctx: Arc<SearchContext>,
    started: Instant,
}

impl SearchHandle {
    /// Blocks until every task of the search has finished
    pub fn wait(self) -> SearchSummary {
        self.ctx.barrier.wait_for_quiescence();
        self.summarize()
    }

    /// Waits at most `timeout` for the search to finish. Returns `true` if it did.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.ctx.barrier.wait_for_quiescence_timeout(timeout)
    }

    /// Matches accepted so far
    pub fn matches_so_far(&self) -> usize {
        self.ctx.counter.count()
    }

    /// Tasks currently admitted by the gate
    pub fn active_tasks(&self) -> usize {
        self.ctx.gate.active()
    }

    /// Tasks scheduled but not yet finished
    pub fn pending_tasks(&self) -> usize {
        self.ctx.barrier.pending()
    }

    fn summarize(&self) -> SearchSummary {
        let elapsed = self.started.elapsed();
        let peak = self.ctx.gate.peak();
        self.ctx.metrics.log_stats(peak, elapsed);

        let summary = SearchSummary {
            total_matches: self.ctx.counter.count(),
            match_limit: self.ctx.counter.limit(),
            stats: self.ctx.metrics.snapshot(peak),
            elapsed,
        };
        info!(
            "Search complete. Found {} matches in {} directories",
            summary.total_matches, summary.stats.dirs_scanned
        );
        summary
    }
}

/// Performs a complete search described by `config`, sending matches to `sink`
pub fn search(config: &FindConfig, sink: Arc<dyn MatchSink>) -> FindResult<SearchSummary> {
    let searcher = Searcher::new(config)?;
    Ok(searcher.run(sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FindError;
    use crate::search::sink::{CollectingSink, NullSink};
    use std::fs;
    use std::num::NonZeroUsize;
    use tempfile::tempdir;

    fn config_for(root: &Path, pattern: &str) -> FindConfig {
        FindConfig {
            root_path: root.to_path_buf(),
            ..FindConfig::new(pattern)
        }
    }

    #[test]
    fn test_search_nested_tree() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("alpha.txt"), "").unwrap();
        fs::write(dir.path().join("beta.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/alphabet.txt"), "").unwrap();

        let sink = Arc::new(CollectingSink::new());
        let summary = search(&config_for(dir.path(), "alpha"), sink.clone()).unwrap();

        assert_eq!(summary.total_matches, 2);
        let paths: Vec<_> = sink.sorted().into_iter().map(|e| e.path).collect();
        assert_eq!(
            paths,
            vec![
                dir.path().join("alpha.txt"),
                dir.path().join("sub").join("alphabet.txt"),
            ]
        );
    }

    #[test]
    fn test_searcher_is_reusable() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("one_x"), "").unwrap();

        let searcher = Searcher::new(&config_for(dir.path(), "x")).unwrap();
        assert_eq!(searcher.run(Arc::new(NullSink)).total_matches, 1);
        assert_eq!(searcher.run(Arc::new(NullSink)).total_matches, 1);
    }

    #[test]
    fn test_handle_reports_progress() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("found"), "").unwrap();

        let searcher = Searcher::new(&config_for(dir.path(), "found")).unwrap();
        let handle = searcher.start(Arc::new(NullSink));
        assert!(handle.wait_timeout(Duration::from_secs(10)));
        assert_eq!(handle.pending_tasks(), 0);
        assert_eq!(handle.active_tasks(), 0);
        assert_eq!(handle.matches_so_far(), 1);
        assert_eq!(handle.wait().total_matches, 1);
    }

    #[test]
    fn test_peak_active_within_ceiling() {
        let dir = tempdir().unwrap();
        for i in 0..32 {
            let sub = dir.path().join(format!("d{}", i));
            fs::create_dir(&sub).unwrap();
            fs::write(sub.join("leaf"), "").unwrap();
        }

        let mut config = config_for(dir.path(), "leaf");
        config.max_active_tasks = NonZeroUsize::new(2).unwrap();
        let summary = search(&config, Arc::new(NullSink)).unwrap();

        assert_eq!(summary.total_matches, 32);
        // bounded by the pool size as well; see the walker tests for a gate
        // that is smaller than the pool
        assert!(summary.stats.peak_active >= 1);
        assert!(summary.stats.peak_active <= 2);
        assert_eq!(summary.stats.dirs_scanned, 33);
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        let dir = tempdir().unwrap();
        let result = Searcher::new(&config_for(dir.path(), ""));
        assert!(matches!(result, Err(FindError::EmptyPattern)));
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let dir = tempdir().unwrap();
        let result = Searcher::new(&config_for(&dir.path().join("missing"), "x"));
        assert!(matches!(result, Err(FindError::NotADirectory(_))));
    }
}
