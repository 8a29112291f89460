use std::num::NonZeroUsize;
use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;

/// A single entry whose name contains the search pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    /// Full path of the matching entry
    pub path: PathBuf,
    /// The path rendered for display (lossy for non-UTF-8 names)
    pub display: String,
    /// Byte range of the matched substring inside `display`, always within the
    /// final path component
    pub span: Range<usize>,
    /// 1-based position of this match in the order matches were accepted
    pub ordinal: usize,
}

impl MatchEvent {
    /// The text that matched the pattern
    pub fn matched(&self) -> &str {
        &self.display[self.span.clone()]
    }

    /// Splits the display path into the text before, the match, and the text after
    pub fn split_display(&self) -> (&str, &str, &str) {
        (
            &self.display[..self.span.start],
            &self.display[self.span.clone()],
            &self.display[self.span.end..],
        )
    }
}

/// Counters describing how much of the tree a search visited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Directories successfully listed
    pub dirs_scanned: u64,
    /// Entries examined across all directories
    pub entries_seen: u64,
    /// Directories that could not be opened
    pub read_errors: u64,
    /// Entries whose metadata could not be read
    pub stat_errors: u64,
    /// Directory listings abandoned early because the match limit was reached
    pub dirs_cut_short: u64,
    /// Highest number of simultaneously active tasks observed
    pub peak_active: usize,
}

/// Outcome of a completed search
#[derive(Debug, Clone)]
pub struct SearchSummary {
    /// Number of matches accepted by the match accounting
    pub total_matches: usize,
    /// The configured cap on reported matches, if any
    pub match_limit: Option<NonZeroUsize>,
    /// Traversal statistics
    pub stats: WalkStats,
    /// Wall-clock time from seeding the root to quiescence
    pub elapsed: Duration,
}

impl SearchSummary {
    /// Whether the configured match limit was hit
    pub fn limit_reached(&self) -> bool {
        self.match_limit
            .is_some_and(|limit| self.total_matches >= limit.get())
    }

    /// Total number of local errors that caused an entry or subtree to be skipped
    pub fn skipped(&self) -> u64 {
        self.stats.read_errors + self.stats.stat_errors
    }

    /// Human readable one-line summary: `Found 1 match`, `Found 3 matches`,
    /// or the limit message
    pub fn headline(&self) -> String {
        match self.match_limit {
            Some(limit) if self.limit_reached() => {
                format!("Match limit of {} reached", limit)
            }
            _ => format!(
                "Found {} match{}",
                self.total_matches,
                if self.total_matches == 1 { "" } else { "es" }
            ),
        }
    }
}
