use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::errors::{FindError, FindResult};

/// Default ceiling on concurrently active directory tasks
pub const DEFAULT_MAX_ACTIVE_TASKS: usize = 8;

/// Configuration for a file-name search.
///
/// # Configuration Locations
///
/// Values are read from the following files, later entries overriding
/// earlier ones:
/// 1. Global `$CONFIG_DIR/fastfind/config.yaml`
/// 2. Local `.fastfind.yaml` in the current directory
/// 3. Custom config file specified via `--config`
///
/// Command-line values are applied last through [`FindConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// # Substring to look for in entry names (case-sensitive)
/// pattern: "alpha"
///
/// # Directory to start from ("." means the current working directory)
/// root_path: "."
///
/// # Maximum number of directory tasks running at once
/// max_active_tasks: 8
///
/// # Stop reporting after this many matches (omit for no limit)
/// match_limit: 20
///
/// # Show only the summary, not individual matches
/// stats_only: false
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindConfig {
    /// Substring searched for in each entry name
    #[serde(default)]
    pub pattern: String,

    /// Directory the search starts from
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Ceiling on concurrently active directory tasks; also the worker pool size
    #[serde(default = "default_max_active_tasks")]
    pub max_active_tasks: NonZeroUsize,

    /// Optional cap on the number of reported matches
    #[serde(default)]
    pub match_limit: Option<NonZeroUsize>,

    /// Whether to only show the summary instead of individual matches
    #[serde(default)]
    pub stats_only: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_active_tasks() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_MAX_ACTIVE_TASKS).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for FindConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            root_path: default_root_path(),
            max_active_tasks: default_max_active_tasks(),
            match_limit: None,
            stats_only: false,
            log_level: default_log_level(),
        }
    }
}

/// Values supplied on the command line. `None` leaves the file value alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub pattern: Option<String>,
    pub root_path: Option<PathBuf>,
    pub max_active_tasks: Option<NonZeroUsize>,
    pub match_limit: Option<NonZeroUsize>,
    pub stats_only: bool,
    pub log_level: Option<String>,
}

impl FindConfig {
    /// Creates a configuration searching the current directory for `pattern`
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from the default locations plus a specific file.
    ///
    /// An explicitly named file that does not exist is an error; the default
    /// locations are skipped silently when absent.
    pub fn load_from(config_path: Option<&Path>) -> FindResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let defaults = [
            dirs::config_dir().map(|p| p.join("fastfind/config.yaml")),
            Some(PathBuf::from(".fastfind.yaml")),
        ];
        for path in defaults.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(pattern) = cli.pattern {
            self.pattern = pattern;
        }
        if let Some(root) = cli.root_path {
            self.root_path = root;
        }
        if let Some(max) = cli.max_active_tasks {
            self.max_active_tasks = max;
        }
        if cli.match_limit.is_some() {
            self.match_limit = cli.match_limit;
        }
        if cli.stats_only {
            self.stats_only = true;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    /// Checks the values that would make a search meaningless
    pub fn validate(&self) -> FindResult<()> {
        if self.pattern.is_empty() {
            return Err(FindError::EmptyPattern);
        }
        if self.pattern.contains(std::path::MAIN_SEPARATOR) {
            warn!(
                "Pattern '{}' contains a path separator and can never match an entry name",
                self.pattern
            );
        }
        Ok(())
    }

    /// Resolves the directory the search starts from.
    ///
    /// The default root `.` is replaced by the absolute current working
    /// directory so that reported paths are absolute.
    pub fn resolve_root(&self) -> FindResult<PathBuf> {
        let root = if self.root_path == Path::new(".") {
            std::env::current_dir().map_err(FindError::NoWorkingDirectory)?
        } else {
            self.root_path.clone()
        };

        if !root.is_dir() {
            return Err(FindError::not_a_directory(root));
        }
        Ok(root)
    }
}
