pub mod config;
pub mod errors;
pub mod metrics;
pub mod results;
pub mod search;

pub use config::{CliOverrides, FindConfig};
pub use errors::{FindError, FindResult};
pub use results::{MatchEvent, SearchSummary, WalkStats};
pub use search::{search, CollectingSink, MatchSink, NullSink, SearchHandle, Searcher};
