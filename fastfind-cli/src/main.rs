use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use fastfind::{
    CliOverrides, FindConfig, FindError, MatchEvent, MatchSink, NullSink, SearchSummary, Searcher,
};
use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ff", author, version, about, long_about = None)]
struct Cli {
    /// Substring to look for in file and directory names (prompted for if omitted)
    pattern: Option<String>,

    /// Root directory to search in (default: current directory)
    #[arg(short = 'd', long)]
    root: Option<PathBuf>,

    /// Maximum number of directories scanned at once
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Stop reporting after this many matches
    #[arg(short = 'l', long)]
    limit: Option<NonZeroUsize>,

    /// Show only statistics, not matches
    #[arg(short, long)]
    stats: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    run()
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let overrides = CliOverrides {
        pattern: cli.pattern,
        root_path: cli.root,
        max_active_tasks: cli.threads,
        match_limit: cli.limit,
        stats_only: cli.stats,
        log_level: cli.log_level,
    };
    let mut config = FindConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?
        .merge_with_cli(overrides);

    init_logging(&config.log_level);
    debug!("Using configuration: {:?}", config);

    if config.pattern.is_empty() {
        config.pattern = prompt_for_pattern(&mut io::stdin().lock(), &mut io::stdout())?;
    }

    let searcher = Searcher::new(&config)?;
    debug!("Resolved search root: {}", searcher.root().display());
    println!("Searching for '{}'", searcher.config().pattern);

    let stats_only = searcher.config().stats_only;
    let sink: Arc<dyn MatchSink> = if stats_only {
        Arc::new(NullSink)
    } else {
        Arc::new(print_match)
    };

    let summary = searcher.run(sink);
    print_summary(&summary, stats_only);
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Asks for a pattern until a non-empty line is entered
fn prompt_for_pattern(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<String, FindError> {
    let mut line = String::new();
    loop {
        write!(output, "Enter a name to search for: ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(FindError::prompt("no search pattern was entered"));
        }
        let pattern = line.trim_end_matches(['\r', '\n']);
        if !pattern.is_empty() {
            return Ok(pattern.to_string());
        }
    }
}

fn print_match(event: &MatchEvent) {
    let (before, matched, after) = event.split_display();
    println!("{}{}{}", before, matched.green(), after);
}

fn print_summary(summary: &SearchSummary, stats_only: bool) {
    if stats_only {
        let stats = &summary.stats;
        println!(
            "Scanned {} directories ({} entries) in {:.2?}",
            stats.dirs_scanned, stats.entries_seen, summary.elapsed
        );
        if summary.skipped() > 0 {
            println!("Skipped {} unreadable entries", summary.skipped());
        }
    }
    println!("{}", summary.headline());
    println!();
}
