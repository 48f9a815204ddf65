use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use clap::Args;

use crate::config::GithubConfig;
use crate::domain::cache::CacheKey;
use crate::domain::github::RepoSlug;
use crate::domain::history::HistoryFilter;
use crate::domain::window::TimeRange;
use crate::utils::{parse_since, parse_until};

#[derive(Debug, Clone, Default)]
pub struct Global {
    /// Global JSON output toggle (overrides per-command flags)
    pub json: bool,
}

/// A `git-history` subcommand.
pub trait Runnable {
    fn run(self, g: &Global) -> Result<()>;
}

/// A `gh-activity` subcommand; these also need the GitHub settings.
pub trait RemoteRunnable {
    fn run(self, g: &Global, config: &GithubConfig) -> Result<()>;
}

/// Repository location and commit selection shared by the local commands.
#[derive(Debug, Clone, Args)]
pub struct HistoryArgs {
    /// Path to the Git repo
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// Keep commits whose "Name <email>" contains this text (repeatable, case-insensitive)
    #[arg(short, long = "author", value_name = "PATTERN")]
    pub authors: Vec<String>,

    /// Branch, tag or revision to walk from (default: HEAD)
    #[arg(short, long, conflicts_with = "all_branches")]
    pub branch: Option<String>,

    /// Walk every local branch
    #[arg(long)]
    pub all_branches: bool,

    /// Only commits on or after this date (YYYY-MM-DD, RFC 3339 or <N>d)
    #[arg(short, long, value_parser = parse_since)]
    pub since: Option<DateTime<Utc>>,

    /// Only commits on or before this date (YYYY-MM-DD, RFC 3339 or <N>d)
    #[arg(short, long, value_parser = parse_until)]
    pub until: Option<DateTime<Utc>>,

    /// Leave out merge commits
    #[arg(long)]
    pub no_merges: bool,

    /// Stop after this many matching commits
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

impl HistoryArgs {
    pub fn filter(&self) -> HistoryFilter {
        HistoryFilter {
            authors: self.authors.clone(),
            branch: self.branch.clone(),
            all_branches: self.all_branches,
            since: self.since,
            until: self.until,
            no_merges: self.no_merges,
            limit: self.limit,
        }
    }
}

/// Repository, user and time window shared by the remote commands.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// GitHub repository as owner/name or URL
    pub repo: RepoSlug,

    /// GitHub login (or commit email) whose commits to track
    pub user: String,

    /// Window start (YYYY-MM-DD, RFC 3339 or <N>d); defaults to --days before now
    #[arg(short, long, value_parser = parse_since)]
    pub since: Option<DateTime<Utc>>,

    /// Window end (YYYY-MM-DD, RFC 3339 or <N>d); defaults to now
    #[arg(short, long, value_parser = parse_until)]
    pub until: Option<DateTime<Utc>>,

    /// Window length in days when --since is not given
    #[arg(short, long, default_value = "30")]
    pub days: u32,
}

impl TargetArgs {
    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.repo.clone(), self.user.clone())
    }

    pub fn window(&self, now: DateTime<Utc>) -> crate::error::Result<TimeRange> {
        let until = self.until.unwrap_or(now);
        let since = self
            .since
            .unwrap_or_else(|| now - Duration::days(i64::from(self.days)));
        Ok(TimeRange::new(since, until)?.whole_seconds())
    }
}

pub mod authors;
pub mod branches;
pub mod clear;
pub mod export;
pub mod fetch;
pub mod show;
pub mod status;

pub use authors::Authors;
pub use branches::Branches;
pub use clear::Clear;
pub use export::Export;
pub use fetch::Fetch;
pub use show::Show;
pub use status::Status;
