use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde_json::json;

use crate::commands::{Global, TargetArgs};
use crate::config::GithubConfig;
use crate::domain::cache::{self, CacheStore, SyncOptions};
use crate::domain::github::GithubClient;
use crate::presentation::table;
use crate::utils::fmt_utc;

/// Fetch whatever part of the window is not cached yet, then list the
/// user's commits in it.
#[derive(Debug, Args)]
pub struct Fetch {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Re-fetch the whole window even where it is already cached
    #[arg(long)]
    pub refresh: bool,

    /// Also write the commits in the window to this JSON file
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl super::RemoteRunnable for Fetch {
    fn run(self, g: &Global, config: &GithubConfig) -> Result<()> {
        config.validate()?;
        let now = Utc::now();
        let window = self.target.window(now)?;
        let key = self.target.key();

        let store = CacheStore::new(config.cache_dir());
        let client = GithubClient::new(config)?;
        let report = cache::sync(
            &store,
            &client,
            &key,
            window,
            now,
            &SyncOptions {
                refresh: self.refresh,
            },
        )
        .with_context(|| format!("syncing commits of {} in {}", key.user, key.repo))?;

        let payload = json!({
            "repo": key.repo.to_string(),
            "user": key.user,
            "since": report.window.map(|w| fmt_utc(&w.start)),
            "until": report.window.map(|w| fmt_utc(&w.end)),
            "fetched": report.fetched,
            "new_commits": report.new_commits,
            "commits": report.commits,
        });

        if let Some(path) = &self.out {
            fs::write(path, serde_json::to_string_pretty(&payload)?)
                .with_context(|| format!("writing {}", path.display()))?;
        }

        if g.json {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        let Some(w) = report.window else {
            eprintln!("The window starts in the future; nothing to show.");
            return Ok(());
        };
        println!(
            "📦 {}: {} commits by {} between {} and {}",
            key.repo,
            report.commits.len(),
            key.user,
            fmt_utc(&w.start),
            fmt_utc(&w.end)
        );
        if report.fetched.is_empty() {
            println!("   served from cache");
        } else {
            println!(
                "   fetched {} range(s), {} new commit(s)",
                report.fetched.len(),
                report.new_commits
            );
        }
        if !report.commits.is_empty() {
            println!("{}", table::remote_commits(&report.commits));
        }
        Ok(())
    }
}
