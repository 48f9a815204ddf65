use anyhow::Result;
use chrono::Utc;
use clap::Args;
use serde_json::json;
use tracing::warn;

use crate::commands::{Global, TargetArgs};
use crate::config::GithubConfig;
use crate::domain::cache::CacheStore;
use crate::domain::window;
use crate::presentation::table;
use crate::utils::fmt_utc;

/// Print cached commits in the window without touching the network.
#[derive(Debug, Args)]
pub struct Show {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl super::RemoteRunnable for Show {
    fn run(self, g: &Global, config: &GithubConfig) -> Result<()> {
        let now = Utc::now();
        let requested = self.target.window(now)?;
        let key = self.target.key();
        let store = CacheStore::new(config.cache_dir());

        let entry = store.load(&key)?;
        let window = requested.clamp_end(now);

        let (commits, missing) = match (&entry, window) {
            (Some(e), Some(w)) => (e.commits_in(w), window::gaps(w, &e.covered)),
            (None, Some(w)) => (Vec::new(), vec![w]),
            (_, None) => (Vec::new(), Vec::new()),
        };

        if entry.is_none() {
            warn!("nothing cached for {} in {}; run `gh-activity fetch` first", key.user, key.repo);
        }
        for gap in &missing {
            warn!(
                "not cached: {} .. {}",
                fmt_utc(&gap.start),
                fmt_utc(&gap.end)
            );
        }

        if g.json {
            let payload = json!({
                "repo": key.repo.to_string(),
                "user": key.user,
                "complete": missing.is_empty(),
                "missing": missing,
                "commits": commits,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        println!(
            "🗂  {}: {} cached commits by {}{}",
            key.repo,
            commits.len(),
            key.user,
            if missing.is_empty() { "" } else { " (window partly uncached)" }
        );
        if !commits.is_empty() {
            println!("{}", table::remote_commits(&commits));
        }
        Ok(())
    }
}
