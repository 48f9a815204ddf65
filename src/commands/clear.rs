use anyhow::{bail, Result};
use clap::Args;
use serde_json::json;
use tracing::info;

use crate::commands::Global;
use crate::config::GithubConfig;
use crate::domain::cache::{CacheKey, CacheStore};
use crate::domain::github::RepoSlug;

/// Drop the cache entry for one repo/user, or everything with --all.
#[derive(Debug, Args)]
pub struct Clear {
    /// GitHub repository as owner/name or URL
    #[arg(required_unless_present = "all")]
    pub repo: Option<RepoSlug>,

    /// GitHub login the entry was fetched for
    #[arg(required_unless_present = "all")]
    pub user: Option<String>,

    /// Remove every cache entry
    #[arg(long, conflicts_with_all = ["repo", "user"])]
    pub all: bool,
}

impl super::RemoteRunnable for Clear {
    fn run(self, g: &Global, config: &GithubConfig) -> Result<()> {
        let store = CacheStore::new(config.cache_dir());

        let removed = if self.all {
            store.clear_all()?
        } else {
            let (Some(repo), Some(user)) = (self.repo, self.user) else {
                bail!("either <REPO> <USER> or --all is required");
            };
            usize::from(store.remove(&CacheKey::new(repo, user))?)
        };
        info!(removed, "cache cleared");

        if g.json {
            println!("{}", serde_json::to_string_pretty(&json!({ "removed": removed }))?);
        } else {
            println!("Removed {removed} cache entr{}", if removed == 1 { "y" } else { "ies" });
        }
        Ok(())
    }
}
