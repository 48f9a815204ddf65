use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::commands::Global;
use crate::config::GithubConfig;
use crate::domain::cache::CacheStore;
use crate::presentation::table;
use crate::utils::fmt_utc;

/// List cache entries with the ranges they cover.
#[derive(Debug, Args)]
pub struct Status {}

impl super::RemoteRunnable for Status {
    fn run(self, g: &Global, config: &GithubConfig) -> Result<()> {
        let store = CacheStore::new(config.cache_dir());
        let entries = store.list()?;

        if g.json {
            let rows: Vec<_> = entries
                .iter()
                .map(|e| {
                    json!({
                        "repo": e.repo.to_string(),
                        "user": e.user,
                        "commits": e.commits.len(),
                        "covered": e.covered,
                        "updated_at": fmt_utc(&e.updated_at),
                    })
                })
                .collect();
            let payload = json!({
                "cache_dir": store.dir(),
                "entries": rows,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        println!("Cache: {}", store.dir().display());
        if entries.is_empty() {
            println!("(empty)");
        } else {
            println!("{}", table::cache_entries(&entries));
        }
        Ok(())
    }
}
