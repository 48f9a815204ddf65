use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::commands::Global;
use crate::domain::git::RepoExt;
use crate::presentation::table;
use crate::utils::fmt_timestamp;

/// List local branches, most recently updated first.
#[derive(Debug, Args)]
pub struct Branches {
    /// Path to the Git repo
    #[arg(short, long, default_value = ".")]
    pub path: String,
}

impl super::Runnable for Branches {
    fn run(self, g: &Global) -> Result<()> {
        let repo = RepoExt::open(&self.path)?;
        let branches = repo.branches()?;

        if g.json {
            let rows: Vec<_> = branches
                .iter()
                .map(|b| {
                    json!({
                        "name": b.name,
                        "tip": b.tip,
                        "date": fmt_timestamp(&b.tip_time),
                        "head": b.is_head,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else if branches.is_empty() {
            eprintln!("No local branches.");
        } else {
            println!("{}", table::branches(&branches));
        }
        Ok(())
    }
}
