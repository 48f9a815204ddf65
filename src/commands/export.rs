use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use tracing::info;

use crate::commands::{Global, HistoryArgs};
use crate::config::{ExportConfig, OutputFormat};
use crate::domain::git::RepoExt;
use crate::domain::history;
use crate::presentation::{report, table};

/// Write the filtered history as numbered page files.
#[derive(Debug, Args)]
pub struct Export {
    #[command(flatten)]
    pub history: HistoryArgs,

    /// Directory that receives the page files
    #[arg(short, long, default_value = "git-history")]
    pub out_dir: PathBuf,

    /// File name prefix for pages and index
    #[arg(long, default_value = "commits")]
    pub prefix: String,

    /// Commits per page
    #[arg(long, default_value = "100")]
    pub page_size: usize,

    /// Page file format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Skip per-file change lists
    #[arg(long)]
    pub no_diff: bool,

    /// Worker threads for diffs and writing (0 = rayon default)
    #[arg(long, default_value = "0")]
    pub threads: usize,
}

impl Export {
    fn config(&self) -> ExportConfig {
        ExportConfig {
            out_dir: self.out_dir.clone(),
            prefix: self.prefix.clone(),
            page_size: self.page_size,
            format: self.format,
            threads: self.threads,
        }
    }
}

impl super::Runnable for Export {
    fn run(self, g: &Global) -> Result<()> {
        let config = self.config();
        config.validate()?;

        let repo = RepoExt::open(&self.history.path)?;
        let mut scan = history::collect_history(&repo, &self.history.filter())
            .with_context(|| format!("walking history of {}", self.history.path))?;
        info!(commits = scan.records.len(), "history collected");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .context("building worker pool")?;

        // git2::Repository is not Sync; workers reopen it from its path
        let location = repo.location().to_path_buf();
        let with_diff = !self.no_diff;
        let outcome = pool.install(|| -> Result<report::ExportOutcome> {
            if with_diff {
                history::attach_diffs(&location, &mut scan.records);
            }
            Ok(report::write_export(&config, &scan.records)?)
        })?;

        if g.json {
            let payload = json!({
                "out_dir": config.out_dir,
                "index": outcome.index,
                "total_commits": scan.records.len(),
                "skipped": scan.skipped,
                "pages": outcome.pages,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        if scan.records.is_empty() {
            eprintln!("No commits matched the filters.");
        } else {
            println!(
                "📄 {} commits in {} pages → {}",
                scan.records.len(),
                outcome.pages.len(),
                config.out_dir.display()
            );
            println!("{}", table::pages(&outcome.pages));
        }
        if scan.skipped > 0 {
            eprintln!("⚠️  {} unreadable commits were skipped", scan.skipped);
        }
        println!("Index: {}", outcome.index.display());
        Ok(())
    }
}
