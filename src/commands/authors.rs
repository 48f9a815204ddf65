use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use crate::commands::{Global, HistoryArgs};
use crate::domain::{git::RepoExt, history, stats::CommitStats};
use crate::presentation::table;
use crate::utils::fmt_date;

/// Rank authors by number of commits over the filtered history.
#[derive(Debug, Args)]
pub struct Authors {
    #[command(flatten)]
    pub history: HistoryArgs,

    /// Number of authors to show
    #[arg(long, default_value = "20")]
    pub top: usize,

    /// List the least active authors first
    #[arg(long)]
    pub asc: bool,

    /// Also total added/deleted lines (computes a diff per commit)
    #[arg(long)]
    pub lines: bool,
}

impl super::Runnable for Authors {
    fn run(self, g: &Global) -> Result<()> {
        let repo = RepoExt::open(&self.history.path)?;
        let mut scan = history::collect_history(&repo, &self.history.filter())
            .with_context(|| format!("walking history of {}", self.history.path))?;
        if self.lines {
            history::attach_diffs(repo.location(), &mut scan.records);
        }
        let stats = CommitStats::from_records(&scan.records);

        if g.json {
            let authors: Vec<_> = stats
                .sorted(!self.asc)
                .into_iter()
                .take(self.top)
                .map(|(email, m)| {
                    json!({
                        "email": email,
                        "name": m.name,
                        "count": m.count,
                        "additions": m.additions,
                        "deletions": m.deletions,
                        "first": fmt_date(&m.first),
                        "last":  fmt_date(&m.last),
                    })
                })
                .collect();
            let payload = json!({
                "total_commits": stats.total_seen,
                "authors_total": stats.data.len(),
                "authors": authors,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        if stats.data.is_empty() {
            eprintln!("No commits matched the filters.");
            return Ok(());
        }
        println!(
            "👥 {} authors, {} commits",
            stats.data.len(),
            stats.total_seen
        );
        println!("{}", table::author_stats(&stats, !self.asc, self.top));
        Ok(())
    }
}
