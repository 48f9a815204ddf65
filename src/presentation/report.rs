use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{ExportConfig, OutputFormat};
use crate::domain::history::CommitRecord;
use crate::domain::pager::{self, Page};
use crate::error::{ActivityError, Result};
use crate::utils::{fmt_date, fmt_timestamp};

/// One commit in `git log --stat` flavoured text.
pub fn render_commit(out: &mut String, c: &CommitRecord) {
    let _ = writeln!(out, "commit {}", c.sha);
    if c.is_merge() {
        let short: Vec<&str> = c.parents.iter().map(|p| &p[..7.min(p.len())]).collect();
        let _ = writeln!(out, "Merge: {}", short.join(" "));
    }
    let _ = writeln!(out, "Author: {} <{}>", c.author, c.email);
    let _ = writeln!(out, "Date:   {}", fmt_timestamp(&c.timestamp));
    out.push('\n');
    let _ = writeln!(out, "    {}", c.subject);
    if !c.body.is_empty() {
        out.push('\n');
        for line in c.body.lines() {
            if line.is_empty() {
                out.push('\n');
            } else {
                let _ = writeln!(out, "    {line}");
            }
        }
    }

    if let Some(changes) = &c.changes {
        if !changes.files.is_empty() {
            out.push('\n');
            for f in &changes.files {
                let (adds, dels) = if f.binary {
                    ("-".to_string(), "-".to_string())
                } else {
                    (format!("+{}", f.additions), format!("-{}", f.deletions))
                };
                let path = match &f.old_path {
                    Some(old) => format!("{old} -> {}", f.path),
                    None => f.path.clone(),
                };
                let _ = writeln!(out, " {}  {:>6}  {:>6}  {}", f.status.letter(), adds, dels, path);
            }
            let _ = writeln!(out, " {}", changes.footer());
        }
    }
    out.push('\n');
}

pub fn render_page_text(prefix: &str, page: &Page<'_>) -> String {
    let (from, to) = page.span();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# {prefix} page {}/{}: commits {from}-{to} of {}",
        page.number, page.total_pages, page.total_commits
    );
    out.push('\n');
    for c in page.commits {
        render_commit(&mut out, c);
    }
    out
}

#[derive(Serialize)]
struct JsonPage<'a> {
    page: usize,
    total_pages: usize,
    total_commits: usize,
    commits: &'a [CommitRecord],
}

pub fn render_page_json(page: &Page<'_>) -> Result<String> {
    let payload = JsonPage {
        page: page.number,
        total_pages: page.total_pages,
        total_commits: page.total_commits,
        commits: page.commits,
    };
    Ok(serde_json::to_string_pretty(&payload)?)
}

/// A written page, as listed in the index.
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub number: usize,
    pub file: String,
    pub commits: usize,
    pub oldest: Option<String>,
    pub newest: Option<String>,
}

fn summarize(page: &Page<'_>, file: String) -> PageSummary {
    let span = page.date_span();
    PageSummary {
        number: page.number,
        file,
        commits: page.commits.len(),
        oldest: span.map(|(o, _)| fmt_date(&o)),
        newest: span.map(|(_, n)| fmt_date(&n)),
    }
}

pub fn render_index_text(prefix: &str, total_commits: usize, pages: &[PageSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {prefix}: {total_commits} commits in {} pages", pages.len());
    for p in pages {
        let _ = writeln!(
            out,
            "{:>4}  {:<28} {:>5} commits  {} .. {}",
            p.number,
            p.file,
            p.commits,
            p.oldest.as_deref().unwrap_or("-"),
            p.newest.as_deref().unwrap_or("-"),
        );
    }
    out
}

/// Delete page files left over from earlier exports with the same prefix.
fn remove_stale_pages(dir: &Path, prefix: &str) -> Result<usize> {
    let mut removed = 0;
    let entries = fs::read_dir(dir).map_err(|e| ActivityError::io(dir, e))?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if pager::is_page_file(prefix, name) {
            let path = entry.path();
            fs::remove_file(&path).map_err(|e| ActivityError::io(&path, e))?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub index: PathBuf,
    pub pages: Vec<PageSummary>,
}

/// Write every page plus an index file into `config.out_dir`.
pub fn write_export(config: &ExportConfig, records: &[CommitRecord]) -> Result<ExportOutcome> {
    let dir = &config.out_dir;
    fs::create_dir_all(dir).map_err(|e| ActivityError::io(dir, e))?;

    let stale = remove_stale_pages(dir, &config.prefix)?;
    if stale > 0 {
        debug!(stale, "removed pages from a previous export");
    }

    let pages = pager::paginate(records, config.page_size)?;
    let ext = config.format.extension();

    let written: Vec<Result<PageSummary>> = pages
        .par_iter()
        .map(|page| {
            let file = pager::page_file_name(&config.prefix, page.number, ext);
            let body = match config.format {
                OutputFormat::Text => render_page_text(&config.prefix, page),
                OutputFormat::Json => render_page_json(page)?,
            };
            let path = dir.join(&file);
            fs::write(&path, body).map_err(|e| ActivityError::io(&path, e))?;
            Ok(summarize(page, file))
        })
        .collect();

    let mut summaries = Vec::with_capacity(written.len());
    for r in written {
        summaries.push(r?);
    }

    let index = dir.join(format!("{}-index.{ext}", config.prefix));
    let body = match config.format {
        OutputFormat::Text => render_index_text(&config.prefix, records.len(), &summaries),
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "prefix": config.prefix,
            "total_commits": records.len(),
            "page_size": config.page_size,
            "pages": summaries,
        }))?,
    };
    fs::write(&index, body).map_err(|e| ActivityError::io(&index, e))?;

    if records.is_empty() {
        warn!("no commits matched; only the index was written");
    }
    Ok(ExportOutcome {
        index,
        pages: summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diff::{ChangeStatus, DiffSummary, FileChange};
    use chrono::{FixedOffset, TimeZone};
    use similar_asserts::assert_eq;

    fn record() -> CommitRecord {
        CommitRecord {
            sha: "1945ab9c752534e733c38ba0109dc3b741f0a6eb".into(),
            author: "Test Author".into(),
            email: "test@example.com".into(),
            timestamp: FixedOffset::east_opt(3600)
                .unwrap()
                .with_ymd_and_hms(2024, 1, 17, 2, 33, 6)
                .unwrap(),
            subject: "Add parser".into(),
            body: "First paragraph.\n\nSecond paragraph.".into(),
            parents: vec![
                "c460aeb7fb2d109c17e43de0ce681faec0b7374d".into(),
                "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".into(),
            ],
            changes: Some(DiffSummary {
                files: vec![
                    FileChange {
                        path: "src/parser.rs".into(),
                        old_path: Some("src/old.rs".into()),
                        status: ChangeStatus::Renamed,
                        additions: 12,
                        deletions: 3,
                        binary: false,
                    },
                    FileChange {
                        path: "logo.png".into(),
                        old_path: None,
                        status: ChangeStatus::Added,
                        additions: 0,
                        deletions: 0,
                        binary: true,
                    },
                ],
                additions: 12,
                deletions: 3,
            }),
        }
    }

    #[test]
    fn commit_text_layout() {
        let mut out = String::new();
        render_commit(&mut out, &record());
        let expected = "\
commit 1945ab9c752534e733c38ba0109dc3b741f0a6eb
Merge: c460aeb aaaaaaa
Author: Test Author <test@example.com>
Date:   2024-01-17 02:33:06 +0100

    Add parser

    First paragraph.

    Second paragraph.

 R     +12      -3  src/old.rs -> src/parser.rs
 A       -       -  logo.png
 2 files changed, 12 insertions(+), 3 deletions(-)

";
        assert_eq!(out, expected);
    }

    #[test]
    fn page_header_and_json() {
        let records = vec![record(), record()];
        let pages = pager::paginate(&records, 1).unwrap();
        let text = render_page_text("commits", &pages[1]);
        assert!(text.starts_with("# commits page 2/2: commits 2-2 of 2\n"));

        let json: serde_json::Value = serde_json::from_str(&render_page_json(&pages[0]).unwrap()).unwrap();
        assert_eq!(json["page"], 1);
        assert_eq!(json["total_pages"], 2);
        assert_eq!(json["commits"][0]["changes"]["files"][0]["status"], "renamed");
    }

    #[test]
    fn index_lists_pages() {
        let pages = vec![PageSummary {
            number: 1,
            file: "commits-page-0001.txt".into(),
            commits: 2,
            oldest: Some("2024-01-01".into()),
            newest: Some("2024-01-02".into()),
        }];
        let text = render_index_text("commits", 2, &pages);
        assert!(text.starts_with("# commits: 2 commits in 1 pages\n"));
        assert!(text.contains("commits-page-0001.txt"));
        assert!(text.contains("2024-01-01 .. 2024-01-02"));
    }
}
