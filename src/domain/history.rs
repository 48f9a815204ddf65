use std::path::Path;

use chrono::{DateTime, FixedOffset, Utc};
use git2::{Repository, Sort};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::diff::{self, DiffSummary};
use crate::domain::git::{commit_time, RepoExt};
use crate::error::Result;
use crate::utils::check_range;

/// Which commits to keep while walking history.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Case-insensitive substrings matched against `Name <email>`; any match keeps the commit.
    pub authors: Vec<String>,
    pub branch: Option<String>,
    pub all_branches: bool,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub no_merges: bool,
    /// Cap on the number of matching commits.
    pub limit: Option<usize>,
}

impl HistoryFilter {
    pub fn matches_author(&self, name: &str, email: &str) -> bool {
        if self.authors.is_empty() {
            return true;
        }
        let ident = format!("{name} <{email}>").to_lowercase();
        self.authors
            .iter()
            .any(|pat| ident.contains(&pat.to_lowercase()))
    }

    pub fn in_window(&self, at: &DateTime<FixedOffset>) -> bool {
        let at = at.with_timezone(&Utc);
        self.since.map_or(true, |s| at >= s) && self.until.map_or(true, |u| at <= u)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub author: String,
    pub email: String,
    pub timestamp: DateTime<FixedOffset>,
    pub subject: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub body: String,
    pub parents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub changes: Option<DiffSummary>,
}

impl CommitRecord {
    fn from_git(commit: &git2::Commit<'_>) -> Self {
        let author = commit.author();
        let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();
        let (subject, body) = split_message(&message);
        Self {
            sha: commit.id().to_string(),
            author: author.name().unwrap_or("unknown").to_string(),
            email: author.email().unwrap_or("unknown").to_string(),
            timestamp: commit_time(&author.when()),
            subject,
            body,
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
            changes: None,
        }
    }

    pub fn short_sha(&self) -> &str {
        &self.sha[..7.min(self.sha.len())]
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

fn split_message(message: &str) -> (String, String) {
    let trimmed = message.trim();
    match trimmed.split_once('\n') {
        Some((subject, rest)) => (subject.trim_end().to_string(), rest.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

/// Outcome of a history walk.
#[derive(Debug, Clone, Default)]
pub struct HistoryScan {
    /// Newest first.
    pub records: Vec<CommitRecord>,
    /// Commits that could not be read and were left out.
    pub skipped: usize,
}

/// Walk history and keep the commits selected by `filter`.
pub fn collect_history(repo: &RepoExt, filter: &HistoryFilter) -> Result<HistoryScan> {
    check_range(filter.since, filter.until)?;

    let mut walk = repo.walk_from(filter.branch.as_deref(), filter.all_branches)?;
    walk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;

    let limit = filter.limit.unwrap_or(usize::MAX);
    let mut scan = HistoryScan::default();

    for oid in walk {
        if scan.records.len() >= limit {
            break;
        }
        let commit = match oid.and_then(|id| repo.repo().find_commit(id)) {
            Ok(c) => c,
            Err(e) => {
                warn!("skipping unreadable commit: {e}");
                scan.skipped += 1;
                continue;
            }
        };

        if filter.no_merges && commit.parent_count() > 1 {
            continue;
        }
        let author = commit.author();
        if !filter.matches_author(author.name().unwrap_or(""), author.email().unwrap_or("")) {
            continue;
        }
        // The walk is only roughly time ordered, so keep going past the window.
        if !filter.in_window(&commit_time(&author.when())) {
            continue;
        }

        scan.records.push(CommitRecord::from_git(&commit));
    }

    debug!(
        kept = scan.records.len(),
        skipped = scan.skipped,
        "history walk finished"
    );
    Ok(scan)
}

/// Fill `changes` for every record, in parallel. Each worker opens its own
/// handle on the repository at `repo_path`.
pub fn attach_diffs(repo_path: &Path, records: &mut [CommitRecord]) {
    records.par_iter_mut().for_each_init(
        || Repository::open(repo_path),
        |repo, record| {
            let repo = match repo {
                Ok(r) => r,
                Err(e) => {
                    warn!("cannot open repository for diff of {}: {e}", record.short_sha());
                    return;
                }
            };
            match diff_for(repo, &record.sha) {
                Ok(summary) => record.changes = Some(summary),
                Err(e) => warn!("diff failed for {}: {e}", record.short_sha()),
            }
        },
    );
}

fn diff_for(repo: &Repository, sha: &str) -> Result<DiffSummary> {
    let oid = git2::Oid::from_str(sha)?;
    let commit = repo.find_commit(oid)?;
    diff::diff_tree(repo, &commit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    #[test]
    fn author_match_is_case_insensitive_substring() {
        let f = HistoryFilter {
            authors: vec!["ALICE".into(), "@corp.example".into()],
            ..Default::default()
        };
        assert!(f.matches_author("Alice Smith", "a@home.example"));
        assert!(f.matches_author("Bob", "bob@corp.example"));
        assert!(!f.matches_author("Carol", "carol@home.example"));
    }

    #[test]
    fn empty_author_list_matches_everyone() {
        assert!(HistoryFilter::default().matches_author("x", "y"));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let f = HistoryFilter {
            since: Some(since),
            until: Some(until),
            ..Default::default()
        };
        assert!(f.in_window(&since.fixed_offset()));
        assert!(f.in_window(&until.fixed_offset()));
        assert!(!f.in_window(&(until + chrono::Duration::seconds(1)).fixed_offset()));
    }

    #[test]
    fn message_split() {
        assert_eq!(
            split_message("subject line\n\nbody one\nbody two\n"),
            ("subject line".to_string(), "body one\nbody two".to_string())
        );
        assert_eq!(split_message("only\n"), ("only".to_string(), String::new()));
    }
}
