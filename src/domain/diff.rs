use git2::{Delta, Diff, DiffFindOptions, DiffOptions, Patch, Repository};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Per-file status letter, as printed by `git diff-tree --name-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChange,
}

impl ChangeStatus {
    pub fn letter(self) -> char {
        match self {
            ChangeStatus::Added => 'A',
            ChangeStatus::Modified => 'M',
            ChangeStatus::Deleted => 'D',
            ChangeStatus::Renamed => 'R',
            ChangeStatus::Copied => 'C',
            ChangeStatus::TypeChange => 'T',
        }
    }

    fn from_delta(d: Delta) -> Option<Self> {
        match d {
            Delta::Added => Some(ChangeStatus::Added),
            Delta::Modified => Some(ChangeStatus::Modified),
            Delta::Deleted => Some(ChangeStatus::Deleted),
            Delta::Renamed => Some(ChangeStatus::Renamed),
            Delta::Copied => Some(ChangeStatus::Copied),
            Delta::Typechange => Some(ChangeStatus::TypeChange),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub old_path: Option<String>,
    pub status: ChangeStatus,
    pub additions: usize,
    pub deletions: usize,
    pub binary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub files: Vec<FileChange>,
    pub additions: usize,
    pub deletions: usize,
}

/// Changes introduced by one commit relative to its first parent (the empty
/// tree for root commits), with rename detection.
pub fn diff_tree(repo: &Repository, commit: &git2::Commit<'_>) -> Result<DiffSummary> {
    let tree = commit.tree()?;
    let parent_tree = match commit.parent(0) {
        Ok(p) => Some(p.tree()?),
        Err(_) => None,
    };

    let mut opts = DiffOptions::new();
    opts.ignore_submodules(true);
    let mut diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
    diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

    summarize(&diff)
}

fn summarize(diff: &Diff<'_>) -> Result<DiffSummary> {
    let mut out = DiffSummary::default();

    for (i, delta) in diff.deltas().enumerate() {
        let status = match ChangeStatus::from_delta(delta.status()) {
            Some(s) => s,
            None => continue,
        };
        let new_path = delta.new_file().path().map(|p| p.display().to_string());
        let old_path = delta.old_file().path().map(|p| p.display().to_string());
        let path = match new_path.clone().or_else(|| old_path.clone()) {
            Some(p) => p,
            None => continue,
        };

        let (additions, deletions, binary) = match Patch::from_diff(diff, i)? {
            Some(patch) if patch.delta().flags().is_binary() => (0, 0, true),
            Some(patch) => {
                let (_, adds, dels) = patch.line_stats()?;
                (adds, dels, false)
            }
            None => (0, 0, delta.flags().is_binary()),
        };

        out.additions += additions;
        out.deletions += deletions;
        out.files.push(FileChange {
            old_path: match status {
                ChangeStatus::Renamed | ChangeStatus::Copied if old_path != new_path => old_path,
                _ => None,
            },
            path,
            status,
            additions,
            deletions,
            binary,
        });
    }
    Ok(out)
}

impl DiffSummary {
    /// `git --stat` style footer line.
    pub fn footer(&self) -> String {
        let n = self.files.len();
        format!(
            "{} file{} changed, {} insertion{}(+), {} deletion{}(-)",
            n,
            if n == 1 { "" } else { "s" },
            self.additions,
            if self.additions == 1 { "" } else { "s" },
            self.deletions,
            if self.deletions == 1 { "" } else { "s" },
        )
    }
}
