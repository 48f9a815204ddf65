use std::path::Path;

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use git2::{BranchType, ErrorCode, Oid, Repository, Revwalk};

use crate::error::{ActivityError, Result};

pub struct RepoExt(pub Repository);

/// A local branch and the commit it points to.
#[derive(Debug, Clone)]
pub struct BranchInfo {
    pub name: String,
    pub tip: String,
    pub tip_time: DateTime<FixedOffset>,
    pub is_head: bool,
}

impl RepoExt {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Repository::discover(path)
            .map(Self)
            .map_err(|_| ActivityError::RepositoryNotFound {
                path: path.display().to_string(),
            })
    }

    pub fn repo(&self) -> &Repository {
        &self.0
    }

    /// Directory `Repository::open` accepts for re-opening this repo on
    /// another thread.
    pub fn location(&self) -> &Path {
        self.0.workdir().unwrap_or_else(|| self.0.path())
    }

    /// Resolve a branch name (local first, then remote-tracking) or any
    /// revspec to a commit id.
    pub fn resolve(&self, reference: &str) -> Result<Oid> {
        let invalid = || ActivityError::InvalidReference {
            reference: reference.to_string(),
        };

        for kind in [BranchType::Local, BranchType::Remote] {
            if let Ok(branch) = self.0.find_branch(reference, kind) {
                return branch.get().peel_to_commit().map(|c| c.id()).map_err(|_| invalid());
            }
        }

        self.0
            .revparse_single(reference)
            .and_then(|obj| obj.peel_to_commit())
            .map(|c| c.id())
            .map_err(|_| invalid())
    }

    /// Revwalk seeded from a branch, from every local branch, or from HEAD.
    pub fn walk_from(&self, branch: Option<&str>, all_branches: bool) -> Result<Revwalk<'_>> {
        let mut walk = self.0.revwalk()?;

        if all_branches {
            walk.push_glob("refs/heads/*")?;
        } else if let Some(name) = branch {
            walk.push(self.resolve(name)?)?;
        } else {
            match walk.push_head() {
                Ok(()) => {}
                Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                    return Err(ActivityError::EmptyRepository);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(walk)
    }

    pub fn branches(&self) -> Result<Vec<BranchInfo>> {
        let mut out = Vec::new();
        for item in self.0.branches(Some(BranchType::Local))? {
            let (branch, _) = item?;
            let name = match branch.name()? {
                Some(n) => n.to_string(),
                None => continue,
            };
            let commit = match branch.get().peel_to_commit() {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("skipping branch {name}: {e}");
                    continue;
                }
            };
            out.push(BranchInfo {
                tip: commit.id().to_string(),
                tip_time: commit_time(&commit.time()),
                is_head: branch.is_head(),
                name,
            });
        }
        out.sort_by(|a, b| b.tip_time.cmp(&a.tip_time));
        Ok(out)
    }
}

/// Convert a git timestamp to a chrono one in the commit's own offset.
/// Out-of-range timestamps map to the Unix epoch.
pub fn commit_time(t: &git2::Time) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(t.offset_minutes() * 60)
        .unwrap_or_else(|| Utc.fix());
    offset
        .timestamp_opt(t.seconds(), 0)
        .single()
        .unwrap_or_else(|| {
            tracing::warn!(seconds = t.seconds(), "commit time out of range, using the epoch");
            DateTime::<Utc>::UNIX_EPOCH.with_timezone(&offset)
        })
}
