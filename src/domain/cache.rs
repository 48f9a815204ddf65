//! On-disk commit cache keyed by `(repo, user)`, and the incremental sync
//! that fills only the uncovered parts of a requested window.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::github::{CommitSource, RemoteCommit, RepoSlug};
use crate::domain::window::{self, TimeRange};
use crate::error::{ActivityError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub repo: RepoSlug,
    pub user: String,
}

impl CacheKey {
    pub fn new(repo: RepoSlug, user: impl Into<String>) -> Self {
        Self {
            repo,
            user: user.into(),
        }
    }

    /// `owner__name__user.json`, lower-cased since GitHub names are case-insensitive.
    pub fn file_name(&self) -> String {
        let clean = |s: &str| -> String {
            s.chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                        c.to_ascii_lowercase()
                    } else {
                        '_'
                    }
                })
                .collect()
        };
        format!(
            "{}__{}__{}.json",
            clean(&self.repo.owner),
            clean(&self.repo.name),
            clean(&self.user)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub repo: RepoSlug,
    pub user: String,
    /// Normalized ranges known to be fully fetched.
    pub covered: Vec<TimeRange>,
    /// Newest first, unique by SHA.
    pub commits: Vec<RemoteCommit>,
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn empty(key: &CacheKey, now: DateTime<Utc>) -> Self {
        Self {
            repo: key.repo.clone(),
            user: key.user.clone(),
            covered: Vec::new(),
            commits: Vec::new(),
            updated_at: now,
        }
    }

    pub fn commits_in(&self, window: TimeRange) -> Vec<RemoteCommit> {
        self.commits
            .iter()
            .filter(|c| window.contains(c.committed_at))
            .cloned()
            .collect()
    }

    fn shas(&self) -> HashSet<String> {
        self.commits.iter().map(|c| c.sha.clone()).collect()
    }

    /// Add fetched commits, replacing any cached copy with the same SHA.
    fn merge(&mut self, fetched: Vec<RemoteCommit>) {
        let fresh: HashSet<String> = fetched.iter().map(|c| c.sha.clone()).collect();
        self.commits.retain(|c| !fresh.contains(&c.sha));
        let mut seen = HashSet::new();
        self.commits
            .extend(fetched.into_iter().filter(|c| seen.insert(c.sha.clone())));
        self.commits.sort_by(|a, b| {
            b.committed_at
                .cmp(&a.committed_at)
                .then_with(|| a.sha.cmp(&b.sha))
        });
    }

    fn cover(&mut self, range: TimeRange) {
        let mut covered = std::mem::take(&mut self.covered);
        covered.push(range);
        self.covered = window::normalize(covered);
    }
}

/// Directory of cache files, one per key.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// `None` when nothing is cached. A corrupt file is reported and treated
    /// as empty so the next sync rebuilds it.
    pub fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ActivityError::io(path, e)),
        };
        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(mut entry) => {
                entry.covered = window::normalize(entry.covered);
                Ok(Some(entry))
            }
            Err(e) => {
                warn!("ignoring corrupt cache file {}: {e}", path.display());
                Ok(None)
            }
        }
    }

    /// Write through a temporary file so readers never see a partial entry.
    pub fn save(&self, key: &CacheKey, entry: &CacheEntry) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| ActivityError::io(&self.dir, e))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(entry)?;
        fs::write(&tmp, json).map_err(|e| ActivityError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| ActivityError::io(&path, e))?;
        debug!(path = %path.display(), commits = entry.commits.len(), "cache saved");
        Ok(())
    }

    /// Returns whether an entry existed.
    pub fn remove(&self, key: &CacheKey) -> Result<bool> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ActivityError::io(path, e)),
        }
    }

    /// Every readable entry in the directory, sorted by repo then user.
    pub fn list(&self) -> Result<Vec<CacheEntry>> {
        let read = match fs::read_dir(&self.dir) {
            Ok(r) => r,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ActivityError::io(&self.dir, e)),
        };

        let mut out = Vec::new();
        for item in read {
            let path = match item {
                Ok(i) => i.path(),
                Err(e) => {
                    warn!("cannot read cache directory entry: {e}");
                    continue;
                }
            };
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).map_err(|e| e.to_string()));
            match parsed {
                Ok(entry) => out.push(entry),
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }
        out.sort_by(|a, b| {
            a.repo
                .to_string()
                .cmp(&b.repo.to_string())
                .then_with(|| a.user.cmp(&b.user))
        });
        Ok(out)
    }

    /// Remove every cache file; returns how many were deleted.
    pub fn clear_all(&self) -> Result<usize> {
        let read = match fs::read_dir(&self.dir) {
            Ok(r) => r,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(ActivityError::io(&self.dir, e)),
        };
        let mut removed = 0;
        for item in read.flatten() {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                fs::remove_file(&path).map_err(|e| ActivityError::io(&path, e))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Re-fetch the whole window even where it is already covered.
    pub refresh: bool,
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Requested window after clamping to now; `None` when it lay entirely in the future.
    pub window: Option<TimeRange>,
    /// Ranges that were actually requested from the source.
    pub fetched: Vec<TimeRange>,
    /// Commits not in the cache before this sync.
    pub new_commits: usize,
    /// Commits inside the window, newest first.
    pub commits: Vec<RemoteCommit>,
}

/// Bring the cache for `key` up to date over `requested` and return the
/// commits in it.
///
/// Only the gaps between already covered ranges are fetched. A fully covered
/// window touches neither the network nor the cache file. When a gap fails,
/// what was fetched before it is saved and the error is returned.
pub fn sync(
    store: &CacheStore,
    source: &dyn CommitSource,
    key: &CacheKey,
    requested: TimeRange,
    now: DateTime<Utc>,
    opts: &SyncOptions,
) -> Result<SyncReport> {
    let now = now.trunc_subsecs(0);
    let Some(window) = requested.whole_seconds().clamp_end(now) else {
        info!("window starts after now; nothing to fetch");
        return Ok(SyncReport {
            window: None,
            fetched: Vec::new(),
            new_commits: 0,
            commits: Vec::new(),
        });
    };

    let mut entry = store
        .load(key)?
        .unwrap_or_else(|| CacheEntry::empty(key, now));

    let todo = if opts.refresh {
        vec![window]
    } else {
        window::gaps(window, &entry.covered)
    };

    if todo.is_empty() {
        debug!(repo = %key.repo, user = %key.user, "window fully cached");
        return Ok(SyncReport {
            window: Some(window),
            fetched: Vec::new(),
            new_commits: 0,
            commits: entry.commits_in(window),
        });
    }

    // taken before a refresh drops the window's commits
    let known = entry.shas();
    if opts.refresh {
        entry.commits.retain(|c| !window.contains(c.committed_at));
    }

    let mut fetched = Vec::new();
    let mut added = HashSet::new();
    let mut failure = None;

    for gap in todo {
        info!(
            repo = %key.repo,
            user = %key.user,
            "fetching {} .. {}",
            gap.start.to_rfc3339(),
            gap.end.to_rfc3339()
        );
        match source.fetch(&key.repo, &key.user, gap) {
            Ok(batch) => {
                // the API may hand back commits just outside the bounds
                let batch: Vec<_> = batch
                    .into_iter()
                    .filter(|c| gap.contains(c.committed_at))
                    .collect();
                debug!(commits = batch.len(), "gap fetched");
                added.extend(
                    batch
                        .iter()
                        .filter(|c| !known.contains(&c.sha))
                        .map(|c| c.sha.clone()),
                );
                entry.merge(batch);
                entry.cover(gap);
                fetched.push(gap);
            }
            Err(e) => {
                warn!("fetch failed: {e}");
                failure = Some(e);
                break;
            }
        }
    }

    if !fetched.is_empty() {
        entry.updated_at = now;
        match (store.save(key, &entry), failure) {
            (Ok(()), None) => {}
            (Ok(()), Some(fetch_err)) => return Err(fetch_err),
            (Err(save_err), None) => return Err(save_err),
            (Err(save_err), Some(fetch_err)) => {
                warn!("could not save partial progress: {save_err}");
                return Err(fetch_err);
            }
        }
    } else if let Some(e) = failure {
        return Err(e);
    }

    Ok(SyncReport {
        window: Some(window),
        fetched,
        new_commits: added.len(),
        commits: entry.commits_in(window),
    })
}
