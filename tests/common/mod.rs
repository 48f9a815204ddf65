//! Throwaway git repositories built directly through git2, so commit times
//! and identities are fully deterministic.

#![allow(dead_code)]

use std::path::Path;

use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

/// 2024-01-01T00:00:00Z
pub const BASE: i64 = 1_704_067_200;
pub const DAY: i64 = 86_400;

pub struct Who {
    pub name: &'static str,
    pub email: &'static str,
}

pub const ALICE: Who = Who {
    name: "Alice Example",
    email: "alice@example.com",
};
pub const BOB: Who = Who {
    name: "Bob Builder",
    email: "bob@corp.example",
};

pub struct TestRepo {
    pub repo: Repository,
    pub dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = Repository::init(dir.path()).expect("init repo");
        Self { repo, dir }
    }

    /// New branch pointing at the current tip of `main`.
    pub fn branch(&self, name: &str) {
        let tip = self
            .repo
            .find_reference("refs/heads/main")
            .and_then(|r| r.peel_to_commit())
            .expect("main exists");
        self.repo.branch(name, &tip, false).expect("create branch");
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit `files` (name, content; `None` deletes) on top of `branch`,
    /// creating the branch if needed. HEAD follows `main`.
    pub fn commit_on(
        &self,
        branch: &str,
        files: &[(&str, Option<&[u8]>)],
        message: &str,
        who: &Who,
        at: i64,
    ) -> Oid {
        let refname = format!("refs/heads/{branch}");
        let parent = self
            .repo
            .find_reference(&refname)
            .ok()
            .and_then(|r| r.peel_to_commit().ok());
        self.commit_with_parents(&refname, parent.into_iter().collect(), files, message, who, at)
    }

    pub fn commit(&self, files: &[(&str, &str)], message: &str, who: &Who, at: i64) -> Oid {
        let files: Vec<(&str, Option<&[u8]>)> = files
            .iter()
            .map(|(name, body)| (*name, Some(body.as_bytes())))
            .collect();
        self.commit_on("main", &files, message, who, at)
    }

    /// Merge commit on `main` whose second parent is the tip of `other`.
    pub fn merge(
        &self,
        other: &str,
        files: &[(&str, Option<&[u8]>)],
        message: &str,
        who: &Who,
        at: i64,
    ) -> Oid {
        let main = self
            .repo
            .find_reference("refs/heads/main")
            .and_then(|r| r.peel_to_commit())
            .expect("main exists");
        let theirs = self
            .repo
            .find_reference(&format!("refs/heads/{other}"))
            .and_then(|r| r.peel_to_commit())
            .expect("branch exists");
        self.commit_with_parents("refs/heads/main", vec![main, theirs], files, message, who, at)
    }

    fn commit_with_parents(
        &self,
        refname: &str,
        parents: Vec<git2::Commit<'_>>,
        files: &[(&str, Option<&[u8]>)],
        message: &str,
        who: &Who,
        at: i64,
    ) -> Oid {
        let base_tree = parents.first().map(|p| p.tree().expect("parent tree"));
        let mut builder = self.repo.treebuilder(base_tree.as_ref()).expect("treebuilder");
        for (name, body) in files {
            match body {
                Some(bytes) => {
                    let blob = self.repo.blob(bytes).expect("write blob");
                    builder.insert(name, blob, 0o100644).expect("insert blob");
                }
                None => {
                    builder.remove(name).expect("remove entry");
                }
            }
        }
        let tree_id = builder.write().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");

        let sig = Signature::new(who.name, who.email, &Time::new(at, 0)).expect("signature");
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
        let oid = self
            .repo
            .commit(Some(refname), &sig, &sig, message, &tree, &parent_refs)
            .expect("commit");
        if refname == "refs/heads/main" {
            self.repo.set_head("refs/heads/main").expect("set HEAD");
        }
        oid
    }
}

/// Newest first, all reachable from `main`:
///
/// | day | author | subject        |
/// |-----|--------|----------------|
/// | 5   | Alice  | Merge feature  |
/// | 4   | Alice  | Notes          |
/// | 3   | Bob    | Drop b         |
/// | 2+  | Bob    | Feature work   | (on `feature`, one hour after "Extend readme")
/// | 2   | Alice  | Extend readme  |
/// | 1   | Bob    | Add lib        |
/// | 0   | Alice  | Initial commit |
pub fn sample_repo() -> TestRepo {
    let t = TestRepo::new();
    t.commit(&[("README.md", "hello\n")], "Initial commit", &ALICE, BASE);
    t.commit(
        &[("lib.rs", "fn a() {}\nfn b() {}\n")],
        "Add lib\n\nWith two functions.",
        &BOB,
        BASE + DAY,
    );
    t.commit(&[("README.md", "hello\nworld\n")], "Extend readme", &ALICE, BASE + 2 * DAY);
    t.branch("feature");
    t.commit_on(
        "feature",
        &[("feature.rs", Some(b"pub fn f() {}\n".as_slice()))],
        "Feature work",
        &BOB,
        BASE + 2 * DAY + 3600,
    );
    t.commit(&[("lib.rs", "fn a() {}\n")], "Drop b", &BOB, BASE + 3 * DAY);
    t.commit(&[("notes.txt", "n\n")], "Notes", &ALICE, BASE + 4 * DAY);
    t.merge(
        "feature",
        &[("feature.rs", Some(b"pub fn f() {}\n".as_slice()))],
        "Merge feature",
        &ALICE,
        BASE + 5 * DAY,
    );
    t
}
