use comfy_table::{presets::UTF8_HORIZONTAL_ONLY, Table};

use crate::domain::cache::CacheEntry;
use crate::domain::git::BranchInfo;
use crate::domain::github::RemoteCommit;
use crate::domain::stats::CommitStats;
use crate::presentation::report::PageSummary;
use crate::utils::{fmt_date, fmt_utc};

fn table(header: Vec<&str>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_HORIZONTAL_ONLY).set_header(header);
    t
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Top `n` authors.
pub fn author_stats(stats: &CommitStats, desc: bool, n: usize) -> String {
    let mut t = table(vec!["Author", "Email", "Commits", "+", "-", "First", "Last"]);
    for (email, m) in stats.sorted(desc).into_iter().take(n) {
        t.add_row(vec![
            m.name.clone(),
            email.clone(),
            m.count.to_string(),
            m.additions.to_string(),
            m.deletions.to_string(),
            fmt_date(&m.first),
            fmt_date(&m.last),
        ]);
    }
    t.to_string()
}

pub fn pages(pages: &[PageSummary]) -> String {
    let mut t = table(vec!["Page", "File", "Commits", "Oldest", "Newest"]);
    for p in pages {
        t.add_row(vec![
            p.number.to_string(),
            p.file.clone(),
            p.commits.to_string(),
            p.oldest.clone().unwrap_or_else(|| "-".into()),
            p.newest.clone().unwrap_or_else(|| "-".into()),
        ]);
    }
    t.to_string()
}

pub fn branches(branches: &[BranchInfo]) -> String {
    let mut t = table(vec!["", "Branch", "Tip", "Date"]);
    for b in branches {
        t.add_row(vec![
            if b.is_head { "*" } else { "" }.to_string(),
            b.name.clone(),
            b.tip[..7.min(b.tip.len())].to_string(),
            fmt_date(&b.tip_time),
        ]);
    }
    t.to_string()
}

pub fn remote_commits(commits: &[RemoteCommit]) -> String {
    let mut t = table(vec!["SHA", "Date", "Author", "Subject"]);
    for c in commits {
        t.add_row(vec![
            c.short_sha().to_string(),
            fmt_date(&c.committed_at),
            c.author_login.clone().unwrap_or_else(|| c.author_name.clone()),
            truncate(c.subject(), 72),
        ]);
    }
    t.to_string()
}

pub fn cache_entries(entries: &[CacheEntry]) -> String {
    let mut t = table(vec!["Repository", "User", "Commits", "Covered", "Updated"]);
    for e in entries {
        let covered = if e.covered.is_empty() {
            "-".to_string()
        } else {
            e.covered
                .iter()
                .map(|r| format!("{} .. {}", fmt_date(&r.start), fmt_date(&r.end)))
                .collect::<Vec<_>>()
                .join("\n")
        };
        t.add_row(vec![
            e.repo.to_string(),
            e.user.clone(),
            e.commits.len().to_string(),
            covered,
            fmt_utc(&e.updated_at),
        ]);
    }
    t.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
