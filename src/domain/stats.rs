use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

use crate::domain::history::CommitRecord;

#[derive(Debug, Clone)]
pub struct AuthorMeta {
    pub name: String,
    pub count: usize,
    pub additions: usize,
    pub deletions: usize,
    pub first: DateTime<FixedOffset>,
    pub last: DateTime<FixedOffset>,
}

/// Per-author totals keyed by email.
#[derive(Debug, Clone, Default)]
pub struct CommitStats {
    pub total_seen: usize,
    pub data: HashMap<String, AuthorMeta>,
}

impl CommitStats {
    pub fn from_records(records: &[CommitRecord]) -> Self {
        let mut data = HashMap::<String, AuthorMeta>::new();

        for r in records {
            let dt = r.timestamp;
            let (adds, dels) = r
                .changes
                .as_ref()
                .map_or((0, 0), |c| (c.additions, c.deletions));

            let e = data.entry(r.email.clone()).or_insert(AuthorMeta {
                name: r.author.clone(),
                count: 0,
                additions: 0,
                deletions: 0,
                first: dt,
                last: dt,
            });
            e.count += 1;
            e.additions += adds;
            e.deletions += dels;
            if dt < e.first {
                e.first = dt;
            }
            if dt > e.last {
                e.last = dt;
                // the newest name wins when an author renames themselves
                e.name = r.author.clone();
            }
        }

        CommitStats {
            total_seen: records.len(),
            data,
        }
    }

    /// Entries ordered by commit count, ties broken by email.
    pub fn sorted(&self, desc: bool) -> Vec<(&String, &AuthorMeta)> {
        let mut v: Vec<_> = self.data.iter().collect();
        v.sort_by(|a, b| {
            let by_count = if desc {
                b.1.count.cmp(&a.1.count)
            } else {
                a.1.count.cmp(&b.1.count)
            };
            by_count.then_with(|| a.0.cmp(b.0))
        });
        v
    }
}
