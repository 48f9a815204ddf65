use chrono::{DateTime, FixedOffset};

use crate::config::OutputFormat;
use crate::domain::history::CommitRecord;
use crate::error::{ActivityError, Result};

/// One slice of the exported history.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    /// 1-based
    pub number: usize,
    pub total_pages: usize,
    /// 0-based index of the first commit in the whole history.
    pub first_index: usize,
    pub total_commits: usize,
    pub commits: &'a [CommitRecord],
}

impl Page<'_> {
    /// 1-based, inclusive range of commit positions on this page.
    pub fn span(&self) -> (usize, usize) {
        (self.first_index + 1, self.first_index + self.commits.len())
    }

    /// Oldest and newest author dates on the page.
    pub fn date_span(&self) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let oldest = self.commits.iter().map(|c| c.timestamp).min()?;
        let newest = self.commits.iter().map(|c| c.timestamp).max()?;
        Some((oldest, newest))
    }
}

pub fn paginate(records: &[CommitRecord], page_size: usize) -> Result<Vec<Page<'_>>> {
    if page_size == 0 {
        return Err(ActivityError::InvalidPageSize);
    }
    let total_pages = records.len().div_ceil(page_size);
    Ok(records
        .chunks(page_size)
        .enumerate()
        .map(|(i, commits)| Page {
            number: i + 1,
            total_pages,
            first_index: i * page_size,
            total_commits: records.len(),
            commits,
        })
        .collect())
}

pub fn page_file_name(prefix: &str, number: usize, ext: &str) -> String {
    format!("{prefix}-page-{number:04}.{ext}")
}

/// True for names `page_file_name` produces with this prefix, in either
/// output format.
pub fn is_page_file(prefix: &str, file_name: &str) -> bool {
    let Some(rest) = file_name.strip_prefix(prefix).and_then(|r| r.strip_prefix("-page-")) else {
        return false;
    };
    match rest.split_once('.') {
        Some((digits, ext)) => {
            !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit())
                && [OutputFormat::Text, OutputFormat::Json]
                    .iter()
                    .any(|f| f.extension() == ext)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn records(n: usize) -> Vec<CommitRecord> {
        (0..n)
            .map(|i| CommitRecord {
                sha: format!("{i:040}"),
                author: "A".into(),
                email: "a@example.com".into(),
                timestamp: FixedOffset::east_opt(0)
                    .unwrap()
                    .timestamp_opt(1_700_000_000 - i as i64 * 60, 0)
                    .unwrap(),
                subject: format!("commit {i}"),
                body: String::new(),
                parents: vec![],
                changes: None,
            })
            .collect()
    }

    #[test]
    fn last_page_holds_the_remainder() {
        let r = records(7);
        let pages = paginate(&r, 3).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].span(), (1, 3));
        assert_eq!(pages[2].span(), (7, 7));
        assert!(pages.iter().all(|p| p.total_pages == 3 && p.total_commits == 7));
    }

    #[test]
    fn empty_history_has_no_pages() {
        assert!(paginate(&[], 10).unwrap().is_empty());
    }

    #[test]
    fn zero_page_size_is_an_error() {
        assert!(matches!(paginate(&records(1), 0), Err(ActivityError::InvalidPageSize)));
    }

    #[test]
    fn date_span_orders_oldest_first() {
        let r = records(3);
        let pages = paginate(&r, 10).unwrap();
        let (oldest, newest) = pages[0].date_span().unwrap();
        assert_eq!(oldest, r[2].timestamp);
        assert_eq!(newest, r[0].timestamp);
    }

    #[test]
    fn page_file_names() {
        assert_eq!(page_file_name("commits", 12, "txt"), "commits-page-0012.txt");
        assert!(is_page_file("commits", "commits-page-0012.txt"));
        assert!(is_page_file("commits", "commits-page-3.json"));
        assert!(!is_page_file("commits", "commits-index.txt"));
        assert!(!is_page_file("commits", "other-page-0001.txt"));
        assert!(!is_page_file("commits", "commits-page-x1.txt"));
        assert!(!is_page_file("commits", "commits-page-0001.txt.bak"));
        assert!(!is_page_file("commits", "commits-page-0001.md"));
    }
}
