//! Inclusive time ranges and the set operations the commit cache needs.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ActivityError, Result};

/// Closed interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(ActivityError::InvalidRange {
                since: start,
                until: end,
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }

    /// Both bounds truncated to whole seconds, the resolution ranges are
    /// compared at.
    pub fn whole_seconds(self) -> Self {
        Self {
            start: self.start.trunc_subsecs(0),
            end: self.end.trunc_subsecs(0),
        }
    }

    /// Cut the end back to `limit`; `None` when the whole range lies after it.
    pub fn clamp_end(&self, limit: DateTime<Utc>) -> Option<Self> {
        if self.start > limit {
            None
        } else {
            Some(Self {
                start: self.start,
                end: self.end.min(limit),
            })
        }
    }
}

// GitHub timestamps have one-second resolution, so ranges one second apart
// leave nothing uncovered between them.
fn touches(a_end: DateTime<Utc>, b_start: DateTime<Utc>) -> bool {
    b_start <= a_end + Duration::seconds(1)
}

/// Sort and coalesce overlapping or touching ranges.
pub fn normalize(mut ranges: Vec<TimeRange>) -> Vec<TimeRange> {
    ranges.sort_by_key(|r| r.start);
    let mut out: Vec<TimeRange> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match out.last_mut() {
            Some(last) if touches(last.end, r.start) => last.end = last.end.max(r.end),
            _ => out.push(r),
        }
    }
    out
}

/// Parts of `window` not covered by `covered` (which must be normalized).
pub fn gaps(window: TimeRange, covered: &[TimeRange]) -> Vec<TimeRange> {
    let mut out = Vec::new();
    let mut cursor = window.start;

    for c in covered {
        if c.end < cursor {
            continue;
        }
        if c.start > window.end {
            break;
        }
        let end = (c.start - Duration::seconds(1)).min(window.end);
        // less than a second uncovered is not a gap
        if c.start > cursor && end >= cursor {
            out.push(TimeRange { start: cursor, end });
        }
        if c.end >= window.end {
            return out;
        }
        cursor = cursor.max(c.end + Duration::seconds(1));
    }

    if cursor <= window.end {
        out.push(TimeRange {
            start: cursor,
            end: window.end,
        });
    }
    out
}

pub fn covers(covered: &[TimeRange], window: TimeRange) -> bool {
    gaps(window, covered).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn r(a: u32, b: u32) -> TimeRange {
        TimeRange::new(t(a), t(b)).unwrap()
    }

    #[test]
    fn new_rejects_inverted() {
        assert!(TimeRange::new(t(2), t(1)).is_err());
        assert!(TimeRange::new(t(1), t(1)).is_ok());
    }

    #[test]
    fn normalize_merges_overlapping_and_sorts() {
        let merged = normalize(vec![r(10, 12), r(1, 3), r(2, 5), r(11, 20)]);
        assert_eq!(merged, vec![r(1, 5), r(10, 20)]);
    }

    #[test]
    fn normalize_merges_ranges_one_second_apart() {
        let a = TimeRange::new(t(1), t(2)).unwrap();
        let b = TimeRange::new(t(2) + Duration::seconds(1), t(3)).unwrap();
        assert_eq!(normalize(vec![b, a]), vec![r(1, 3)]);
    }

    #[test]
    fn gaps_with_nothing_covered_is_the_window() {
        assert_eq!(gaps(r(1, 10), &[]), vec![r(1, 10)]);
    }

    #[test]
    fn gaps_at_both_ends() {
        let g = gaps(r(1, 20), &[r(5, 10)]);
        assert_eq!(
            g,
            vec![
                TimeRange { start: t(1), end: t(5) - Duration::seconds(1) },
                TimeRange { start: t(10) + Duration::seconds(1), end: t(20) },
            ]
        );
    }

    #[test]
    fn gaps_in_the_middle() {
        let g = gaps(r(1, 20), &[r(1, 5), r(10, 20)]);
        assert_eq!(
            g,
            vec![TimeRange {
                start: t(5) + Duration::seconds(1),
                end: t(10) - Duration::seconds(1)
            }]
        );
    }

    #[test]
    fn fully_covered_window_has_no_gaps() {
        assert!(covers(&[r(1, 30)], r(5, 10)));
        assert!(gaps(r(5, 10), &[r(1, 30)]).is_empty());
    }

    #[test]
    fn covered_ranges_outside_window_are_ignored() {
        assert_eq!(gaps(r(10, 12), &[r(1, 3), r(20, 25)]), vec![r(10, 12)]);
    }

    #[test]
    fn sub_second_sliver_is_not_a_gap() {
        let window = r(1, 2);
        let covered = [TimeRange {
            start: t(1) + Duration::milliseconds(500),
            end: t(2),
        }];
        assert!(gaps(window, &covered).is_empty());
    }

    #[test]
    fn whole_seconds_truncates_both_ends() {
        let r = TimeRange {
            start: t(1) + Duration::milliseconds(700),
            end: t(2) + Duration::milliseconds(200),
        };
        assert_eq!(r.whole_seconds(), TimeRange { start: t(1), end: t(2) });
    }

    #[test]
    fn clamp_end() {
        assert_eq!(r(1, 10).clamp_end(t(5)), Some(r(1, 5)));
        assert_eq!(r(1, 10).clamp_end(t(20)), Some(r(1, 10)));
        assert_eq!(r(6, 10).clamp_end(t(5)), None);
    }
}
