use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc,
};

use crate::error::{ActivityError, Result};

/// Which end of a window a date argument describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

pub fn fmt_date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%Y-%m-%d").to_string()
}

/// `git log` style timestamp, keeping the commit's own offset.
pub fn fmt_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S %z").to_string()
}

pub fn fmt_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse a date argument relative to `now`.
///
/// Accepts RFC 3339, a plain `YYYY-MM-DD` (local start or end of day
/// depending on `bound`) and `<N>d` for N days before `now`.
pub fn parse_date_at(input: &str, bound: Bound, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let s = input.trim();
    let invalid = || ActivityError::InvalidDate(input.to_string());

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(days) = s.strip_suffix('d') {
        let days: i64 = days.parse().map_err(|_| invalid())?;
        if days < 0 {
            return Err(invalid());
        }
        return Ok(now - Duration::days(days));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_opt(23, 59, 59).ok_or_else(invalid)?,
    };
    Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(invalid)
}

pub fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    parse_date_at(input, Bound::Start, Utc::now())
}

pub fn parse_until(input: &str) -> Result<DateTime<Utc>> {
    parse_date_at(input, Bound::End, Utc::now())
}

/// Reject windows whose start lies after their end.
pub fn check_range(since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Result<()> {
    match (since, until) {
        (Some(since), Some(until)) if since > until => {
            Err(ActivityError::InvalidRange { since, until })
        }
        _ => Ok(()),
    }
}
