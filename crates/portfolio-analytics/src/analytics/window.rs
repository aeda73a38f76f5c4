use super::domain::Lease;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// Historical reporting window. Timestamps are absolute; callers normalize time zones.
///
/// Construction never fails: an inverted window (end before start) is kept as given and
/// measures zero days. Whether that is acceptable is a policy decision made by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window spanning whole calendar days from `start` 00:00 to `end` 00:00 (UTC).
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(day_start(start), day_start(end))
    }

    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    /// `ceil((end - start) / 1 day)`, or 0 for an inverted window.
    pub fn total_days(&self) -> i64 {
        days_between(self.start, self.end)
    }

    /// Whether `instant` lies inside `[start, end]`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        !self.is_inverted() && instant >= self.start && instant <= self.end
    }

    pub fn period(&self) -> ReportPeriod {
        ReportPeriod {
            start: self.start,
            end: self.end,
            total_days: self.total_days(),
        }
    }
}

/// Window echoed back on report records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_days: i64,
}

/// Whole days from `from` to `to`, rounded up; 0 when `to` is not after `from`.
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    ceil_days(to - from)
}

/// `span` in whole days, rounded up; 0 for a non-positive span.
pub fn ceil_days(span: Duration) -> i64 {
    let seconds = span.num_seconds();
    if seconds <= 0 {
        return 0;
    }
    (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}

pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Parses a window bound given as an RFC 3339 timestamp or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(day_start)
}

/// Half-open UTC interval a lease occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Coverage {
    /// `[start 00:00, (end + 1 day) 00:00)`. A lease ending before it starts covers nothing.
    pub fn of(lease: &Lease) -> Self {
        let start = day_start(lease.start_date);
        let end = lease
            .end_date
            .checked_add_signed(Duration::days(1))
            .map(day_start)
            .unwrap_or_else(|| day_start(lease.end_date));
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn clamp_to(&self, window: &ReportWindow) -> Self {
        let start = self.start.max(window.start);
        let end = self.end.min(window.end).max(start);
        Self { start, end }
    }
}

/// Lease date filter shared by the reconstructor and the ranking turnover estimate:
/// `lease.start <= window.end AND lease.end >= window.start`.
pub fn lease_intersects(lease: &Lease, window: &ReportWindow) -> bool {
    day_start(lease.start_date) <= window.end && day_start(lease.end_date) >= window.start
}

/// Whether the lease's end date falls inside the window.
pub fn lease_ends_within(lease: &Lease, window: &ReportWindow) -> bool {
    window.contains(day_start(lease.end_date))
}
