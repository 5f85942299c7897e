//! Common types used across the service

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Limit/offset pagination as sent by the client
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageRequest {
    /// Resolve to a concrete `(limit, offset)`, clamping the limit to
    /// `1..=max_limit` and the offset to non-negative values.
    pub fn resolve(&self, default_limit: i64, max_limit: i64) -> (i64, i64) {
        let limit = self.limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            data,
            total,
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, &'static str> {
        if start > end {
            return Err("Start date must not be after end date");
        }
        Ok(Self { start, end })
    }

    /// Half-open UTC instants `[start of first day, start of day after last)`
    /// with day boundaries taken in `tz`.
    pub fn to_utc_bounds<Tz: TimeZone>(&self, tz: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (from, _) = day_bounds(tz, self.start)?;
        let (_, to) = day_bounds(tz, self.end)?;
        Some((from, to))
    }
}

/// UTC instants bounding the calendar day `date` in `tz`
pub fn day_bounds<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let next = date.checked_add_days(Days::new(1))?;
    let start = tz
        .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .earliest()?;
    let end = tz
        .from_local_datetime(&next.and_hms_opt(0, 0, 0)?)
        .earliest()?;
    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_page_defaults_and_clamp() {
        let page = PageRequest::default();
        assert_eq!(page.resolve(50, 200), (50, 0));

        let page = PageRequest {
            limit: Some(10_000),
            offset: Some(-4),
        };
        assert_eq!(page.resolve(50, 200), (200, 0));

        let page = PageRequest {
            limit: Some(0),
            offset: Some(20),
        };
        assert_eq!(page.resolve(50, 200), (1, 20));
    }

    #[test]
    fn test_has_more() {
        let page: PaginatedResponse<u8> = PaginatedResponse::new(vec![1, 2], 5, 2, 2);
        assert!(page.has_more);
        let page: PaginatedResponse<u8> = PaginatedResponse::new(vec![1], 5, 2, 4);
        assert!(!page.has_more);
    }

    #[test]
    fn test_has_more_with_huge_offset() {
        let (limit, offset) = PageRequest {
            limit: None,
            offset: Some(i64::MAX),
        }
        .resolve(50, 500);
        assert_eq!(offset, i64::MAX);

        let page: PaginatedResponse<u8> = PaginatedResponse::new(vec![], 10, limit, offset);
        assert!(!page.has_more);
    }

    #[test]
    fn test_range_rejects_inverted() {
        let a = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(DateRange::new(a, b).is_err());
        assert!(DateRange::new(b, a).is_ok());
        assert!(DateRange::new(a, a).is_ok());
    }

    #[test]
    fn test_single_day_range_spans_whole_day() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let range = DateRange::new(day, day).unwrap();
        let (from, to) = range.to_utc_bounds(&Utc).unwrap();
        assert_eq!(to - from, chrono::Duration::hours(24));
        assert_eq!(from.to_rfc3339(), "2024-05-01T00:00:00+00:00");
    }

    #[test]
    fn test_bounds_follow_timezone() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let (from, _) = day_bounds(&tz, day).unwrap();
        assert_eq!(from.to_rfc3339(), "2024-05-01T05:00:00+00:00");
    }
}
