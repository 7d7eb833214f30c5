use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{RecoveryError, Result};

/// Inclusive date range; either bound may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Builds a range, swapping the bounds when given in reverse order
    pub fn new(after: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> Self {
        match (after, before) {
            (Some(a), Some(b)) if a > b => Self { after: Some(b), before: Some(a) },
            _ => Self { after, before },
        }
    }

    /// Range covering whole days: from the start of `after` to the end of `before`
    pub fn from_dates(after: Option<NaiveDate>, before: Option<NaiveDate>) -> Self {
        let (after, before) = match (after, before) {
            (Some(a), Some(b)) if a > b => (Some(b), Some(a)),
            other => other,
        };
        Self::new(
            after.map(|date| date.and_time(NaiveTime::MIN).and_utc()),
            before.map(|date| date.and_hms_opt(23, 59, 59).expect("Valid time").and_utc()),
        )
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.after.is_none() && self.before.is_none()
    }

    pub fn after(&self) -> Option<DateTime<Utc>> {
        self.after
    }

    pub fn before(&self) -> Option<DateTime<Utc>> {
        self.before
    }

    /// Whether `timestamp` lies in the range
    ///
    /// A missing timestamp only passes an unbounded range.
    pub fn contains(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        let Some(timestamp) = timestamp else {
            return self.is_unbounded();
        };
        self.after.is_none_or(|after| timestamp >= after)
            && self.before.is_none_or(|before| timestamp <= before)
    }
}

/// Parses a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| RecoveryError::InvalidDate { value: value.to_string() })
}
