use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::filters::{DateRange, PhraseFilter, RecordFilter};

/// Everything a recovery run needs besides its source and destination
#[derive(Debug, Clone, Default)]
pub struct RecoveryOptions {
    pub filter: RecordFilter,
    /// Timestamps after this instant are treated as corrupt; defaults to now
    pub reference_time: Option<DateTime<Utc>>,
}

impl RecoveryOptions {
    /// Builds options from user input, compiling the phrase filter
    ///
    /// # Errors
    ///
    /// Returns an error if `use_pattern` is set and `phrase` is not a valid pattern.
    pub fn new(
        after: Option<NaiveDate>,
        before: Option<NaiveDate>,
        phrase: &str,
        use_pattern: bool,
        retain_damaged: bool,
    ) -> Result<Self> {
        let filter = RecordFilter::new(
            DateRange::from_dates(after, before),
            PhraseFilter::new(phrase, use_pattern)?,
            retain_damaged,
        );
        Ok(Self { filter, reference_time: None })
    }

    pub fn with_reference_time(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    pub fn with_retain_damaged(mut self, retain_damaged: bool) -> Self {
        self.filter.retain_damaged = retain_damaged;
        self
    }

    pub(crate) fn resolved_reference_time(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}
