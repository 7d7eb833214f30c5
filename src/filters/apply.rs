use super::phrase::PhraseFilter;
use super::range::DateRange;
use crate::models::{LogRecord, Statistics};

/// What happens to a decoded record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Written to the destination
    Emit,
    /// Intact but rejected by the date or phrase filter
    Discard,
    /// Damaged and not retained
    Drop,
}

/// Date and phrase predicates plus the damaged-record policy
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub range: DateRange,
    pub phrase: PhraseFilter,
    /// Emit damaged records (with their markers) when they pass the predicates
    pub retain_damaged: bool,
}

impl RecordFilter {
    pub fn new(range: DateRange, phrase: PhraseFilter, retain_damaged: bool) -> Self {
        Self { range, phrase, retain_damaged }
    }

    /// Whether the record passes both the date range and the phrase filter
    pub fn selects(&self, record: &LogRecord) -> bool {
        self.range.contains(record.timestamp.datetime())
            && self.phrase.matches(&record.searchable_text())
    }

    /// Decides emission and credits intact and discarded totals
    ///
    /// Damaged records were already credited by the decoder, so only intact
    /// records touch `stats` here.
    pub fn apply(&self, record: &LogRecord, stats: &mut Statistics) -> Decision {
        let selected = self.selects(record);

        if record.integrity.is_intact() {
            stats.record_intact(record.byte_len);
            if selected {
                Decision::Emit
            } else {
                stats.record_discarded(record.byte_len);
                Decision::Discard
            }
        } else if self.retain_damaged && selected {
            Decision::Emit
        } else {
            Decision::Drop
        }
    }
}
