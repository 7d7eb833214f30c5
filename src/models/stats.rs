use serde::Serialize;

use crate::magnitude::MagnitudeCount;
use crate::models::record::Integrity;
use crate::utils::format_thousands;

/// Running totals for one recovery session
///
/// Byte totals are [`MagnitudeCount`]s; record totals are plain counters.
/// Damaged records are credited at decode time, intact ones by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub intact_bytes: MagnitudeCount,
    /// Intact bytes rejected by the date or phrase filter
    pub discarded_bytes: MagnitudeCount,
    pub truncated_bytes: MagnitudeCount,
    pub empty_bytes: MagnitudeCount,
    /// Bytes of records whose only damage is the timestamp
    pub corrupt_bytes: MagnitudeCount,
    /// Bytes that could not be attributed to any record
    pub gap_bytes: MagnitudeCount,

    pub intact_records: u64,
    pub discarded_records: u64,
    /// Record lines written to the destination, damaged ones included
    pub emitted_records: u64,
    pub truncated_records: u64,
    pub empty_records: u64,
    pub corrupt_timestamp_records: u64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intact bytes that passed the filters
    pub fn emitted_bytes(&self) -> MagnitudeCount {
        self.intact_bytes - self.discarded_bytes
    }

    pub fn record_gap(&mut self, bytes: u64) {
        if bytes > 0 {
            self.gap_bytes += bytes;
        }
    }

    /// Credits a damaged record to exactly one byte total and to each raised flag
    pub fn record_damage(&mut self, integrity: Integrity, bytes: u64) {
        if integrity.timestamp_corrupt {
            self.corrupt_timestamp_records += 1;
        }
        if integrity.body_truncated {
            self.truncated_records += 1;
        }
        if integrity.body_empty {
            self.empty_records += 1;
        }

        if integrity.body_truncated {
            self.truncated_bytes += bytes;
        } else if integrity.body_empty {
            self.empty_bytes += bytes;
        } else if integrity.timestamp_corrupt {
            self.corrupt_bytes += bytes;
        }
    }

    pub fn record_intact(&mut self, bytes: u64) {
        self.intact_records += 1;
        self.intact_bytes += bytes;
    }

    pub fn record_discarded(&mut self, bytes: u64) {
        self.discarded_records += 1;
        self.discarded_bytes += bytes;
    }

    /// Folds another session's totals into this one
    pub fn merge(&mut self, other: &Statistics) {
        self.intact_bytes += other.intact_bytes;
        self.discarded_bytes += other.discarded_bytes;
        self.truncated_bytes += other.truncated_bytes;
        self.empty_bytes += other.empty_bytes;
        self.corrupt_bytes += other.corrupt_bytes;
        self.gap_bytes += other.gap_bytes;

        self.intact_records += other.intact_records;
        self.discarded_records += other.discarded_records;
        self.emitted_records += other.emitted_records;
        self.truncated_records += other.truncated_records;
        self.empty_records += other.empty_records;
        self.corrupt_timestamp_records += other.corrupt_timestamp_records;
    }

    /// Human-readable report block
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!(
                "Intact:    {} ({} records)",
                self.intact_bytes,
                format_thousands(self.intact_records)
            ),
            format!(
                "Emitted:   {} ({} records)",
                self.emitted_bytes(),
                format_thousands(self.emitted_records)
            ),
            format!(
                "Discarded: {} ({} records)",
                self.discarded_bytes,
                format_thousands(self.discarded_records)
            ),
            format!(
                "Truncated: {} ({} records)",
                self.truncated_bytes,
                format_thousands(self.truncated_records)
            ),
            format!("Empty:     {} ({} records)", self.empty_bytes, format_thousands(self.empty_records)),
            format!(
                "Corrupt timestamps: {} records ({} timestamp-only)",
                format_thousands(self.corrupt_timestamp_records),
                self.corrupt_bytes
            ),
            format!("Unreadable: {}", self.gap_bytes),
        ]
    }
}
