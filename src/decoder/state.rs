use chrono::{DateTime, Utc};

use crate::models::RecordTimestamp;

/// Per-source decoding state
///
/// Owned by one decoder; nothing here is shared between sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeState {
    /// Offset of the last record boundary the resynchronizer accepted
    pub last_good_offset: u64,
    /// Gap bytes not yet reported in the output
    pub pending_gap_bytes: u64,
    /// Latest accepted timestamp; timestamps below it are corrupt
    pub last_seen_timestamp: u32,
    /// Timestamps after this instant are corrupt
    pub reference_time: u32,
}

impl DecodeState {
    pub fn new(reference_time: DateTime<Utc>) -> Self {
        let reference_time = u32::try_from(reference_time.timestamp().max(0)).unwrap_or(u32::MAX);
        Self { last_good_offset: 0, pending_gap_bytes: 0, last_seen_timestamp: 0, reference_time }
    }

    /// Validates a raw timestamp field and advances `last_seen_timestamp`
    ///
    /// A rejected value that is nonzero and not in the future still becomes
    /// the new watermark, so one bad record does not poison the rest of a log
    /// that jumped backwards.
    pub fn check_timestamp(&mut self, raw: u32) -> RecordTimestamp {
        let in_past = raw != 0 && raw <= self.reference_time;
        let datetime = DateTime::from_timestamp(i64::from(raw), 0);

        match datetime {
            Some(datetime) if in_past && raw >= self.last_seen_timestamp => {
                self.last_seen_timestamp = raw;
                RecordTimestamp::Valid(datetime)
            }
            _ => {
                if in_past {
                    self.last_seen_timestamp = raw;
                }
                RecordTimestamp::Corrupt(raw)
            }
        }
    }

    pub fn add_gap(&mut self, bytes: u64) {
        self.pending_gap_bytes += bytes;
    }

    /// Removes `bytes` from the pending gap after they were reported
    pub fn release_gap(&mut self, bytes: u64) {
        self.pending_gap_bytes = self.pending_gap_bytes.saturating_sub(bytes);
    }
}
