use chrono::{DateTime, Utc};
use serde::Serialize;

/// Marker emitted in place of a date when the timestamp field is unusable
pub const CORRUPT_TIMESTAMP_MARKER: &str = "[CORRUPT TIMESTAMP]";
pub const TRUNCATED_MARKER: &str = "[TRUNCATED MESSAGE]";
pub const EMPTY_MARKER: &str = "[EMPTY MESSAGE]";

/// Kind byte of a record header
///
/// The set is closed: any byte that does not map to a variant cannot start a
/// record, which is what the resynchronizer relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    Regular,
    Me,
    Ad,
    DiceRoll,
    Warning,
    /// No speaker; a single placeholder byte replaces the name length
    Headless,
    Announcement,
    /// End-of-log marker (0xFF, i.e. -1 as a signed byte)
    Eof,
}

impl RecordKind {
    pub fn to_byte(self) -> u8 {
        match self {
            RecordKind::Regular => 0,
            RecordKind::Me => 1,
            RecordKind::Ad => 2,
            RecordKind::DiceRoll => 3,
            RecordKind::Warning => 4,
            RecordKind::Headless => 5,
            RecordKind::Announcement => 6,
            RecordKind::Eof => 0xFF,
        }
    }

    pub fn has_speaker(self) -> bool {
        !matches!(self, RecordKind::Headless | RecordKind::Eof)
    }

    /// Token appended to the speaker name
    pub fn speaker_suffix(self) -> &'static str {
        match self {
            RecordKind::Regular => ":",
            RecordKind::Ad => " (ad):",
            RecordKind::Warning => " (warning):",
            RecordKind::Announcement => " (announcement):",
            RecordKind::Me | RecordKind::DiceRoll | RecordKind::Headless | RecordKind::Eof => "",
        }
    }
}

impl TryFrom<u8> for RecordKind {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(RecordKind::Regular),
            1 => Ok(RecordKind::Me),
            2 => Ok(RecordKind::Ad),
            3 => Ok(RecordKind::DiceRoll),
            4 => Ok(RecordKind::Warning),
            5 => Ok(RecordKind::Headless),
            6 => Ok(RecordKind::Announcement),
            0xFF => Ok(RecordKind::Eof),
            other => Err(other),
        }
    }
}

/// Damage detected while decoding a record
///
/// Flags compound; a record is intact only when none are raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Integrity {
    pub timestamp_corrupt: bool,
    pub body_truncated: bool,
    pub body_empty: bool,
}

impl Integrity {
    pub const INTACT: Integrity =
        Integrity { timestamp_corrupt: false, body_truncated: false, body_empty: false };

    pub fn is_intact(&self) -> bool {
        !(self.timestamp_corrupt || self.body_truncated || self.body_empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTimestamp {
    Valid(DateTime<Utc>),
    /// Raw field value that failed validation
    Corrupt(u32),
}

impl RecordTimestamp {
    /// Calendar time for range checks, if the raw value has one
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        match *self {
            RecordTimestamp::Valid(datetime) => Some(datetime),
            RecordTimestamp::Corrupt(raw) => DateTime::from_timestamp(i64::from(raw), 0),
        }
    }

    pub fn annotation(&self) -> String {
        match self {
            RecordTimestamp::Valid(datetime) => {
                format!("[{}]", datetime.format("%Y-%m-%d %H:%M:%S"))
            }
            RecordTimestamp::Corrupt(_) => CORRUPT_TIMESTAMP_MARKER.to_string(),
        }
    }
}

/// One decoded chat event
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: RecordTimestamp,
    pub kind: RecordKind,
    pub speaker: Option<String>,
    /// Sanitized body text
    pub body: String,
    pub integrity: Integrity,
    /// Bytes consumed from the source for this record
    pub byte_len: u64,
}

impl LogRecord {
    /// Speaker, suffix and body: the text phrase filters look at
    pub fn searchable_text(&self) -> String {
        let speaker =
            self.speaker.as_deref().map(|name| format!("{}{}", name, self.kind.speaker_suffix()));
        speaker
            .into_iter()
            .chain(Some(self.body.clone()))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Full output line, damage markers included
    pub fn render_line(&self) -> String {
        let mut parts = vec![self.timestamp.annotation()];
        let text = self.searchable_text();
        if !text.is_empty() {
            parts.push(text);
        }
        if self.integrity.body_truncated {
            parts.push(TRUNCATED_MARKER.to_string());
        }
        if self.integrity.body_empty {
            parts.push(EMPTY_MARKER.to_string());
        }
        parts.join(" ")
    }
}
