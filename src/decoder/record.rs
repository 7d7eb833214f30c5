use std::io::{self, Read};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::cursor::ByteCursor;
use super::resync::{ResyncOutcome, resynchronize};
use super::state::DecodeState;
use crate::models::{Integrity, LogRecord, RecordKind, RecordTimestamp, Statistics};

/// Result of one decode attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Record(LogRecord),
    /// Header carried the `Eof` kind; its bytes are not counted as a gap
    EndMarker { bytes: u64 },
    /// Header kind was not a known kind; its bytes are counted as a gap
    Unreadable { bytes: u64, kind_byte: Option<u8> },
    /// Fewer than four bytes were left for a timestamp
    EndOfStream,
}

/// Decodes records from one source, resynchronizing after every attempt
pub struct RecordDecoder<R> {
    cursor: ByteCursor<R>,
    state: DecodeState,
}

impl<R: Read> RecordDecoder<R> {
    /// `reference_time` is the latest instant a valid timestamp may carry
    pub fn new(reader: R, reference_time: DateTime<Utc>) -> Self {
        Self { cursor: ByteCursor::new(reader), state: DecodeState::new(reference_time) }
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn state(&self) -> &DecodeState {
        &self.state
    }

    /// Gap bytes not yet reported in the output
    pub fn pending_gap(&self) -> u64 {
        self.state.pending_gap_bytes
    }

    /// Marks `bytes` of the pending gap as reported
    pub fn release_gap(&mut self, bytes: u64) {
        self.state.release_gap(bytes);
    }

    /// Decodes the next record and then resynchronizes to the following header
    ///
    /// Damaged records are credited to `stats` here; gap bytes found along the
    /// way are added both to `stats` and to the pending gap.
    pub fn next_record(&mut self, stats: &mut Statistics) -> io::Result<Decoded> {
        let start = self.cursor.position();
        let decoded = self.decode_attempt()?;
        let consumed = self.cursor.position() - start;

        match &decoded {
            Decoded::EndOfStream => {
                self.credit_gap(consumed, stats);
                return Ok(decoded);
            }
            Decoded::Unreadable { kind_byte, .. } => {
                debug!(offset = start, ?kind_byte, "header with unknown kind");
                self.credit_gap(consumed, stats);
            }
            Decoded::Record(record) if !record.integrity.is_intact() => {
                debug!(offset = start, integrity = ?record.integrity, "damaged record");
                stats.record_damage(record.integrity, record.byte_len);
            }
            Decoded::Record(_) | Decoded::EndMarker { .. } => {}
        }

        let ResyncOutcome { skipped, boundary } = resynchronize(&mut self.cursor)?;
        self.credit_gap(skipped, stats);
        if let Some(boundary) = boundary {
            self.state.last_good_offset = boundary;
        }

        Ok(decoded)
    }

    fn credit_gap(&mut self, bytes: u64, stats: &mut Statistics) {
        self.state.add_gap(bytes);
        stats.record_gap(bytes);
    }

    fn decode_attempt(&mut self) -> io::Result<Decoded> {
        let start = self.cursor.position();

        let Some(raw_timestamp) = self.read_u32()? else {
            return Ok(Decoded::EndOfStream);
        };

        let kind_byte = self.cursor.take(1)?.first().copied();
        let kind = match kind_byte.map(RecordKind::try_from) {
            Some(Ok(RecordKind::Eof)) => {
                return Ok(Decoded::EndMarker { bytes: self.cursor.position() - start });
            }
            Some(Ok(kind)) => kind,
            Some(Err(_)) | None => {
                return Ok(Decoded::Unreadable {
                    bytes: self.cursor.position() - start,
                    kind_byte,
                });
            }
        };

        let timestamp = self.state.check_timestamp(raw_timestamp);
        let mut integrity = Integrity {
            timestamp_corrupt: matches!(timestamp, RecordTimestamp::Corrupt(_)),
            ..Integrity::INTACT
        };

        let speaker = if kind.has_speaker() {
            self.read_speaker(&mut integrity)?
        } else {
            // Headless records carry a placeholder where the name length would be
            self.cursor.skip(1)?;
            None
        };

        let body = self.read_body(&mut integrity)?;
        let byte_len = self.cursor.position() - start;
        trace!(offset = start, ?kind, byte_len, "decoded record");

        Ok(Decoded::Record(LogRecord { timestamp, kind, speaker, body, integrity, byte_len }))
    }

    fn read_speaker(&mut self, integrity: &mut Integrity) -> io::Result<Option<String>> {
        let Some(&name_len) = self.cursor.take(1)?.first() else {
            integrity.body_truncated = true;
            return Ok(None);
        };

        let name = self.cursor.take(usize::from(name_len))?;
        if name.len() < usize::from(name_len) {
            integrity.body_truncated = true;
        }
        Ok(Some(String::from_utf8_lossy(&name).into_owned()))
    }

    fn read_body(&mut self, integrity: &mut Integrity) -> io::Result<String> {
        let Some(body_len) = self.read_u16()? else {
            integrity.body_empty = true;
            return Ok(String::new());
        };
        if body_len == 0 {
            integrity.body_empty = true;
            return Ok(String::new());
        }

        let body = self.cursor.take(usize::from(body_len))?;
        if body.len() < usize::from(body_len) {
            integrity.body_truncated = true;
        }
        Ok(sanitize_text(&body))
    }

    fn read_u32(&mut self) -> io::Result<Option<u32>> {
        let bytes = self.cursor.take(4)?;
        Ok(<[u8; 4]>::try_from(bytes.as_slice()).ok().map(u32::from_be_bytes))
    }

    fn read_u16(&mut self) -> io::Result<Option<u16>> {
        let bytes = self.cursor.take(2)?;
        Ok(<[u8; 2]>::try_from(bytes.as_slice()).ok().map(u16::from_be_bytes))
    }
}

/// Decodes UTF-8 leniently and keeps printable ASCII plus tab, newline and carriage return
pub fn sanitize_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| matches!(c, '\t' | '\n' | '\r' | ' '..='~'))
        .collect()
}
