//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chatlog_recovery::{RecordKind, RecoveryOptions, Session, Statistics};
use chrono::{DateTime, TimeZone, Utc};

/// "Now" for every test session, so future-timestamp checks are deterministic
pub const REFERENCE_TIMESTAMP: i64 = 2_000_000_000;

/// 2001-09-09 01:46:40 UTC
pub const BASE_TIMESTAMP: u32 = 1_000_000_000;

pub fn reference_time() -> DateTime<Utc> {
    Utc.timestamp_opt(REFERENCE_TIMESTAMP, 0).unwrap()
}

/// Options with no filters and a fixed reference time
pub fn test_options() -> RecoveryOptions {
    RecoveryOptions::default().with_reference_time(reference_time())
}

/// Builder for one binary record
#[derive(Clone)]
pub struct RecordBuilder {
    timestamp: u32,
    kind: u8,
    name: Vec<u8>,
    body: Vec<u8>,
    declared_body_len: Option<u16>,
}

impl RecordBuilder {
    /// Create a new regular record from Alice saying "Hi!"
    pub fn new() -> Self {
        Self {
            timestamp: BASE_TIMESTAMP,
            kind: RecordKind::Regular.to_byte(),
            name: b"Alice".to_vec(),
            body: b"Hi!".to_vec(),
            declared_body_len: None,
        }
    }

    pub fn timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn kind(mut self, kind: RecordKind) -> Self {
        self.kind = kind.to_byte();
        self
    }

    pub fn kind_byte(mut self, kind: u8) -> Self {
        self.kind = kind;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.as_bytes().to_vec();
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self
    }

    pub fn body_bytes(mut self, body: &[u8]) -> Self {
        self.body = body.to_vec();
        self
    }

    /// Override the body length field (to simulate truncation)
    pub fn declared_body_len(mut self, len: u16) -> Self {
        self.declared_body_len = Some(len);
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.timestamp.to_be_bytes().to_vec();
        bytes.push(self.kind);
        if self.kind == RecordKind::Headless.to_byte() {
            bytes.push(0);
        } else {
            bytes.push(self.name.len() as u8);
            bytes.extend_from_slice(&self.name);
        }
        let body_len = self.declared_body_len.unwrap_or(self.body.len() as u16);
        bytes.extend(body_len.to_be_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a whole log: records, junk and raw bytes in order
#[derive(Default)]
pub struct LogBuilder {
    bytes: Vec<u8>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, record: RecordBuilder) -> Self {
        self.bytes.extend(record.to_bytes());
        self
    }

    /// Append `len` junk bytes that can never be mistaken for a record kind
    pub fn junk(mut self, len: usize) -> Self {
        self.bytes.extend(junk_bytes(len));
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Append an end-of-log marker
    pub fn end_marker(mut self, timestamp: u32) -> Self {
        self.bytes.extend(timestamp.to_be_bytes());
        self.bytes.push(RecordKind::Eof.to_byte());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }

    /// Write the log into `dir` and return its path
    pub fn write_to(self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        fs::write(&path, self.bytes).expect("Failed to write log file");
        path
    }
}

/// Lowercase letters: never a valid kind byte
pub fn junk_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| b'a' + (i % 26) as u8).collect()
}

/// Run a full session over `bytes`, returning the text output and statistics
pub fn recover_bytes(bytes: Vec<u8>, options: &RecoveryOptions) -> (String, Statistics) {
    let mut session = Session::open(Cursor::new(bytes), Vec::new(), options);
    session.run_to_end().expect("in-memory recovery cannot fail");
    let (stats, output) = session.finish().expect("in-memory flush cannot fail");
    (String::from_utf8(output).expect("output is UTF-8"), stats)
}
