//! Data models for recovered chat logs.
//!
//! - [`LogRecord`] - One decoded chat event with its [`Integrity`] flags
//! - [`RecordKind`] - The closed set of record header kinds
//! - [`Statistics`] - Byte and record totals gathered while recovering

pub mod record;
pub mod stats;

pub use record::{
    CORRUPT_TIMESTAMP_MARKER, EMPTY_MARKER, Integrity, LogRecord, RecordKind, RecordTimestamp,
    TRUNCATED_MARKER,
};
pub use stats::Statistics;
