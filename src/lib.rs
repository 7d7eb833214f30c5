//! Chat Log Recovery - Recover readable chat text from damaged binary chat logs
//!
//! This library decodes a loosely framed binary chat log format and writes the
//! records back out as filtered text, even when the log has gaps, truncated
//! records or corrupted fields. It supports:
//!
//! - Decoding records one at a time with forward resynchronization after damage
//! - Classifying records as intact, truncated, empty or timestamp-corrupt
//! - Filtering by date range and by phrase (substring or regular expression)
//! - Accumulating byte totals of any size with [`MagnitudeCount`]
//! - Recovering batches of files with progress reporting
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{BufReader, BufWriter};
//!
//! use chatlog_recovery::{RecoveryOptions, Session};
//!
//! let source = BufReader::new(File::open("chat.bin")?);
//! let destination = BufWriter::new(File::create("chat.txt")?);
//! let options = RecoveryOptions::new(None, None, "hello", false, false)?;
//!
//! let mut session = Session::open(source, destination, &options);
//! session.run_to_end()?;
//! let (stats, _) = session.finish()?;
//! println!("Recovered {} records, {} unreadable", stats.emitted_records, stats.gap_bytes);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod batch;
pub mod cli;
pub mod decoder;
pub mod error;
pub mod filters;
pub mod logging;
pub mod magnitude;
pub mod models;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use batch::{BatchReport, OutputTarget, collect_sources, run_batch};
pub use error::RecoveryError;
pub use magnitude::MagnitudeCount;
pub use models::{Integrity, LogRecord, RecordKind, Statistics};
pub use session::{RecoveryOptions, Session, Step};
pub use utils::format_path_with_tilde;
