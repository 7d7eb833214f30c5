//! Sequential recovery of many log files
//!
//! # Error Handling Strategy
//!
//! - **Record-level damage**: Never an error. Truncated, empty and corrupt
//!   records are counted in [`crate::models::Statistics`] and decoding goes on.
//!
//! - **File-level failures**: An I/O error on a source or destination stops
//!   the whole batch (first failure stops the batch). The report keeps the
//!   statistics gathered so far, including the partial file.
//!
//! - **Empty outputs**: A recovered file that ends up with zero bytes is
//!   deleted, since the text output has no header of its own.

pub mod runner;
pub mod sources;

pub use runner::{
    BatchFailure, BatchReport, FileReport, OutputTarget, PROGRESS_INTERVAL, Progress, run_batch,
};
pub use sources::collect_sources;
