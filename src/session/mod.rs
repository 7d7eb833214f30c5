//! One recovery pass over one source.
//!
//! A [`Session`] owns the decoder, the destination and the statistics, so
//! several sources never share decoding state. The caller drives it with
//! [`Session::step`] until [`Step::EndOfStream`], sampling
//! [`Session::statistics`] and [`Session::position`] for progress as it likes.

pub mod options;

use std::io::{Read, Write};

use tracing::debug;

pub use options::RecoveryOptions;

use crate::decoder::{Decoded, RecordDecoder};
use crate::error::Result;
use crate::filters::{Decision, RecordFilter};
use crate::models::{Integrity, LogRecord, Statistics};
use crate::utils::gap_annotation;

/// Outcome of a single [`Session::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Record(StepReport),
    /// A header was consumed without producing a record
    Skipped { bytes_consumed: u64 },
    EndOfStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub emitted: bool,
    pub integrity: Integrity,
    /// Record bytes plus any gap skipped after it
    pub bytes_consumed: u64,
}

pub struct Session<R, W> {
    decoder: RecordDecoder<R>,
    destination: W,
    filter: RecordFilter,
    stats: Statistics,
}

impl<R: Read, W: Write> Session<R, W> {
    pub fn open(source: R, destination: W, options: &RecoveryOptions) -> Self {
        Self {
            decoder: RecordDecoder::new(source, options.resolved_reference_time()),
            destination,
            filter: options.filter.clone(),
            stats: Statistics::new(),
        }
    }

    /// Decodes, filters and possibly emits the next record
    ///
    /// # Errors
    ///
    /// Only failures of the source or destination are errors; damaged input
    /// is reported through the returned [`Step`].
    pub fn step(&mut self) -> Result<Step> {
        let start = self.decoder.position();
        let gap_before = self.decoder.pending_gap();

        let decoded = self.decoder.next_record(&mut self.stats)?;
        let bytes_consumed = self.decoder.position() - start;

        let record = match decoded {
            Decoded::EndOfStream => return Ok(Step::EndOfStream),
            Decoded::EndMarker { .. } | Decoded::Unreadable { .. } => {
                return Ok(Step::Skipped { bytes_consumed });
            }
            Decoded::Record(record) => record,
        };

        let emitted = match self.filter.apply(&record, &mut self.stats) {
            Decision::Emit => {
                self.emit(&record, gap_before)?;
                true
            }
            Decision::Discard | Decision::Drop => false,
        };

        Ok(Step::Record(StepReport { emitted, integrity: record.integrity, bytes_consumed }))
    }

    /// Writes the pending gap annotation, if any, followed by the record line
    fn emit(&mut self, record: &LogRecord, gap_before: u64) -> Result<()> {
        if gap_before > 0 {
            writeln!(self.destination, "{}", gap_annotation(gap_before))?;
            self.decoder.release_gap(gap_before);
        }
        writeln!(self.destination, "{}", record.render_line())?;
        self.stats.emitted_records += 1;
        Ok(())
    }

    /// Steps until the source is exhausted
    pub fn run_to_end(&mut self) -> Result<()> {
        while self.step()? != Step::EndOfStream {}
        Ok(())
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Bytes consumed from the source so far
    pub fn position(&self) -> u64 {
        self.decoder.position()
    }

    /// Flushes the destination and hands back the totals and the destination
    pub fn finish(mut self) -> Result<(Statistics, W)> {
        self.destination.flush()?;
        debug!(
            bytes = self.decoder.position(),
            emitted = self.stats.emitted_records,
            "session finished"
        );
        Ok((self.stats, self.destination))
    }
}
