use std::io::{self, Read};

use tracing::debug;

use super::cursor::ByteCursor;
use crate::models::RecordKind;

/// Timestamp candidate plus kind candidate
pub const PROBE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResyncOutcome {
    /// Bytes consumed before a boundary was accepted or the stream ended
    pub skipped: u64,
    /// Offset of the accepted boundary, `None` at end of stream
    pub boundary: Option<u64>,
}

/// Whether `window` could be the start of a record header
///
/// Only the kind byte is checked; `Eof` counts as a valid kind here even
/// though the decoder never produces a record for it.
pub fn is_plausible_header(window: &[u8]) -> bool {
    window.len() >= PROBE_WINDOW && RecordKind::try_from(window[PROBE_WINDOW - 1]).is_ok()
}

/// Advances `cursor` to the next plausible record header
///
/// Length fields of the previous record are not trusted: every offset is
/// tried in turn and each rejected offset costs exactly one byte, so the
/// scan ends after at most as many attempts as there are bytes left. A tail too
/// short to hold a header is consumed and counted as skipped.
pub fn resynchronize<R: Read>(cursor: &mut ByteCursor<R>) -> io::Result<ResyncOutcome> {
    let start = cursor.position();
    let mut skipped = 0u64;

    loop {
        let window = cursor.peek(PROBE_WINDOW)?;
        let available = window.len();
        let plausible = is_plausible_header(window);

        if plausible {
            let boundary = cursor.position();
            if skipped > 0 {
                debug!(start, boundary, skipped, "resynchronized after gap");
            }
            return Ok(ResyncOutcome { skipped, boundary: Some(boundary) });
        }

        if available < PROBE_WINDOW {
            skipped += cursor.skip(available)?;
            if skipped > 0 {
                debug!(start, skipped, "reached end of stream while resynchronizing");
            }
            return Ok(ResyncOutcome { skipped, boundary: None });
        }

        skipped += cursor.skip(1)?;
    }
}
