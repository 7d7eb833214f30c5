use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::error::{RecoveryError, Result};
use crate::models::Statistics;
use crate::session::{RecoveryOptions, Session, Step};
use crate::utils::{
    destination_for, format_path_with_tilde, normalize_path, remove_if_empty, safe_open_source,
};

/// Minimum time between two progress reports for the same file
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(10);

/// Where recovered text goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One `.txt` per source, in `output_dir` or next to the source
    Files { output_dir: Option<PathBuf> },
    /// Decode and count only
    Discard,
}

/// Snapshot handed to the progress callback
#[derive(Debug)]
pub struct Progress<'a> {
    /// Zero-based index of the file being processed
    pub file_index: usize,
    pub file_count: usize,
    pub source: &'a Path,
    pub bytes_done: u64,
    pub bytes_total: u64,
    pub statistics: &'a Statistics,
}

impl Progress<'_> {
    /// Completion of the whole batch in percent, counting files as equal shares
    pub fn percent(&self) -> f64 {
        if self.file_count == 0 {
            return 100.0;
        }
        let file_fraction = if self.bytes_total == 0 {
            1.0
        } else {
            (self.bytes_done as f64 / self.bytes_total as f64).min(1.0)
        };
        (self.file_index as f64 + file_fraction) / self.file_count as f64 * 100.0
    }
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: PathBuf,
    /// Recovered text file, `None` when discarding or when it was removed as empty
    pub destination: Option<PathBuf>,
    pub statistics: Statistics,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub source: PathBuf,
    pub error: RecoveryError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    /// Totals over every processed file, including the partial one that failed
    pub totals: Statistics,
    /// First hard failure; the sources after it were not processed
    pub failure: Option<BatchFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Recovers every source in order with a fresh session per file
///
/// Progress is reported at most every [`PROGRESS_INTERVAL`] and once at the
/// end of each file. The first failure stops the batch: decoding state from a
/// failing source is never carried into the next one. Before a file is
/// opened, its output path is checked against every source of the batch and
/// every output already written, so recovery never overwrites a log.
pub fn run_batch<F>(
    sources: &[PathBuf],
    target: &OutputTarget,
    options: &RecoveryOptions,
    mut on_progress: F,
) -> BatchReport
where
    F: FnMut(&Progress<'_>),
{
    let mut report = BatchReport::default();
    let batch_sources: HashSet<PathBuf> = sources.iter().map(|s| normalize_path(s)).collect();
    let mut claimed = HashMap::new();
    let file_count = sources.len();

    for (file_index, source) in sources.iter().enumerate() {
        info!(source = %format_path_with_tilde(source), "recovering");

        let destination = match target {
            OutputTarget::Files { output_dir } => {
                let output_dir = output_dir.as_deref();
                match claim_destination(source, output_dir, &batch_sources, &mut claimed) {
                    Ok(destination) => Some(destination),
                    Err(error) => {
                        let shown = format_path_with_tilde(source);
                        error!(source = %shown, %error, "recovery refused");
                        report.failure = Some(BatchFailure { source: source.clone(), error });
                        break;
                    }
                }
            }
            OutputTarget::Discard => None,
        };

        let mut progress = |bytes_done: u64, bytes_total: u64, statistics: &Statistics| {
            on_progress(&Progress {
                file_index,
                file_count,
                source,
                bytes_done,
                bytes_total,
                statistics,
            })
        };

        match recover_file(source, destination.as_deref(), options, &mut progress) {
            Ok(file_report) => {
                report.totals.merge(&file_report.statistics);
                report.files.push(file_report);
            }
            Err((error, partial)) => {
                error!(source = %format_path_with_tilde(source), %error, "recovery aborted");
                report.totals.merge(&partial);
                report.failure = Some(BatchFailure { source: source.clone(), error });
                break;
            }
        }
    }

    report
}

type FileOutcome = std::result::Result<FileReport, (RecoveryError, Statistics)>;

/// Picks the output path for `source` and reserves it for the rest of the batch
///
/// Refuses a destination that is one of the batch's sources, or one that an
/// earlier source of this batch already wrote. Nothing is created on refusal.
fn claim_destination(
    source: &Path,
    output_dir: Option<&Path>,
    batch_sources: &HashSet<PathBuf>,
    claimed: &mut HashMap<PathBuf, PathBuf>,
) -> Result<PathBuf> {
    let destination = destination_for(source, output_dir);
    let key = normalize_path(&destination);

    if batch_sources.contains(&key) {
        return Err(RecoveryError::DestinationIsSource { destination });
    }
    if let Some(first_source) = claimed.get(&key) {
        return Err(RecoveryError::DestinationConflict {
            destination,
            first_source: first_source.clone(),
        });
    }

    claimed.insert(key, source.to_path_buf());
    Ok(destination)
}

fn recover_file<P>(
    source: &Path,
    destination: Option<&Path>,
    options: &RecoveryOptions,
    progress: &mut P,
) -> FileOutcome
where
    P: FnMut(u64, u64, &Statistics),
{
    let file = safe_open_source(source).map_err(|e| (e, Statistics::new()))?;
    let bytes_total = file.metadata().map(|m| m.len()).unwrap_or(0);
    let reader = BufReader::new(file);

    let Some(destination) = destination else {
        let session = Session::open(reader, io::sink(), options);
        let statistics = drive_to_end(session, bytes_total, progress)?;
        return Ok(FileReport { source: source.to_path_buf(), destination: None, statistics });
    };

    let writer = File::create(destination)
        .map(BufWriter::new)
        .map_err(|e| (RecoveryError::from(e), Statistics::new()))?;

    let session = Session::open(reader, writer, options);
    let outcome = drive_to_end(session, bytes_total, progress);

    // The writer is closed by now, on success and on failure alike
    let removed = match remove_if_empty(destination) {
        Ok(removed) => removed,
        Err(e) => {
            warn!(
                destination = %destination.display(),
                error = %e,
                "could not remove empty output"
            );
            false
        }
    };

    let statistics = outcome?;
    Ok(FileReport {
        source: source.to_path_buf(),
        destination: (!removed).then(|| destination.to_path_buf()),
        statistics,
    })
}

/// Steps `session` to the end and closes it, keeping partial totals on failure
fn drive_to_end<R, W, P>(
    mut session: Session<R, W>,
    bytes_total: u64,
    progress: &mut P,
) -> std::result::Result<Statistics, (RecoveryError, Statistics)>
where
    R: Read,
    W: Write,
    P: FnMut(u64, u64, &Statistics),
{
    if let Err(e) = drive(&mut session, bytes_total, progress) {
        return Err((e, session.statistics().clone()));
    }
    let partial = session.statistics().clone();
    session.finish().map(|(statistics, _)| statistics).map_err(|e| (e, partial))
}

fn drive<R, W, P>(session: &mut Session<R, W>, bytes_total: u64, progress: &mut P) -> Result<()>
where
    R: Read,
    W: Write,
    P: FnMut(u64, u64, &Statistics),
{
    let mut last_report = Instant::now();
    while session.step()? != Step::EndOfStream {
        if last_report.elapsed() >= PROGRESS_INTERVAL {
            progress(session.position(), bytes_total, session.statistics());
            last_report = Instant::now();
        }
    }
    progress(session.position(), bytes_total, session.statistics());
    Ok(())
}
