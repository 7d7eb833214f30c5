use std::borrow::Cow;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{RecoveryError, Result};

/// Extension given to recovered text files
pub const OUTPUT_EXTENSION: &str = "txt";

/// Opens a source log for reading
///
/// On unix the open refuses to follow a symlink at the final path component,
/// and the check that the source is a regular file is made on the open handle
/// to avoid TOCTOU (time-of-check-time-of-use) races.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not a regular file.
pub fn safe_open_source(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOFOLLOW);
    }

    let file = options.open(path)?;
    if !file.metadata()?.is_file() {
        return Err(RecoveryError::SourceNotFile { path: path.to_path_buf() });
    }
    Ok(file)
}

/// Path of the recovered text for `source`
///
/// The file keeps the source's stem with a `.txt` extension and lands in
/// `output_dir`, or next to the source when no directory is given.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use chatlog_recovery::utils::destination_for;
///
/// let out = destination_for(Path::new("/logs/chat_0412.bin"), Some(Path::new("/out")));
/// assert_eq!(out, PathBuf::from("/out/chat_0412.txt"));
/// ```
pub fn destination_for(source: &Path, output_dir: Option<&Path>) -> PathBuf {
    let mut name =
        source.file_stem().map(|s| s.to_os_string()).unwrap_or_else(|| "recovered".into());
    name.push(".");
    name.push(OUTPUT_EXTENSION);

    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| source.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(name)
}

/// Resolves the directory part of `path`, so two spellings of one file compare equal
///
/// The file itself does not need to exist. Paths whose directory cannot be
/// resolved are returned unchanged.
pub fn normalize_path(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Deletes `path` if it holds zero bytes; returns whether it was removed
pub fn remove_if_empty(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() && metadata.len() == 0 => {
            fs::remove_file(path)?;
            Ok(true)
        }
        Ok(_) => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Expands a leading `~` to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use chatlog_recovery::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/logs/chat.bin");
/// // Returns "~/logs/chat.bin" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
