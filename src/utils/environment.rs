use std::env;
use std::path::PathBuf;

/// Environment variable naming the default directory for recovered text
pub const OUTPUT_DIR_VAR: &str = "CHATLOG_RECOVERY_OUTPUT_DIR";

/// Output directory from the environment, if set and non-empty
pub fn output_dir_from_env() -> Option<PathBuf> {
    env::var_os(OUTPUT_DIR_VAR).filter(|value| !value.is_empty()).map(PathBuf::from)
}

/// Picks the output directory: explicit flag, then environment, then none
/// (recovered files go next to their sources)
pub fn resolve_output_dir(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(output_dir_from_env)
}
