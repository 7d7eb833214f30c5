pub mod environment;
pub mod format;
pub mod paths;

pub use environment::{OUTPUT_DIR_VAR, output_dir_from_env, resolve_output_dir};
pub use format::{format_thousands, gap_annotation};
pub use paths::{
    destination_for, expand_tilde, format_path_with_tilde, normalize_path, remove_if_empty,
    safe_open_source,
};
