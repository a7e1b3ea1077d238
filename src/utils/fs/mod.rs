//! File system utilities for deployKF
//!
//! - [`dirs`]: directory creation, inspection, recursive copy and removal
//! - [`atomic`]: temp-and-rename writes for marker files and runtime templates
//! - [`formats`]: JSON and YAML file helpers
//! - [`paths`]: lexical normalization and containment checks
//! - [`temp`]: the self-removing scratch directory

pub mod atomic;
pub mod dirs;
pub mod formats;
pub mod paths;
pub mod temp;

pub use atomic::{atomic_write, safe_write};
pub use dirs::{
    PathKind, copy_dir, ensure_dir, ensure_parent_dir, path_kind, remove_dir_all,
};
pub use formats::{read_json_file, read_text_file, read_yaml_file, write_json_file};
pub use paths::{is_safe_path, normalize_path};
pub use temp::TempDir;
