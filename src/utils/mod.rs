//! Cross-platform utilities shared by the generator modules
//!
//! - [`fs`]: file system operations (copying, atomic writes, scratch directories)
//! - [`platform`]: home directory, path expansion and separator handling
//! - [`progress`]: download progress bars and spinners

pub mod fs;
pub mod platform;
pub mod progress;

pub use fs::{TempDir, copy_dir, ensure_dir, safe_write};
pub use platform::{get_home_dir, resolve_path, to_slash};
pub use progress::ProgressBar;
