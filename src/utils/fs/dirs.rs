//! Directory operations for creating, copying, inspecting and removing directories.
//!
//! [`copy_dir`] is the directory copier used when a generator source is given as a
//! local folder: it reproduces the tree under the destination and keeps the Unix
//! mode of every file and directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// What currently exists at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Nothing exists at the path
    Missing,
    /// A directory (symlinks are followed)
    Directory,
    /// Anything that is not a directory
    File,
}

/// Inspect a path, following symlinks.
///
/// A missing path is not an error; any other metadata failure (permissions,
/// I/O) is propagated.
pub fn path_kind(path: &Path) -> Result<PathKind> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(PathKind::Directory),
        Ok(_) => Ok(PathKind::File),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PathKind::Missing),
        Err(e) => Err(e).with_context(|| format!("Failed to inspect path: {}", path.display())),
    }
}

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// # Returns
///
/// - `Ok(())` if the directory exists or was successfully created
/// - `Err` if the path exists but is not a directory, or creation fails
///
/// # Examples
///
/// ```rust,no_run
/// use deploykf_cli::utils::fs::ensure_dir;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// ensure_dir(Path::new("output/manifests/argocd"))?;
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).with_context(|| {
            let platform_help = if crate::utils::platform::is_windows() {
                "On Windows: Check that the path length is < 260 chars or that long path support is enabled"
            } else {
                "Check directory permissions and path validity"
            };

            format!("Failed to create directory: {}\n\n{}", path.display(), platform_help)
        })?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Ensures that the parent directory of a file path exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    Ok(())
}

/// Recursively copies a directory and all its contents to a new location.
///
/// Every directory under `src` is recreated under `dst` and every regular file is
/// copied byte for byte. File modes are preserved; directory modes are applied
/// once the directory's contents have been copied, so read-only source
/// directories do not block their own copy.
///
/// An empty `src` produces just the `dst` root. The first read or write failure
/// aborts the copy and is returned; nothing is rolled back.
///
/// Symlinks to files are copied as regular files holding the target's content.
/// Symlinks to directories are skipped.
///
/// # Examples
///
/// ```rust,no_run
/// use deploykf_cli::utils::fs::copy_dir;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// copy_dir(Path::new("./my-generator"), Path::new("/tmp/scratch"))?;
/// # Ok(())
/// # }
/// ```
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;

    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            copy_file(&src_path, &dst_path)?;
        } else if file_type.is_symlink() {
            if path_kind(&src_path)? != PathKind::File {
                return Err(anyhow::anyhow!(
                    "Symlinks are only supported when they point at a file: {}",
                    src_path.display()
                ));
            }
            copy_file(&src_path, &dst_path)?;
        }
    }

    let permissions = fs::metadata(src)
        .with_context(|| format!("Failed to read metadata: {}", src.display()))?
        .permissions();
    fs::set_permissions(dst, permissions)
        .with_context(|| format!("Failed to set permissions on {}", dst.display()))?;

    Ok(())
}

/// Copy one file; `fs::copy` carries the permission bits across.
fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).with_context(|| {
        format!("Failed to copy file from {} to {}", src.display(), dst.display())
    })?;
    Ok(())
}

/// Recursively removes a directory and all its contents.
///
/// Safe to call on non-existent directories.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir() {
        let temp = tempdir().unwrap();
        let test_dir = temp.path().join("test_dir");

        assert!(!test_dir.exists());
        ensure_dir(&test_dir).unwrap();
        assert!(test_dir.is_dir());
    }

    #[test]
    fn test_ensure_dir_on_file() {
        let temp = tempdir().unwrap();
        let file_path = temp.path().join("file.txt");
        std::fs::write(&file_path, "content").unwrap();

        assert!(ensure_dir(&file_path).is_err());
    }

    #[test]
    fn test_ensure_parent_dir() {
        let temp = tempdir().unwrap();
        let file_path = temp.path().join("parent").join("child").join("file.txt");

        ensure_parent_dir(&file_path).unwrap();
        assert!(file_path.parent().unwrap().exists());

        // bare file names have an empty parent
        ensure_parent_dir(Path::new("file.txt")).unwrap();
    }

    #[test]
    fn test_path_kind() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        assert_eq!(path_kind(temp.path()).unwrap(), PathKind::Directory);
        assert_eq!(path_kind(&file).unwrap(), PathKind::File);
        assert_eq!(path_kind(&temp.path().join("nope")).unwrap(), PathKind::Missing);
    }

    #[test]
    fn test_copy_dir() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");

        ensure_dir(&src.join("templates/nested")).unwrap();
        std::fs::write(src.join("default_values.yaml"), "a: 1").unwrap();
        std::fs::write(src.join("templates/nested/file.txt"), "content").unwrap();

        copy_dir(&src, &dst).unwrap();

        assert_eq!(std::fs::read_to_string(dst.join("default_values.yaml")).unwrap(), "a: 1");
        assert_eq!(
            std::fs::read_to_string(dst.join("templates/nested/file.txt")).unwrap(),
            "content"
        );
    }

    #[test]
    fn test_copy_empty_dir_creates_only_root() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("empty");
        let dst = temp.path().join("dst");
        ensure_dir(&src).unwrap();

        copy_dir(&src, &dst).unwrap();

        assert!(dst.is_dir());
        assert_eq!(std::fs::read_dir(&dst).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_dir_missing_source_fails() {
        let temp = tempdir().unwrap();
        let result = copy_dir(&temp.path().join("missing"), &temp.path().join("dst"));
        assert!(result.is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_copy_dir_preserves_modes() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");

        ensure_dir(&src.join("bin")).unwrap();
        std::fs::write(src.join("bin/run.sh"), "#!/bin/sh").unwrap();
        std::fs::set_permissions(src.join("bin/run.sh"), std::fs::Permissions::from_mode(0o755))
            .unwrap();
        std::fs::set_permissions(src.join("bin"), std::fs::Permissions::from_mode(0o750))
            .unwrap();

        copy_dir(&src, &dst).unwrap();

        let file_mode = std::fs::metadata(dst.join("bin/run.sh")).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o755);
        let dir_mode = std::fs::metadata(dst.join("bin")).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o750);
    }

    #[test]
    #[cfg(unix)]
    fn test_copy_dir_follows_file_symlinks() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        ensure_dir(&src).unwrap();
        std::fs::write(temp.path().join("real.yaml"), "real").unwrap();
        std::os::unix::fs::symlink(temp.path().join("real.yaml"), src.join("link.yaml")).unwrap();

        copy_dir(&src, &dst).unwrap();

        assert_eq!(std::fs::read_to_string(dst.join("link.yaml")).unwrap(), "real");
    }

    #[test]
    #[cfg(unix)]
    fn test_copy_dir_rejects_directory_symlinks() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        ensure_dir(&src.join("templates")).unwrap();
        ensure_dir(&temp.path().join("shared")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("shared"), src.join("templates/shared"))
            .unwrap();

        let err = copy_dir(&src, &temp.path().join("dst")).unwrap_err();

        assert!(err.to_string().contains("templates/shared"));
    }

    #[test]
    fn test_remove_dir_all() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("to_remove");

        ensure_dir(&dir).unwrap();
        std::fs::write(dir.join("file.txt"), "content").unwrap();

        remove_dir_all(&dir).unwrap();
        assert!(!dir.exists());

        // Should not error on non-existent directory
        remove_dir_all(&dir).unwrap();
    }
}
