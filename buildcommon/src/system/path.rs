use crate::prelude::*;

use std::path::{Path, PathBuf};

use super::Error;

/// Path extensions
pub trait PathExt: Sized + AsRef<Path> {
    /// Push `path` onto `self` and return the result
    fn into_joined(self, path: impl AsRef<Path>) -> PathBuf;
    /// Convert to an absolute path against the current directory.
    ///
    /// Symlinks are kept as-is. The path must exist
    fn to_abs(&self) -> Result<PathBuf, Error> {
        let path = self.as_ref();
        std::fs::metadata(path)
            .and_then(|_| std::path::absolute(path))
            .map(|abs| dunce::simplified(&abs).to_path_buf())
            .change_context_lazy(|| Error::Canonicalize(path.display().to_string()))
    }
    /// Convert to relative path from base.
    ///
    /// If either path is relative, `self` is returned unchanged
    fn rebase(&self, base: impl AsRef<Path>) -> PathBuf {
        let path = self.as_ref();
        let base = base.as_ref();
        if !path.is_absolute() || !base.is_absolute() {
            return path.to_path_buf();
        }
        pathdiff::diff_paths(path, base).unwrap_or(path.to_path_buf())
    }

    fn to_utf8(&self) -> Result<String, Error> {
        self.as_ref()
            .as_os_str()
            .to_os_string()
            .into_string()
            .map_err(|_| report!(Error::NotUTF8(self.as_ref().display().to_string())))
    }
}

impl PathExt for PathBuf {
    #[inline]
    fn into_joined(mut self, path: impl AsRef<Path>) -> PathBuf {
        self.push(path);
        self
    }
}

impl PathExt for &Path {
    fn into_joined(self, path: impl AsRef<Path>) -> PathBuf {
        self.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebase_under_root() {
        let root = PathBuf::from("/project");
        let cache = root.join("build").into_joined("env_cache.yml");
        assert_eq!(cache.rebase(&root), PathBuf::from("build/env_cache.yml"));
    }

    #[test]
    fn test_rebase_relative_is_unchanged() {
        let path = PathBuf::from("build/env_cache.yml");
        assert_eq!(path.rebase("/project"), path);
    }

    #[test]
    fn test_to_abs_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = missing.to_abs().unwrap_err();
        assert!(matches!(err.current_context(), Error::Canonicalize(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_to_abs_keeps_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        let link = dir.path().join("link");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert_eq!(link.to_abs().unwrap(), link);

        std::fs::remove_dir(&real).unwrap();
        let err = link.to_abs().unwrap_err();
        assert!(matches!(err.current_context(), Error::Canonicalize(_)));
    }
}
