//! Local tool cache
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/<tool>/<version>/<arch>/...        extracted tool tree
//! <root>/<tool>/<version>/<arch>.complete   registration marker
//! ```
//!
//! An entry exists only when both the directory and its marker exist. The
//! marker is written last, so an interrupted populate is never visible to
//! [`ToolCache::lookup`]. Entries are trusted as-is once present.

use super::error::ReleaseError;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MARKER_SUFFIX: &str = "complete";

/// (tool, version, architecture)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tool: String,
    pub version: String,
    pub arch: String,
}

impl CacheKey {
    pub fn new(
        tool: impl Into<String>,
        version: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            version: version.into(),
            arch: arch.into(),
        }
    }
}

/// Cache rooted at a single directory
#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
}

impl ToolCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn version_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(&key.tool).join(&key.version)
    }

    /// Directory an entry for `key` occupies
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.version_dir(key).join(&key.arch)
    }

    fn marker_path(&self, key: &CacheKey) -> PathBuf {
        self.version_dir(key)
            .join(format!("{}.{}", key.arch, MARKER_SUFFIX))
    }

    /// Existence check only, no network and no content verification
    pub fn lookup(&self, key: &CacheKey) -> Option<PathBuf> {
        let entry = self.entry_path(key);
        if entry.is_dir() && self.marker_path(key).is_file() {
            Some(entry)
        } else {
            None
        }
    }

    /// Copies `source` into the cache under `key` and returns the entry path
    ///
    /// An existing entry for the same key is replaced.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::IoError` if any filesystem step fails; the key
    /// stays unregistered in that case.
    pub fn populate(&self, key: &CacheKey, source: &Path) -> Result<PathBuf, ReleaseError> {
        let version_dir = self.version_dir(key);
        fs::create_dir_all(&version_dir).map_err(|e| {
            ReleaseError::io(format!("create cache directory {}", version_dir.display()), e)
        })?;

        // Stage next to the destination so the final rename stays on one filesystem
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&version_dir)
            .map_err(|e| {
                ReleaseError::io(format!("create staging directory in {}", version_dir.display()), e)
            })?;
        copy_tree(source, staging.path())?;

        let marker = self.marker_path(key);
        let dest = self.entry_path(key);

        remove_if_exists(&marker)?;
        if dest.exists() {
            log::debug!("Replacing existing cache entry {}", dest.display());
            fs::remove_dir_all(&dest).map_err(|e| {
                ReleaseError::io(format!("remove old cache entry {}", dest.display()), e)
            })?;
        }

        fs::rename(staging.path(), &dest).map_err(|e| {
            ReleaseError::io(
                format!("move {} to {}", staging.path().display(), dest.display()),
                e,
            )
        })?;

        fs::write(&marker, b"").map_err(|e| {
            ReleaseError::io(format!("write cache marker {}", marker.display()), e)
        })?;

        Ok(dest)
    }
}

fn remove_if_exists(path: &Path) -> Result<(), ReleaseError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ReleaseError::io(format!("remove {}", path.display()), e)),
    }
}

/// Recursive copy; `fs::copy` carries permission bits along
fn copy_tree(source: &Path, dest: &Path) -> Result<(), ReleaseError> {
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| {
            ReleaseError::io(
                format!("walk directory {}", source.display()),
                std::io::Error::other(e),
            )
        })?;

        let relative = entry.path().strip_prefix(source).map_err(|e| {
            ReleaseError::io(
                format!("relativize {}", entry.path().display()),
                std::io::Error::other(e),
            )
        })?;
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| {
                ReleaseError::io(format!("create directory {}", target.display()), e)
            })?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| {
                ReleaseError::io(
                    format!("copy {} to {}", entry.path().display(), target.display()),
                    e,
                )
            })?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<(), ReleaseError> {
    let points_to = fs::read_link(link)
        .map_err(|e| ReleaseError::io(format!("read link {}", link.display()), e))?;
    std::os::unix::fs::symlink(&points_to, target)
        .map_err(|e| ReleaseError::io(format!("create link {}", target.display()), e))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<(), ReleaseError> {
    fs::copy(link, target).map(|_| ()).map_err(|e| {
        ReleaseError::io(
            format!("copy {} to {}", link.display(), target.display()),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolpin_testkit::temp_dir_in_workspace;

    fn key() -> CacheKey {
        CacheKey::new("bruin", "v0.11.0", "x86_64")
    }

    fn source_tree(root: &Path) -> PathBuf {
        let source = root.join("source");
        fs::create_dir_all(source.join("bin")).unwrap();
        fs::write(source.join("bin").join("bruin"), b"binary").unwrap();
        fs::write(source.join("README.md"), b"readme").unwrap();
        source
    }

    #[test]
    fn test_lookup_miss_on_empty_cache() {
        let temp = temp_dir_in_workspace();
        let cache = ToolCache::new(temp.path().join("cache"));
        assert_eq!(cache.lookup(&key()), None);
    }

    #[test]
    fn test_populate_then_lookup_hits() {
        let temp = temp_dir_in_workspace();
        let cache = ToolCache::new(temp.path().join("cache"));
        let source = source_tree(temp.path());

        let path = cache.populate(&key(), &source).unwrap();

        assert_eq!(path, cache.entry_path(&key()));
        assert!(path.ends_with("bruin/v0.11.0/x86_64"));
        assert_eq!(fs::read(path.join("bin/bruin")).unwrap(), b"binary");
        assert_eq!(cache.lookup(&key()), Some(path));
    }

    #[test]
    fn test_populate_leaves_source_untouched() {
        let temp = temp_dir_in_workspace();
        let cache = ToolCache::new(temp.path().join("cache"));
        let source = source_tree(temp.path());

        cache.populate(&key(), &source).unwrap();
        assert!(source.join("bin/bruin").is_file());
    }

    #[test]
    fn test_directory_without_marker_is_not_an_entry() {
        let temp = temp_dir_in_workspace();
        let cache = ToolCache::new(temp.path().join("cache"));

        // Simulates a populate interrupted before the marker was written
        fs::create_dir_all(cache.entry_path(&key())).unwrap();
        assert_eq!(cache.lookup(&key()), None);
    }

    #[test]
    fn test_populate_overwrites_existing_entry() {
        let temp = temp_dir_in_workspace();
        let cache = ToolCache::new(temp.path().join("cache"));
        let first = source_tree(temp.path());
        cache.populate(&key(), &first).unwrap();

        let second = temp.path().join("second");
        fs::create_dir_all(&second).unwrap();
        fs::write(second.join("NEW"), b"new").unwrap();
        let path = cache.populate(&key(), &second).unwrap();

        assert!(path.join("NEW").is_file());
        assert!(!path.join("README.md").exists(), "old contents must be gone");
    }

    #[test]
    fn test_keys_are_independent() {
        let temp = temp_dir_in_workspace();
        let cache = ToolCache::new(temp.path().join("cache"));
        let source = source_tree(temp.path());

        cache.populate(&key(), &source).unwrap();

        assert!(cache.lookup(&CacheKey::new("bruin", "v0.11.0", "aarch64")).is_none());
        assert!(cache.lookup(&CacheKey::new("bruin", "v0.12.0", "x86_64")).is_none());
        assert!(cache.lookup(&CacheKey::new("other", "v0.11.0", "x86_64")).is_none());
    }

    #[test]
    fn test_no_staging_directory_left_behind() {
        let temp = temp_dir_in_workspace();
        let cache = ToolCache::new(temp.path().join("cache"));
        let source = source_tree(temp.path());
        cache.populate(&key(), &source).unwrap();

        let leftovers: Vec<_> = fs::read_dir(cache.root().join("bruin/v0.11.0"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".staging-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_populate_missing_source_fails_unregistered() {
        let temp = temp_dir_in_workspace();
        let cache = ToolCache::new(temp.path().join("cache"));

        let result = cache.populate(&key(), &temp.path().join("does-not-exist"));
        assert!(matches!(result, Err(ReleaseError::IoError { .. })));
        assert_eq!(cache.lookup(&key()), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_populate_preserves_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = temp_dir_in_workspace();
        let cache = ToolCache::new(temp.path().join("cache"));
        let source = source_tree(temp.path());
        let binary = source.join("bin/bruin");
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();

        let path = cache.populate(&key(), &source).unwrap();
        let mode = fs::metadata(path.join("bin/bruin"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
