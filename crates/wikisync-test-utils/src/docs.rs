//! [`TestDocs`] builder for wikisync test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary source directory with helpers for writing documents.
///
/// # Example
///
/// ```rust
/// use wikisync_test_utils::docs::TestDocs;
///
/// let docs = TestDocs::new()
///     .with_file("README.md", "# Intro\n")
///     .with_file("guide/setup.md", "Steps\n");
/// docs.assert_file_exists("guide/setup.md");
/// ```
pub struct TestDocs {
    temp_dir: TempDir,
}

impl Default for TestDocs {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDocs {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap_or_else(|e| panic!("TestDocs::new: {e}")),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the directory.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Builder form of [`TestDocs::write`].
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        self.write(relative, content);
        self
    }

    /// Builder form of [`TestDocs::mkdir`].
    pub fn with_dir(self, relative: &str) -> Self {
        self.mkdir(relative);
        self
    }

    /// Write `content` to `relative`, creating parent directories.
    ///
    /// # Panics
    /// Panics if the filesystem operations fail.
    pub fn write(&self, relative: &str, content: &str) {
        let full_path = self.path(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("TestDocs::write: failed to create {}: {e}", parent.display()));
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("TestDocs::write: failed to write {}: {e}", full_path.display()));
    }

    /// Write raw bytes, for encoding edge cases.
    pub fn write_bytes(&self, relative: &str, content: &[u8]) {
        let full_path = self.path(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
    }

    /// Create an (empty) directory.
    pub fn mkdir(&self, relative: &str) {
        fs::create_dir_all(self.path(relative))
            .unwrap_or_else(|e| panic!("TestDocs::mkdir: failed to create {relative}: {e}"));
    }

    /// Remove a file.
    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.path(relative))
            .unwrap_or_else(|e| panic!("TestDocs::remove: failed to remove {relative}: {e}"));
    }

    /// Move a file, creating the destination's parent directories.
    pub fn rename(&self, from: &str, to: &str) {
        let target = self.path(to);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::rename(self.path(from), target)
            .unwrap_or_else(|e| panic!("TestDocs::rename: {from} -> {to}: {e}"));
    }

    /// Assert that `relative` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(full_path.exists(), "Expected file to exist: {}", full_path.display());
    }

    /// Names of the files in `relative`, sorted.
    pub fn list(&self, relative: &str) -> Vec<String> {
        let dir = self.path(relative);
        if !dir.is_dir() {
            return Vec::new();
        }
        let mut names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
