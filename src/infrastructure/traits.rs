//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing the CLI
//! to be tested with in-memory implementations.

use std::io;
use std::path::Path;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create the parent directory of a path if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Real filesystem implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_written_file_when_reading_then_same_content() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tree.json");
        let fs = RealFileSystem;

        assert!(!fs.exists(&path));
        fs.write(&path, "{}").unwrap();
        assert!(fs.exists(&path));
        assert_eq!(fs.read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn given_nested_path_when_ensuring_parent_then_directory_created() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a/b/cmstree.toml");
        let fs = RealFileSystem;

        fs.ensure_parent(&path).unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }
}
