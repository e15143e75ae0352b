//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::domain::ElementId;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Host attribute storage for serialized graphs.
///
/// `ensure_slot` is called once before any store; the remaining calls of a
/// run form one edit session.
pub trait AttributeStore: Send + Sync {
    /// Make sure the attribute exists and is writable.
    fn ensure_slot(&self) -> io::Result<()>;

    /// Attach a system's hierarchy text to the system.
    fn store_system(&self, system: ElementId, value: &str) -> io::Result<()>;

    /// Attach the project composite to the project record.
    fn store_project(&self, title: &str, value: &str) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
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

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// Attribute store that keeps each value as a file below `dir`.
///
/// Layout: `system-<id>.json` per system, `project.json` for the composite.
pub struct FileAttributeStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl FileAttributeStore {
    /// Subdirectory of the output directory holding attribute files.
    pub const DIR_NAME: &'static str = "attributes";

    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    /// Store rooted at `<output_dir>/attributes`.
    pub fn under(fs: Arc<dyn FileSystem>, output_dir: &Path) -> Self {
        Self::new(fs, output_dir.join(Self::DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn system_path(&self, system: ElementId) -> PathBuf {
        self.dir.join(format!("system-{system}.json"))
    }

    pub fn project_path(&self) -> PathBuf {
        self.dir.join("project.json")
    }

    fn require_slot(&self) -> io::Result<()> {
        if self.fs.exists(&self.dir) {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("attribute slot missing: {}", self.dir.display()),
            ))
        }
    }
}

impl AttributeStore for FileAttributeStore {
    fn ensure_slot(&self) -> io::Result<()> {
        debug!("ensure_slot: {}", self.dir.display());
        self.fs.create_dir_all(&self.dir)
    }

    fn store_system(&self, system: ElementId, value: &str) -> io::Result<()> {
        self.require_slot()?;
        self.fs.write(&self.system_path(system), value)
    }

    fn store_project(&self, title: &str, value: &str) -> io::Result<()> {
        self.require_slot()?;
        debug!("store_project: title={title}");
        self.fs.write(&self.project_path(), value)
    }
}
