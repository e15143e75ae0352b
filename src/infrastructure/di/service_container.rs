//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::{load_model, ExportService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::Model;
use crate::infrastructure::traits::{AttributeStore, FileAttributeStore, FileSystem, RealFileSystem};

/// Container holding settings and I/O implementations.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Attribute store override; `None` stores below the output directory
    store: Option<Arc<dyn AttributeStore>>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), None)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        store: Option<Arc<dyn AttributeStore>>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            store,
        }
    }

    /// Read a model through the container's filesystem.
    pub fn load_model(&self, path: &Path) -> ApplicationResult<Model> {
        load_model(self.fs.as_ref(), path)
    }

    /// Export service writing to `output_dir`.
    pub fn export_service(&self, output_dir: &Path) -> ExportService {
        let store = self.store.clone().unwrap_or_else(|| {
            Arc::new(FileAttributeStore::under(self.fs.clone(), output_dir))
        });
        ExportService::new(self.fs.clone(), store, self.settings.clone())
    }
}
