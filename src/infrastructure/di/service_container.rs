//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::TreeService;
use crate::config::Settings;
use crate::infrastructure::files::JsonFiles;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Tree mutation service, using the configured child-type policy
    pub tree_service: Arc<TreeService>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let tree_service = Arc::new(TreeService::new(settings.policy()));
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            tree_service,
        }
    }

    /// JSON file access bound to this container's filesystem and service.
    pub fn files(&self) -> JsonFiles {
        JsonFiles::new(self.fs.clone(), self.tree_service.clone(), self.settings.pretty)
    }
}
