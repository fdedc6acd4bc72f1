//! JSON snapshot, operation and payload files.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::application::{OperationDescriptor, TreeService};
use crate::domain::Tree;
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, InfraResult};

/// Reads and writes the JSON documents the CLI works on.
pub struct JsonFiles {
    fs: Arc<dyn FileSystem>,
    service: Arc<TreeService>,
    pretty: bool,
}

impl JsonFiles {
    pub fn new(fs: Arc<dyn FileSystem>, service: Arc<TreeService>, pretty: bool) -> Self {
        Self { fs, service, pretty }
    }

    fn read_text(&self, path: &Path) -> InfraResult<String> {
        debug!("read: {}", path.display());
        self.fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("read {}", path.display()), e))
    }

    /// Any JSON document, e.g. a raw order payload or a mapping to diff.
    pub fn read_value(&self, path: &Path) -> InfraResult<Value> {
        let text = self.read_text(path)?;
        serde_json::from_str(&text).map_err(|source| InfraError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// A validated tree snapshot.
    pub fn read_tree(&self, path: &Path) -> InfraResult<Tree> {
        let text = self.read_text(path)?;
        Ok(self.service.load(&text)?)
    }

    pub fn read_operation(&self, path: &Path) -> InfraResult<OperationDescriptor> {
        let text = self.read_text(path)?;
        Ok(self.service.parse_operation(&text)?)
    }

    /// Serialize with the configured formatting.
    pub fn to_json<T: Serialize>(&self, value: &T) -> InfraResult<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.map_err(|e| InfraError::io("serialize JSON", std::io::Error::other(e)))
    }

    pub fn write_tree(&self, path: &Path, tree: &Tree) -> InfraResult<()> {
        let mut text = self.to_json(tree)?;
        text.push('\n');
        self.fs
            .write(path, &text)
            .map_err(|e| InfraError::io(format!("write {}", path.display()), e))
    }
}
