//! Document store backed by a directory of JSON files.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use crate::error::ServiceError;
use crate::services::Persistence;

/// Stores each document at `<root>/<collection>/<key>.json`.
///
/// Writes go to a temporary file first and are renamed into place, so a crash
/// mid-save leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, collection: &str, key: &str) -> PathBuf {
        self.root.join(collection).join(format!("{key}.json"))
    }
}

fn persistence_error(action: &str, path: &std::path::Path, error: impl std::fmt::Display) -> ServiceError {
    ServiceError::Persistence(format!("{action} {}: {error}", path.display()))
}

impl Persistence for FileStore {
    fn read(&self, collection: &str, key: &str) -> Result<Option<Value>, ServiceError> {
        let path = self.document_path(collection, key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(persistence_error("reading", &path, error)),
        };
        let value = serde_json::from_slice(&bytes).map_err(|error| persistence_error("parsing", &path, error))?;
        debug!(path = %path.display(), "Loaded document");
        Ok(Some(value))
    }

    fn write(&self, collection: &str, key: &str, value: Value) -> Result<(), ServiceError> {
        let path = self.document_path(collection, key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|error| persistence_error("creating", dir, error))?;
        }

        let bytes = serde_json::to_vec_pretty(&value).map_err(|error| persistence_error("encoding", &path, error))?;
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, bytes).map_err(|error| persistence_error("writing", &temp, error))?;
        fs::rename(&temp, &path).map_err(|error| persistence_error("replacing", &path, error))?;

        debug!(path = %path.display(), "Saved document");
        Ok(())
    }
}
