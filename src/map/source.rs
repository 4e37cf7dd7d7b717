//! Where map records come from.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::asset::{embedded_map_names, get_map_bytes};
use crate::error::MapError;
use crate::map::record::MapRecord;

/// A provider of map records, queried by map name.
///
/// The map manager asks again on hot reload, so implementations should
/// return the current authoring data rather than a cached copy.
pub trait MapSource: Send + Sync {
    fn load(&self, name: &str) -> Result<MapRecord, MapError>;

    /// Every map name this source can provide.
    fn names(&self) -> Vec<String>;
}

impl<S: MapSource + ?Sized> MapSource for Arc<S> {
    fn load(&self, name: &str) -> Result<MapRecord, MapError> {
        (**self).load(name)
    }

    fn names(&self) -> Vec<String> {
        (**self).names()
    }
}

fn parse(name: &str, bytes: &[u8]) -> Result<MapRecord, MapError> {
    serde_json::from_slice(bytes).map_err(|source| MapError::Json {
        name: name.to_string(),
        source,
    })
}

/// Maps compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedMaps;

impl MapSource for EmbeddedMaps {
    fn load(&self, name: &str) -> Result<MapRecord, MapError> {
        let bytes = get_map_bytes(name)?;
        parse(name, &bytes)
    }

    fn names(&self) -> Vec<String> {
        embedded_map_names()
    }
}

/// Maps read from `<root>/<name>.json` on every load; used while authoring maps.
#[derive(Debug, Clone)]
pub struct DirectoryMaps {
    root: PathBuf,
}

impl DirectoryMaps {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MapSource for DirectoryMaps {
    fn load(&self, name: &str) -> Result<MapRecord, MapError> {
        let path = self.root.join(format!("{name}.json"));
        debug!(path = %path.display(), "Reading map record");
        let bytes = fs::read(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => MapError::UnknownMap(name.to_string()),
            _ => MapError::Io {
                name: name.to_string(),
                source,
            },
        })?;
        parse(name, &bytes)
    }

    fn names(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        names
    }
}

/// Records held in memory; tests swap entries to simulate an edited map file.
#[derive(Debug, Default)]
pub struct MemoryMaps {
    records: RwLock<HashMap<String, MapRecord>>,
}

impl MemoryMaps {
    pub fn new(records: impl IntoIterator<Item = MapRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|record| (record.name.clone(), record)).collect()),
        }
    }

    /// Replaces (or adds) the record stored under its own name.
    pub fn replace(&self, record: MapRecord) {
        self.records.write().insert(record.name.clone(), record);
    }
}

impl MapSource for MemoryMaps {
    fn load(&self, name: &str) -> Result<MapRecord, MapError> {
        self.records
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| MapError::UnknownMap(name.to_string()))
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.read().keys().cloned().collect();
        names.sort();
        names
    }
}
