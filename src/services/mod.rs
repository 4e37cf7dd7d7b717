//! External collaborators the runtime consumes but does not implement.
//!
//! The shipped game talks to a hosted language model and a document
//! database; this crate only sees the two traits below. Failures are always
//! recoverable: callers substitute an in-character line or skip the write.

use std::sync::Arc;

use bevy_ecs::resource::Resource;
use serde_json::Value;

use crate::error::ServiceError;

pub mod file;
pub mod memory;
pub mod progress;

pub use file::FileStore;
pub use memory::{CannedText, MemoryStore};
pub use progress::ProgressStore;

/// Produces free-form text for a prompt. May block; callers run it off the game thread.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// Key/value document storage, addressed by collection and key.
pub trait Persistence: Send + Sync {
    fn read(&self, collection: &str, key: &str) -> Result<Option<Value>, ServiceError>;

    fn write(&self, collection: &str, key: &str, value: Value) -> Result<(), ServiceError>;
}

/// The pair of collaborators handed to the game at construction.
#[derive(Resource, Clone)]
pub struct Services {
    pub text: Arc<dyn TextGenerator>,
    pub store: Arc<dyn Persistence>,
}

impl Services {
    pub fn new(text: Arc<dyn TextGenerator>, store: Arc<dyn Persistence>) -> Self {
        Self { text, store }
    }

    /// Canned text and an in-memory store holding the sample quiz questions.
    pub fn offline() -> Self {
        Self::new(Arc::new(CannedText::default()), Arc::new(MemoryStore::with_sample_questions()))
    }

    /// Canned text with documents kept under `root`.
    ///
    /// The sample quiz questions are written into the store when it has none yet.
    pub fn offline_in(root: impl Into<std::path::PathBuf>) -> Result<Self, ServiceError> {
        let store = FileStore::new(root);
        MemoryStore::with_sample_questions().copy_missing_into(&store)?;
        Ok(Self::new(Arc::new(CannedText::default()), Arc::new(store)))
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
