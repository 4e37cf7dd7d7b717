use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use serde_json::{json, Value};

use crate::error::ServiceError;
use crate::services::{Persistence, TextGenerator};

/// In-process document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryStore {
    /// A store pre-seeded with the quiz questions the offline game uses.
    pub fn with_sample_questions() -> Self {
        let store = Self::default();
        let questions = [
            (
                "1",
                "What does it mean to know that you know nothing?",
                "humility, Socrates, limits of knowledge",
            ),
            (
                "2",
                "Why might a machine that passes every test still not understand?",
                "Chinese room, syntax versus semantics, understanding",
            ),
        ];
        for (id, text, keywords) in questions {
            store.documents.write().insert(
                ("ai_questions".to_string(), id.to_string()),
                json!({ "question_text": text, "answer_keywords": keywords }),
            );
        }
        store
    }

    /// Writes every document the target does not already hold.
    pub fn copy_missing_into(&self, target: &dyn Persistence) -> Result<usize, ServiceError> {
        let mut copied = 0;
        for ((collection, key), value) in self.documents.read().iter() {
            if target.read(collection, key)?.is_none() {
                target.write(collection, key, value.clone())?;
                copied += 1;
            }
        }
        Ok(copied)
    }
}

impl Persistence for MemoryStore {
    fn read(&self, collection: &str, key: &str) -> Result<Option<Value>, ServiceError> {
        Ok(self
            .documents
            .read()
            .get(&(collection.to_string(), key.to_string()))
            .cloned())
    }

    fn write(&self, collection: &str, key: &str, value: Value) -> Result<(), ServiceError> {
        self.documents
            .write()
            .insert((collection.to_string(), key.to_string()), value);
        Ok(())
    }
}

/// Cycles through a fixed list of replies, ignoring the prompt.
#[derive(Debug)]
pub struct CannedText {
    replies: Vec<String>,
    next: AtomicUsize,
}

impl CannedText {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            next: AtomicUsize::new(0),
        }
    }
}

impl Default for CannedText {
    fn default() -> Self {
        Self::new([
            "Why did the wizard refuse to play cards? Too many tricks up his sleeve.",
            "If a tree falls and nobody measures it, is it still data?",
            "CORRECT. A fine answer.",
        ])
    }
}

impl TextGenerator for CannedText {
    fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
        if self.replies.is_empty() {
            return Err(ServiceError::Unavailable);
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.replies.len();
        Ok(self.replies[index].clone())
    }
}
