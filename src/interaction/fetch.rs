//! Background text requests with a single pending-result slot.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::error::ServiceError;
use crate::services::TextGenerator;

type Slot = Arc<Mutex<Option<Result<String, ServiceError>>>>;

/// At most one outstanding text request, polled from the game thread.
///
/// The worker and the owner share the slot, so a fetch whose owner is torn
/// down mid-flight still completes; its result is simply never read.
#[derive(Debug, Default)]
pub struct TextFetch {
    pending: Option<Slot>,
}

impl TextFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a request on a worker thread. Returns `false`, doing nothing, while one is outstanding.
    pub fn request(&mut self, generator: &Arc<dyn TextGenerator>, prompt: impl Into<String>) -> bool {
        if self.in_flight() {
            trace!("Fetch already in flight, request ignored");
            return false;
        }

        let slot: Slot = Arc::new(Mutex::new(None));
        let writer = Arc::clone(&slot);
        let generator = Arc::clone(generator);
        let prompt = prompt.into();

        let spawned = thread::Builder::new()
            .name("text-fetch".into())
            .spawn(move || {
                let result = generator.generate(&prompt);
                *writer.lock() = Some(result);
            });

        if let Err(error) = spawned {
            warn!(%error, "Failed to spawn text fetch worker");
            *slot.lock() = Some(Err(ServiceError::Unavailable));
        }

        self.pending = Some(slot);
        true
    }

    /// Takes the result if the worker has finished. Never blocks.
    pub fn poll(&mut self) -> Option<Result<String, ServiceError>> {
        let result = self.pending.as_ref()?.lock().take()?;
        self.pending = None;
        Some(result)
    }

    /// Forgets the outstanding request; a late result is dropped with the slot.
    pub fn abandon(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::CannedText;

    fn wait(fetch: &mut TextFetch) -> Result<String, ServiceError> {
        for _ in 0..500 {
            if let Some(result) = fetch.poll() {
                return result;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("fetch never completed");
    }

    #[test]
    fn test_second_request_is_rejected_while_in_flight() {
        let generator: Arc<dyn TextGenerator> = Arc::new(CannedText::new(["first", "second"]));
        let mut fetch = TextFetch::new();
        assert!(fetch.request(&generator, "a"));
        assert!(!fetch.request(&generator, "b"));
        assert_eq!(wait(&mut fetch).unwrap(), "first");
        assert!(!fetch.in_flight());
        assert!(fetch.request(&generator, "c"));
        assert_eq!(wait(&mut fetch).unwrap(), "second");
    }
}
