//! The player's wisdom points and unlocked quotes, and their best-effort persistence.

use std::collections::BTreeSet;
use std::sync::Arc;

use bevy_ecs::resource::Resource;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::services::Persistence;

const USERS_COLLECTION: &str = "users";

/// Points and unlocked quote ids for the current player.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub points: u32,
    #[serde(default)]
    pub unlocked_quotes: BTreeSet<u32>,
}

impl PlayerProgress {
    pub fn with_points(points: u32) -> Self {
        Self {
            points,
            ..Default::default()
        }
    }

    /// Deducts `amount` if the balance covers it.
    pub fn try_spend(&mut self, amount: u32) -> bool {
        match self.points.checked_sub(amount) {
            Some(remaining) => {
                self.points = remaining;
                true
            }
            None => false,
        }
    }

    pub fn grant(&mut self, amount: u32) {
        self.points = self.points.saturating_add(amount);
    }

    /// Removes up to `amount` points, stopping at zero.
    pub fn penalize(&mut self, amount: u32) {
        self.points = self.points.saturating_sub(amount);
    }

    pub fn unlock_quote(&mut self, id: u32) -> bool {
        self.unlocked_quotes.insert(id)
    }
}

/// Reads and writes a [`PlayerProgress`] document. Every failure is logged and swallowed.
#[derive(Resource, Clone)]
pub struct ProgressStore {
    store: Arc<dyn Persistence>,
    user: String,
}

impl ProgressStore {
    pub fn new(store: Arc<dyn Persistence>, user: impl Into<String>) -> Self {
        Self {
            store,
            user: user.into(),
        }
    }

    /// Loads the stored progress; missing or unreadable documents yield a fresh player.
    pub fn load(&self) -> PlayerProgress {
        match self.store.read(USERS_COLLECTION, &self.user) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|error| {
                warn!(user = %self.user, %error, "Stored progress is malformed, starting fresh");
                PlayerProgress::default()
            }),
            Ok(None) => PlayerProgress::default(),
            Err(error) => {
                warn!(user = %self.user, %error, "Failed to load progress, starting fresh");
                PlayerProgress::default()
            }
        }
    }

    /// Writes the progress; returns whether the write happened.
    pub fn save(&self, progress: &PlayerProgress) -> bool {
        let value = match serde_json::to_value(progress) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "Failed to serialize progress");
                return false;
            }
        };
        match self.store.write(USERS_COLLECTION, &self.user, value) {
            Ok(()) => {
                debug!(user = %self.user, points = progress.points, "Progress saved");
                true
            }
            Err(error) => {
                warn!(user = %self.user, %error, "Failed to save progress");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_spend_requires_full_balance() {
        let mut progress = PlayerProgress::with_points(3);
        assert!(!progress.try_spend(5));
        assert_eq!(progress.points, 3);
        assert!(progress.try_spend(3));
        assert_eq!(progress.points, 0);
    }

    #[test]
    fn test_penalize_floors_at_zero() {
        let mut progress = PlayerProgress::default();
        progress.penalize(1);
        assert_eq!(progress.points, 0);
    }
}
