use std::collections::HashMap;

use bevy_ecs::resource::Resource;
use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::constants::RESET_BUFFER;
use crate::error::InteractionError;
use crate::interaction::Interactable;

/// The registered objects for the active map, and which one (if any) is eligible.
///
/// Registration order is the tie-break: when several circles contain the
/// player, the earliest registered untouched one wins.
#[derive(Resource, Debug, Default)]
pub struct InteractionManager {
    objects: Vec<Box<dyn Interactable>>,
    /// `true` once the player has interacted during the current visit.
    flags: HashMap<String, bool>,
    eligible: Option<usize>,
}

impl InteractionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an object. Invalid objects are rejected with a warning and not registered.
    pub fn add(&mut self, object: Box<dyn Interactable>) -> Result<(), InteractionError> {
        let id = object.id().to_string();
        let radius = object.properties().radius;

        let rejection = if id.is_empty() {
            Some(InteractionError::EmptyId)
        } else if self.flags.contains_key(&id) {
            Some(InteractionError::DuplicateId(id.clone()))
        } else if !radius.is_finite() || radius <= 0.0 {
            Some(InteractionError::InvalidRadius { id: id.clone(), radius })
        } else {
            None
        };
        if let Some(error) = rejection {
            warn!(%error, "Interactable rejected");
            return Err(error);
        }

        debug!(id = %id, "Interactable registered");
        self.flags.insert(id, false);
        self.objects.push(object);
        Ok(())
    }

    /// Unregisters and returns the object with `id`. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> Option<Box<dyn Interactable>> {
        let index = self.objects.iter().position(|object| object.id() == id)?;
        let removed = self.objects.remove(index);
        self.flags.remove(id);

        self.eligible = match self.eligible {
            Some(current) if current == index => {
                debug!(id, "Removed the eligible interactable");
                None
            }
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
        Some(removed)
    }

    /// Unregisters everything, returning the objects in registration order.
    pub fn drain(&mut self) -> Vec<Box<dyn Interactable>> {
        self.flags.clear();
        self.eligible = None;
        std::mem::take(&mut self.objects)
    }

    /// Recomputes the eligible object for a player centered at `player_center`.
    pub fn update(&mut self, player_center: Vec2) {
        self.eligible = None;

        for (index, object) in self.objects.iter().enumerate() {
            let properties = object.properties();
            let distance = player_center.distance(properties.center);
            let interacted = self.flags.get(&properties.id).copied().unwrap_or(false);

            if distance < properties.radius {
                if !interacted {
                    self.eligible = Some(index);
                    break;
                }
            } else if distance >= properties.radius + RESET_BUFFER && interacted {
                trace!(id = %properties.id, "Interaction flag reset");
                self.flags.insert(properties.id, false);
            }
        }
    }

    pub fn eligible(&self) -> Option<&dyn Interactable> {
        self.eligible.and_then(|index| self.objects.get(index)).map(|object| object.as_ref())
    }

    pub fn eligible_mut(&mut self) -> Option<&mut Box<dyn Interactable>> {
        self.eligible.and_then(|index| self.objects.get_mut(index))
    }

    pub fn eligible_id(&self) -> Option<&str> {
        self.eligible().map(|object| object.id())
    }

    /// Unknown ids report `true`, so a lookup bug hides a circle instead of re-triggering it.
    pub fn get_flag(&self, id: &str) -> bool {
        self.flags.get(id).copied().unwrap_or(true)
    }

    pub fn set_flag(&mut self, id: &str, interacted: bool) {
        match self.flags.get_mut(id) {
            Some(flag) => {
                *flag = interacted;
                if interacted && self.eligible_id() == Some(id) {
                    self.eligible = None;
                }
            }
            None => warn!(id, "Tried to set interaction flag for unknown id"),
        }
    }

    pub fn get(&self, id: &str) -> Option<&dyn Interactable> {
        self.objects.iter().find(|object| object.id() == id).map(|object| object.as_ref())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Box<dyn Interactable>> {
        self.objects.iter_mut().find(|object| object.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.flags.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Interactable> {
        self.objects.iter().map(|object| object.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Interactable>> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
