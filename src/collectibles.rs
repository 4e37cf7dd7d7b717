//! Pickups scattered over exterior maps, each respawning on a timer.

use std::collections::HashMap;

use bevy_ecs::resource::Resource;
use glam::{IVec2, UVec2};
use rand::{Rng, RngCore};
use tracing::debug;

use crate::constants::collectible;

/// What a pickup turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupEffect {
    Quiz { reward: u32 },
    Minigame { reward: u32 },
    Points(u32),
}

impl PickupEffect {
    /// Rolls the effect against `odds`; whatever chance is left over grants a plain point.
    pub fn roll(odds: &PickupOdds, rng: &mut dyn RngCore) -> Self {
        let chance: f64 = rng.random();
        if chance < odds.quiz {
            Self::Quiz {
                reward: collectible::REWARD,
            }
        } else if chance < odds.quiz + odds.minigame {
            Self::Minigame {
                reward: collectible::REWARD,
            }
        } else {
            Self::Points(collectible::REWARD)
        }
    }
}

/// Chance of a pickup opening a quiz or a minigame.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PickupOdds {
    pub quiz: f64,
    pub minigame: f64,
}

impl Default for PickupOdds {
    fn default() -> Self {
        Self {
            quiz: collectible::QUIZ_CHANCE,
            minigame: collectible::MINIGAME_CHANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    tile: UVec2,
    /// `None` while the item is on the ground.
    respawn_at: Option<u64>,
}

/// Collectible state per map, created the first time a map is seen.
#[derive(Resource, Debug, Default)]
pub struct Collectibles {
    maps: HashMap<String, Vec<Slot>>,
}

impl Collectibles {
    fn slots(&mut self, map: &str, tiles: &[UVec2]) -> &mut Vec<Slot> {
        self.maps.entry(map.to_string()).or_insert_with(|| {
            tiles
                .iter()
                .map(|tile| Slot {
                    tile: *tile,
                    respawn_at: None,
                })
                .collect()
        })
    }

    /// Brings back every item whose timer has run out.
    pub fn respawn(&mut self, map: &str, tiles: &[UVec2], now: u64) {
        for slot in self.slots(map, tiles) {
            if slot.respawn_at.is_some_and(|at| now >= at) {
                slot.respawn_at = None;
            }
        }
    }

    /// Consumes the item on `tile`, if one is there. Returns whether something was picked up.
    pub fn collect(&mut self, map: &str, tiles: &[UVec2], tile: IVec2, now: u64) -> bool {
        let Some(slot) = self
            .slots(map, tiles)
            .iter_mut()
            .find(|slot| slot.respawn_at.is_none() && slot.tile.as_ivec2() == tile)
        else {
            return false;
        };
        slot.respawn_at = Some(now + collectible::RESPAWN_MS);
        debug!(map, x = tile.x, y = tile.y, "Collectible picked up");
        true
    }

    /// Tiles currently holding an item.
    pub fn available(&self, map: &str) -> Vec<UVec2> {
        self.maps
            .get(map)
            .map(|slots| slots.iter().filter(|slot| slot.respawn_at.is_none()).map(|slot| slot.tile).collect())
            .unwrap_or_default()
    }
}
