//! The timed survival minigame.
//!
//! `Inactive -> Active (frozen, then running) -> Resolving -> Inactive`. The
//! outcome is handed back from [`MinigameEngine::update`] exactly once, after
//! the result has been on screen for [`minigame::RESULT_DISPLAY_MS`].

use bevy_ecs::resource::Resource;
use glam::{UVec2, Vec2};
use rand::seq::IndexedRandom;
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::constants::minigame;
use crate::geometry::Rect;
use crate::map::grid::CollisionMap;

pub mod hazard;

pub use hazard::Hazard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinigameOutcome {
    /// Survived the whole duration; carries the pending reward.
    Success { reward: u32 },
    /// Touched by a hazard.
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinigamePhase {
    #[default]
    Inactive,
    Active,
    Resolving {
        outcome: MinigameOutcome,
        until: u64,
    },
}

#[derive(Resource, Debug, Clone)]
pub struct MinigameEngine {
    phase: MinigamePhase,
    started_at: u64,
    duration: u64,
    speed: f32,
    speed_level: u64,
    hazards: Vec<Hazard>,
    reward: u32,
    banner_until: Option<u64>,
}

impl Default for MinigameEngine {
    fn default() -> Self {
        Self::new(minigame::DURATION_MS)
    }
}

impl MinigameEngine {
    pub fn new(duration: u64) -> Self {
        Self {
            phase: MinigamePhase::Inactive,
            started_at: 0,
            duration,
            speed: minigame::BASE_SPEED,
            speed_level: 0,
            hazards: Vec::new(),
            reward: 0,
            banner_until: None,
        }
    }

    pub fn phase(&self) -> MinigamePhase {
        self.phase
    }

    /// True from `start` until the outcome has been reported; the player is driven by the minigame meanwhile.
    pub fn is_active(&self) -> bool {
        self.phase != MinigamePhase::Inactive
    }

    pub fn is_frozen(&self, now: u64) -> bool {
        self.phase == MinigamePhase::Active && now.saturating_sub(self.started_at) < minigame::GRACE_MS
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn pending_reward(&self) -> u32 {
        self.reward
    }

    pub fn remaining_ms(&self, now: u64) -> u64 {
        match self.phase {
            MinigamePhase::Active => self.duration.saturating_sub(now.saturating_sub(self.started_at)),
            _ => 0,
        }
    }

    /// The "speed increased" banner, while it is showing.
    pub fn speed_banner(&self, now: u64) -> Option<String> {
        self.banner_until
            .filter(|until| now < *until)
            .map(|_| format!("Speed increased! ({:.1})", self.speed))
    }

    /// The result announcement, while resolving.
    pub fn result_text(&self) -> Option<String> {
        match self.phase {
            MinigamePhase::Resolving {
                outcome: MinigameOutcome::Success { reward },
                ..
            } => Some(format!("You survived! +{reward} Wisdom Point{}", if reward == 1 { "" } else { "s" })),
            MinigamePhase::Resolving {
                outcome: MinigameOutcome::Failure,
                ..
            } => Some("You were caught! -1 Wisdom Point".to_string()),
            _ => None,
        }
    }

    /// Begins a round, frozen for the grace window. Always spawns at least one hazard.
    pub fn start(&mut self, reward: u32, player: Rect, arena: &CollisionMap, now: u64, rng: &mut dyn RngCore) {
        if self.is_active() {
            warn!("Minigame restarted while a round was still running");
        }
        self.phase = MinigamePhase::Active;
        self.started_at = now;
        self.speed = minigame::BASE_SPEED;
        self.speed_level = 0;
        self.banner_until = None;
        self.reward = reward;
        self.hazards = spawn_hazards(&player, arena, rng);
        info!(hazards = self.hazards.len(), reward, "Minigame started");
    }

    /// Advances one tick. Returns the outcome once, when the result announcement ends.
    pub fn update(
        &mut self,
        player: Rect,
        world: UVec2,
        arena: &CollisionMap,
        now: u64,
        rng: &mut dyn RngCore,
    ) -> Option<MinigameOutcome> {
        match self.phase {
            MinigamePhase::Inactive => None,
            MinigamePhase::Resolving { outcome, until } => {
                if now < until {
                    return None;
                }
                self.phase = MinigamePhase::Inactive;
                self.hazards.clear();
                self.banner_until = None;
                debug!(?outcome, "Minigame outcome reported");
                Some(outcome)
            }
            MinigamePhase::Active => {
                let elapsed = now.saturating_sub(self.started_at);
                if elapsed >= self.duration {
                    self.resolve(MinigameOutcome::Success { reward: self.reward }, now);
                    return None;
                }

                if elapsed >= minigame::GRACE_MS {
                    self.escalate(elapsed, now);
                    for hazard in &mut self.hazards {
                        hazard.advance(self.speed, arena, world, rng);
                    }
                }

                if self.hazards.iter().any(|hazard| hazard.hits(&player)) {
                    self.resolve(MinigameOutcome::Failure, now);
                }
                None
            }
        }
    }

    fn escalate(&mut self, elapsed: u64, now: u64) {
        let level = (elapsed - minigame::GRACE_MS) / minigame::SPEED_INTERVAL_MS;
        if level > self.speed_level {
            self.speed_level = level;
            self.speed = minigame::BASE_SPEED + minigame::SPEED_INCREMENT * level as f32;
            self.banner_until = Some(now + minigame::SPEED_BANNER_MS);
            info!(speed = self.speed, "Hazard speed increased");
        }
    }

    fn resolve(&mut self, outcome: MinigameOutcome, now: u64) {
        info!(?outcome, "Minigame resolved");
        self.phase = MinigamePhase::Resolving {
            outcome,
            until: now + minigame::RESULT_DISPLAY_MS,
        };
    }
}

/// Eight anchor points near the arena's edges, one tile and a half in from the walls.
fn perimeter_anchors(arena: &CollisionMap) -> [Vec2; 8] {
    let size = arena.pixel_size().as_vec2();
    let margin = arena.tile_size() as f32 * 1.5;
    let (far_x, far_y) = (size.x - margin, size.y - margin);
    let (mid_x, mid_y) = (size.x / 2.0, size.y / 2.0);
    [
        Vec2::new(margin, margin),
        Vec2::new(far_x, margin),
        Vec2::new(margin, far_y),
        Vec2::new(far_x, far_y),
        Vec2::new(mid_x, margin),
        Vec2::new(mid_x, far_y),
        Vec2::new(margin, mid_y),
        Vec2::new(far_x, mid_y),
    ]
}

/// Places hazards on walkable tiles far enough from the player, falling back to
/// perimeter anchors and finally to a single point one safety distance away.
pub fn spawn_hazards(player: &Rect, arena: &CollisionMap, rng: &mut dyn RngCore) -> Vec<Hazard> {
    let origin = player.center_f32();
    let safe = |point: Vec2| point.distance(origin) > minigame::MIN_SPAWN_DISTANCE;
    let mut hazards: Vec<Hazard> = Vec::with_capacity(minigame::HAZARD_COUNT);

    let tiles: Vec<_> = arena
        .base()
        .walkable_tiles()
        .filter(|tile| arena.tile_walkable(*tile))
        .collect();
    for _ in 0..minigame::SPAWN_ATTEMPTS {
        if hazards.len() >= minigame::HAZARD_COUNT {
            break;
        }
        let Some(tile) = tiles.choose(&mut *rng) else {
            break;
        };
        let point = arena.tile_center(*tile).as_vec2();
        if safe(point) && hazards.iter().all(|hazard| hazard.position != point) {
            hazards.push(Hazard::random(point, rng));
        }
    }

    if hazards.len() < minigame::HAZARD_COUNT {
        debug!(found = hazards.len(), "Falling back to perimeter anchors");
        for anchor in perimeter_anchors(arena) {
            if hazards.len() >= minigame::HAZARD_COUNT {
                break;
            }
            let walkable = arena.walkable(anchor.x as i32, anchor.y as i32);
            if walkable && safe(anchor) && hazards.iter().all(|hazard| hazard.position != anchor) {
                hazards.push(Hazard::random(anchor, rng));
            }
        }
    }

    if hazards.is_empty() {
        let point = last_resort_point(origin, arena.pixel_size());
        warn!(x = point.x, y = point.y, "No safe spawn found, placing a single hazard");
        hazards.push(Hazard::random(point, rng));
    }

    hazards
}

/// One safety distance from `origin` along whichever axis stays inside the arena, clamped to its bounds.
fn last_resort_point(origin: Vec2, size: UVec2) -> Vec2 {
    let distance = minigame::MIN_SPAWN_DISTANCE;
    let half = minigame::HAZARD_HALF_SIZE;
    let max = (size.as_vec2() - Vec2::splat(half)).max(Vec2::splat(half));
    let candidates = [
        origin + Vec2::new(distance, 0.0),
        origin - Vec2::new(distance, 0.0),
        origin + Vec2::new(0.0, distance),
        origin - Vec2::new(0.0, distance),
    ];
    let inside = |point: &Vec2| point.x >= half && point.y >= half && point.x <= max.x && point.y <= max.y;
    let point = candidates.iter().copied().find(inside).unwrap_or(candidates[0]);
    point.clamp(Vec2::splat(half), max)
}
