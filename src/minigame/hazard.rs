use glam::{UVec2, Vec2};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use crate::constants::minigame;
use crate::geometry::Rect;
use crate::map::direction::{Direction, DIRECTIONS};
use crate::map::grid::CollisionMap;

/// A square obstacle bouncing around the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Hazard {
    /// Center, in world pixels.
    pub position: Vec2,
    pub direction: Direction,
    /// Ticks until the next spontaneous turn.
    turn_countdown: u32,
}

fn turn_delay(rng: &mut dyn RngCore) -> u32 {
    rng.random_range(minigame::TURN_TICKS.0..=minigame::TURN_TICKS.1)
}

impl Hazard {
    pub fn new(position: Vec2, direction: Direction, turn_countdown: u32) -> Self {
        Self {
            position,
            direction,
            turn_countdown: turn_countdown.max(1),
        }
    }

    /// A hazard at `position` heading in a random direction.
    pub fn random(position: Vec2, rng: &mut dyn RngCore) -> Self {
        let direction = DIRECTIONS.choose(&mut *rng).copied().unwrap_or(Direction::Right);
        Self::new(position, direction, turn_delay(rng))
    }

    pub fn turn_countdown(&self) -> u32 {
        self.turn_countdown
    }

    /// Moves `speed` pixels along the current direction.
    ///
    /// If the leading edge would leave walkable ground (or the world), the hazard
    /// stays put and reverses instead. Independently, the turn countdown forces a
    /// random new heading when it runs out.
    pub fn advance(&mut self, speed: f32, arena: &CollisionMap, world: UVec2, rng: &mut dyn RngCore) {
        let step = self.direction.as_vec2() * speed;
        let next = self.position + step;
        let leading = next + self.direction.as_vec2() * minigame::HAZARD_HALF_SIZE;

        let half = minigame::HAZARD_HALF_SIZE;
        let inside = next.x >= half && next.y >= half && next.x <= world.x as f32 - half && next.y <= world.y as f32 - half;

        if inside && arena.walkable(leading.x.floor() as i32, leading.y.floor() as i32) {
            self.position = next;
        } else {
            self.direction = self.direction.opposite();
        }

        self.turn_countdown = self.turn_countdown.saturating_sub(1);
        if self.turn_countdown == 0 {
            if let Some(direction) = DIRECTIONS.choose(&mut *rng) {
                self.direction = *direction;
            }
            self.turn_countdown = turn_delay(rng);
        }
    }

    /// Whether the hazard's square touches the player's hit box.
    ///
    /// The hit box is the sprite rectangle shrunk by the minigame margins; edges touching count.
    pub fn hits(&self, player: &Rect) -> bool {
        let hitbox = player.inset(
            minigame::PLAYER_MARGIN_LEFT,
            minigame::PLAYER_MARGIN_RIGHT,
            minigame::PLAYER_MARGIN_TOP,
            minigame::PLAYER_MARGIN_BOTTOM,
        );
        let half = minigame::HAZARD_HALF_SIZE;
        let (left, right) = (self.position.x - half, self.position.x + half);
        let (top, bottom) = (self.position.y - half, self.position.y + half);

        right >= hitbox.left() as f32
            && left <= hitbox.right() as f32
            && bottom >= hitbox.top() as f32
            && top <= hitbox.bottom() as f32
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::map::grid::TileGrid;

    fn open_arena() -> CollisionMap {
        let rows = vec![vec![0u8; 10]; 10];
        CollisionMap::new(TileGrid::from_collision_rows(&rows).unwrap(), 64)
    }

    #[test]
    fn test_hazard_reverses_at_world_edge() {
        let arena = open_arena();
        let mut rng = StdRng::seed_from_u64(1);
        let mut hazard = Hazard::new(Vec2::new(21.0, 300.0), Direction::Left, 100);
        hazard.advance(2.0, &arena, UVec2::new(640, 640), &mut rng);
        assert_eq!(hazard.position, Vec2::new(21.0, 300.0));
        assert_eq!(hazard.direction, Direction::Right);
    }

    #[test]
    fn test_hazard_reverses_at_inner_wall() {
        let mut rows = vec![vec![0u8; 10]; 10];
        rows[4][5] = 1;
        let arena = CollisionMap::new(TileGrid::from_collision_rows(&rows).unwrap(), 64);
        let mut rng = StdRng::seed_from_u64(1);

        // The leading edge would cross into the wall tile starting at x = 320.
        let mut hazard = Hazard::new(Vec2::new(300.0, 288.0), Direction::Right, 100);
        hazard.advance(2.0, &arena, UVec2::new(640, 640), &mut rng);
        assert_eq!(hazard.position, Vec2::new(300.0, 288.0));
        assert_eq!(hazard.direction, Direction::Left);

        hazard.advance(2.0, &arena, UVec2::new(640, 640), &mut rng);
        assert_eq!(hazard.position, Vec2::new(298.0, 288.0));
    }

    #[test]
    fn test_turn_countdown_rearms_after_firing() {
        let arena = open_arena();
        let mut rng = StdRng::seed_from_u64(9);

        let mut hazard = Hazard::new(Vec2::new(320.0, 320.0), Direction::Up, 100);
        hazard.advance(2.0, &arena, UVec2::new(640, 640), &mut rng);
        assert_eq!(hazard.turn_countdown(), 99);

        let mut hazard = Hazard::new(Vec2::new(320.0, 320.0), Direction::Up, 1);
        hazard.advance(2.0, &arena, UVec2::new(640, 640), &mut rng);
        assert_eq!(hazard.position, Vec2::new(320.0, 318.0));
        let (low, high) = minigame::TURN_TICKS;
        assert!((low..=high).contains(&hazard.turn_countdown()));
    }

    #[test]
    fn test_hit_uses_inset_box() {
        let player = Rect::new(100, 100, 128, 128);
        // Left edge of the hit box is x = 137; a hazard ending at 136 misses.
        assert!(!Hazard::new(Vec2::new(116.0, 160.0), Direction::Up, 10).hits(&player));
        assert!(Hazard::new(Vec2::new(117.0, 160.0), Direction::Up, 10).hits(&player));
    }
}
