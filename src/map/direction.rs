use glam::{IVec2, Vec2};
use strum_macros::{Display, EnumCount};

/// A cardinal heading in screen space, where +y points down the map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumCount)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Every heading, in the order hazards pick from.
pub const DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

impl Direction {
    /// The heading a hazard takes after bouncing off a wall.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// One pixel step along this heading.
    pub fn as_ivec2(&self) -> IVec2 {
        match self {
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
        }
    }

    pub fn as_vec2(&self) -> Vec2 {
        self.as_ivec2().as_vec2()
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

impl From<Direction> for IVec2 {
    fn from(direction: Direction) -> Self {
        direction.as_ivec2()
    }
}

#[cfg(test)]
mod tests {
    use strum::EnumCount;

    use super::*;

    #[test]
    fn test_bounce_reverses_the_step() {
        for direction in DIRECTIONS {
            assert_eq!(direction.opposite().as_ivec2(), -direction.as_ivec2());
        }
    }

    #[test]
    fn test_up_moves_toward_row_zero() {
        assert_eq!(IVec2::from(Direction::Up).y, -1);
        assert_eq!(Direction::Right.as_vec2(), Vec2::X);
    }

    #[test]
    fn test_every_heading_listed_once() {
        assert_eq!(DIRECTIONS.len(), Direction::COUNT);
        assert!(DIRECTIONS.iter().filter(|direction| direction.is_vertical()).count() == 2);
        assert_eq!(Direction::Left.to_string(), "left");
    }
}
