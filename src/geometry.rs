//! Integer pixel rectangles used for sprite boxes and hit boxes.

use glam::{IVec2, Vec2};

/// An axis-aligned rectangle in world pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.w / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }

    pub fn center(&self) -> IVec2 {
        IVec2::new(self.center_x(), self.center_y())
    }

    /// The center as a float vector, for distance checks.
    pub fn center_f32(&self) -> Vec2 {
        self.center().as_vec2()
    }

    pub fn position(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Returns a copy moved by `delta`.
    pub fn translated(&self, delta: IVec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.w, self.h)
    }

    /// Returns a copy whose center is `center`.
    pub fn with_center(&self, center: IVec2) -> Self {
        Self::new(center.x - self.w / 2, center.y - self.h / 2, self.w, self.h)
    }

    /// Strict overlap; rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right() && other.left() < self.right() && self.top() < other.bottom() && other.top() < self.bottom()
    }

    /// Shrinks each side inward by the given margins.
    pub fn inset(&self, left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self::new(self.x + left, self.y + top, self.w - left - right, self.h - top - bottom)
    }
}
