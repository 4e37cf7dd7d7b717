//! Probe-based displacement for the player and roaming NPCs.
//!
//! Only the lower half of a sprite collides, and only through a narrower "feet"
//! box: five probe points inset by a third of the width on either side.

use glam::{IVec2, UVec2};
use smallvec::SmallVec;

use crate::geometry::Rect;

/// The five collision probes for a rectangle: bottom-left, bottom-right,
/// bottom-center, mid-left and mid-right of the feet box.
pub fn foot_probes(rect: &Rect) -> SmallVec<[IVec2; 5]> {
    let inset = rect.w / 3;
    let left = rect.x + inset;
    let right = rect.x + rect.w - 1 - inset;
    let bottom = rect.y + rect.h - 1;
    let middle = rect.y + rect.h / 2;

    SmallVec::from_buf([
        IVec2::new(left, bottom),
        IVec2::new(right, bottom),
        IVec2::new(rect.center_x(), bottom),
        IVec2::new(left, middle),
        IVec2::new(right, middle),
    ])
}

/// Whether every probe of `rect` lands on a walkable pixel.
pub fn feet_clear(rect: &Rect, can_move: impl Fn(i32, i32) -> bool) -> bool {
    foot_probes(rect).iter().all(|probe| can_move(probe.x, probe.y))
}

/// Keeps a rectangle inside `[0, world - size]` on both axes.
pub fn clamp_to_world(rect: Rect, world: UVec2) -> Rect {
    let max_x = (world.x as i32 - rect.w).max(0);
    let max_y = (world.y as i32 - rect.h).max(0);
    Rect::new(rect.x.clamp(0, max_x), rect.y.clamp(0, max_y), rect.w, rect.h)
}

/// Attempts to move `rect` by `delta`.
///
/// Returns the moved (and world-clamped) rectangle, or `None` when any probe at
/// the prospective position is blocked. Both axes are rejected together; there
/// is no sliding along the free axis.
pub fn try_move(rect: Rect, delta: IVec2, world: UVec2, can_move: impl Fn(i32, i32) -> bool) -> Option<Rect> {
    let future = rect.translated(delta);
    if !feet_clear(&future, can_move) {
        return None;
    }
    Some(clamp_to_world(future, world))
}
