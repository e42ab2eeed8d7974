//! Box overlap and four-sided platform resolution.
//!
//! Everything here is pure: the engine decides what to do with the side
//! that comes back.

use crate::arena::Live;
use crate::entities::Platform;
use crate::geometry::{Rect, Vec2};

/// Maximum top penetration still treated as a landing.
pub const PLATFORM_TOLERANCE: f32 = 20.0;

/// Which face of the static box the mover hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.overlaps(b)
}

/// Resolve a mover against a static box it overlaps.
///
/// The side with the smallest penetration is the candidate. Sides are tried
/// in the order top, bottom, left, right; a side is only considered when its
/// penetration equals the minimum, and only accepted when the mover's velocity
/// points into it. When the minimum side is rejected there is no fallback to a
/// deeper side: the result is `None` and the mover passes through.
pub fn resolve_platform_side(
    mover: &Rect,
    velocity: Vec2,
    platform: &Rect,
    tolerance: f32,
) -> Option<Side> {
    if !mover.overlaps(platform) {
        return None;
    }

    let from_left = mover.right() - platform.x;
    let from_right = platform.right() - mover.x;
    let from_top = mover.bottom() - platform.y;
    let from_bottom = platform.bottom() - mover.y;

    let min = from_left.min(from_right).min(from_top).min(from_bottom);

    if min == from_top && velocity.y >= 0.0 && from_top < tolerance {
        Some(Side::Top)
    } else if min == from_bottom && velocity.y < 0.0 {
        Some(Side::Bottom)
    } else if min == from_left && velocity.x > 0.0 {
        Some(Side::Left)
    } else if min == from_right && velocity.x < 0.0 {
        Some(Side::Right)
    } else {
        None
    }
}

/// True when the mover rests on top of any platform that is still standing.
pub fn is_grounded<'a, I>(mover: &Rect, velocity: Vec2, platforms: I) -> bool
where
    I: IntoIterator<Item = &'a Platform>,
{
    platforms
        .into_iter()
        .filter(|p| p.is_live())
        .any(|p| {
            resolve_platform_side(mover, velocity, &p.body, PLATFORM_TOLERANCE) == Some(Side::Top)
        })
}
