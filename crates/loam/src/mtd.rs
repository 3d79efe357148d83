//! Penetration and minimum-translation-distance math for rect pairs.
//!
//! The narrow phase of collision resolution: given two overlapping rects,
//! compute the signed per-axis pushes that would separate them, and from
//! those the minimum translation distance (MTD) — the smallest vector that
//! moves the first rect out of the second along the axis of least
//! penetration.

use glam::Vec2;

use crate::Rect;

/// Signed per-axis separation pushes for an overlapping rect pair.
///
/// Each component is the full translation along that axis alone that clears
/// the overlap. The push on each axis is the smaller-magnitude of the two
/// edge-to-edge separations, so a rect buried deep inside another is pushed
/// out of the nearer side. A `Penetration` only exists for strictly
/// overlapping pairs, so both components are non-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Signed push along the x axis that separates the pair.
    pub x: f32,
    /// Signed push along the y axis that separates the pair.
    pub y: f32,
}

impl Penetration {
    /// The minimum translation distance: the smaller-magnitude axis push.
    ///
    /// Equal penetration on both axes resolves along x, so the result is
    /// deterministic for symmetric overlaps.
    #[must_use]
    pub fn min_axis(&self) -> Vec2 {
        if self.x.abs() <= self.y.abs() {
            Vec2::new(self.x, 0.0)
        } else {
            Vec2::new(0.0, self.y)
        }
    }
}

/// Compute the signed per-axis penetration of `a` into `b`.
///
/// Returns `None` when the rects do not strictly overlap (touching edges
/// do not count). On each axis the push is edge-to-edge toward the nearer
/// side of `b`: comparing centers picks exactly the smaller-magnitude
/// separation. When the centers coincide on an axis, the push is toward
/// positive.
#[must_use]
pub fn penetration(a: &Rect, b: &Rect) -> Option<Penetration> {
    if !a.intersects(b) {
        return None;
    }

    let x = if a.center().x < b.center().x {
        b.min.x - a.max().x
    } else {
        b.max().x - a.min.x
    };
    let y = if a.center().y < b.center().y {
        b.min.y - a.max().y
    } else {
        b.max().y - a.min.y
    };
    Some(Penetration { x, y })
}

/// Minimum translation distance moving `a` out of `b`.
///
/// Returns `None` when the rects do not strictly overlap; otherwise the
/// returned vector is non-zero and `a.translated(mtd)` clears the overlap
/// (up to floating-point rounding).
#[must_use]
pub fn mtd(a: &Rect, b: &Rect) -> Option<Vec2> {
    penetration(a, b).map(|p| p.min_axis())
}
