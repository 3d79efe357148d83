//! Placement validation and repair.
//!
//! A placement is valid when the shape lies fully inside the playfield and
//! intersects no wall. When a shape is invalid, [`Map::find_valid_placement`]
//! runs a bounded greedy search: for every wall near the shape it generates
//! twelve candidate positions sized to the shape, keeps the valid ones, and
//! returns the candidate nearest the original position. Deterministic and
//! local by design — not globally optimal.

use glam::Vec2;
use loam::Rect;

use crate::map::Map;

/// How far around a shape's bounds the repair search gathers walls.
pub const PLACEMENT_PADDING: f32 = 128.0;

impl Map {
    /// True iff `rect` is fully inside `[0,width) x [0,height)` and
    /// intersects no wall shape.
    #[must_use]
    pub fn is_valid_placement(&self, rect: Rect) -> bool {
        self.bounds().contains_rect(&rect) && self.walls_in(rect).is_empty()
    }

    /// Find a valid position for `shape`, repairing it if necessary.
    ///
    /// An already-valid shape is returned unchanged. Otherwise every wall
    /// within [`PLACEMENT_PADDING`] of the shape contributes twelve
    /// candidate min-corner positions (see [`candidate_positions`]); of the
    /// candidates that are themselves valid placements, the one with the
    /// smallest Euclidean distance to `shape`'s min corner wins, ties going
    /// to the earliest generated. Returns `None` when no candidate is
    /// valid — the expected outcome for a shape buried in geometry, not an
    /// error.
    #[must_use]
    pub fn find_valid_placement(&self, shape: Rect) -> Option<Vec2> {
        if self.is_valid_placement(shape) {
            return Some(shape.min);
        }

        let mut best: Option<(f32, Vec2)> = None;
        for wall_id in self.walls_in(shape.inflated(PLACEMENT_PADDING)) {
            let Some(wall) = self.get(wall_id) else {
                continue;
            };
            for candidate in candidate_positions(&shape, &wall.shape()) {
                if !self.is_valid_placement(shape.at(candidate)) {
                    continue;
                }
                // Squared distance preserves the ordering; strict less-than
                // keeps the earliest-generated candidate on ties
                let distance = candidate.distance_squared(shape.min);
                if best.map_or(true, |(b, _)| distance < b) {
                    best = Some((distance, candidate));
                }
            }
        }
        best.map(|(_, position)| position)
    }
}

/// The twelve candidate min-corner positions `shape` could take around one
/// wall.
///
/// Four side positions keep the shape's own coordinate on the other axis;
/// the remaining eight align the shape to the wall's near or far edge on
/// each of the four sides.
#[must_use]
pub fn candidate_positions(shape: &Rect, wall: &Rect) -> [Vec2; 12] {
    let (w, h) = (shape.size.x, shape.size.y);
    let above = wall.min.y - h;
    let below = wall.max().y;
    let left = wall.min.x - w;
    let right = wall.max().x;
    [
        // Directly above/below/left/right, unaligned to wall edges
        Vec2::new(shape.min.x, above),
        Vec2::new(shape.min.x, below),
        Vec2::new(left, shape.min.y),
        Vec2::new(right, shape.min.y),
        // Above/below, aligned to the wall's left then right edge
        Vec2::new(wall.min.x, above),
        Vec2::new(wall.max().x - w, above),
        Vec2::new(wall.min.x, below),
        Vec2::new(wall.max().x - w, below),
        // Left/right, aligned to the wall's top then bottom edge
        Vec2::new(left, wall.min.y),
        Vec2::new(left, wall.max().y - h),
        Vec2::new(right, wall.min.y),
        Vec2::new(right, wall.max().y - h),
    ]
}
