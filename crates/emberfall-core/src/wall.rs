//! Wall bodies and the wall-side collision resolution rule.
//!
//! Walls are immovable collision sources: they never move and they carry no
//! per-instance collision state. What varies per wall is *which directions
//! it may push a mover* — a fully solid block pushes along the axis of
//! least penetration, a one-way platform only ever pushes up.
//!
//! Map space is y-down, so `UP` pushes toward negative y.

use bitflags::bitflags;
use glam::Vec2;
use loam::Rect;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

bitflags! {
    /// Directions a wall is allowed to push a mover along.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct BlockDirs: u8 {
        /// Push movers toward negative x.
        const LEFT = 1 << 0;
        /// Push movers toward positive x.
        const RIGHT = 1 << 1;
        /// Push movers toward negative y.
        const UP = 1 << 2;
        /// Push movers toward positive y.
        const DOWN = 1 << 3;
    }
}

/// The collision-facing state of a wall entity.
///
/// A `WallBody` is pure configuration; the wall-side contact handler is
/// shared by every wall on the map rather than being per-instance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallBody {
    dirs: BlockDirs,
}

impl WallBody {
    /// A wall with an explicit set of push directions.
    #[must_use]
    pub const fn new(dirs: BlockDirs) -> Self {
        Self { dirs }
    }

    /// A fully solid wall: pushes along whichever axis penetrates least.
    #[must_use]
    pub const fn solid() -> Self {
        Self::new(BlockDirs::all())
    }

    /// A one-way platform: only ever pushes movers up.
    #[must_use]
    pub const fn platform() -> Self {
        Self::new(BlockDirs::UP)
    }

    /// The directions this wall may push along.
    #[must_use]
    pub const fn dirs(&self) -> BlockDirs {
        self.dirs
    }

    /// The wall-rule MTD for a mover overlapping this wall.
    ///
    /// Starting from the per-axis penetration, pushes in directions this
    /// wall does not block are discarded; of the remainder the least
    /// penetrated axis wins. Returns `None` when the shapes do not overlap
    /// or every escape direction is unblocked by this wall.
    #[must_use]
    pub fn resolve(&self, mover: &Rect, wall: &Rect) -> Option<Vec2> {
        let p = loam::penetration(mover, wall)?;
        let x_allowed = if p.x < 0.0 {
            self.dirs.contains(BlockDirs::LEFT)
        } else {
            self.dirs.contains(BlockDirs::RIGHT)
        };
        let y_allowed = if p.y < 0.0 {
            self.dirs.contains(BlockDirs::UP)
        } else {
            self.dirs.contains(BlockDirs::DOWN)
        };
        match (x_allowed, y_allowed) {
            (true, true) => Some(p.min_axis()),
            (true, false) => Some(Vec2::new(p.x, 0.0)),
            (false, true) => Some(Vec2::new(0.0, p.y)),
            (false, false) => None,
        }
    }

    /// Shared wall-side contact observer.
    ///
    /// Walls keep no per-instance collision state; contacts are reported to
    /// the diagnostics channel and otherwise have no effect.
    pub(crate) fn observe_contact(self, wall: EntityId, mover: EntityId, mtd: Vec2) {
        tracing::trace!(%wall, %mover, mtd_x = mtd.x, mtd_y = mtd.y, "wall contact");
    }
}

impl Default for WallBody {
    fn default() -> Self {
        Self::solid()
    }
}
