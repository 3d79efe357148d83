//! # Loam
//!
//! 2D spatial substrate for tile-free game worlds.
//!
//! Loam provides the geometry layer the Emberfall map core is built on:
//!
//! - [`Rect`]: axis-aligned box stored as min corner + size
//! - [`mtd`]: per-axis penetration and minimum-translation-distance math
//! - [`grid`]: a uniform bucket grid answering rectangle overlap queries
//!   with deterministic (sorted-key) results
//!
//! ## Coordinate convention
//!
//! Loam itself is axis-agnostic; consumers treat space as y-down with the
//! origin at the top-left, so "above" a rect means smaller `y`.
//!
//! ## Quick Start
//!
//! ```
//! use loam::{Rect, SpatialGrid};
//!
//! let mut grid: SpatialGrid<u64> = SpatialGrid::new();
//! grid.insert(7, Rect::new(100.0, 100.0, 50.0, 50.0));
//!
//! let hits = grid.query(Rect::new(90.0, 90.0, 20.0, 20.0));
//! assert_eq!(hits, vec![7]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod grid;
pub mod mtd;

// Re-exports for convenience
pub use grid::SpatialGrid;
pub use mtd::{mtd, penetration, Penetration};

/// Axis-aligned rectangle stored as min corner + size.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    /// Minimum corner
    pub min: glam::Vec2,
    /// Extent along each axis (non-negative for a well-formed rect)
    pub size: glam::Vec2,
}

impl Rect {
    /// Create a rect from min-corner coordinates and dimensions.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: glam::Vec2::new(x, y),
            size: glam::Vec2::new(width, height),
        }
    }

    /// Create a rect from a min corner and a size vector.
    #[must_use]
    pub fn from_min_size(min: glam::Vec2, size: glam::Vec2) -> Self {
        Self { min, size }
    }

    /// Create a rect spanning two corners.
    #[must_use]
    pub fn from_corners(min: glam::Vec2, max: glam::Vec2) -> Self {
        Self {
            min,
            size: max - min,
        }
    }

    /// Get the maximum corner.
    #[must_use]
    pub fn max(&self) -> glam::Vec2 {
        self.min + self.size
    }

    /// Get the center of the rect.
    #[must_use]
    pub fn center(&self) -> glam::Vec2 {
        self.min + self.size * 0.5
    }

    /// Width of the rect.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    /// Height of the rect.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// True if either extent is zero or negative.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Check if a point is inside the rect (half-open: min edge in, max edge out).
    #[must_use]
    pub fn contains_point(&self, point: glam::Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x < max.x && point.y >= self.min.y && point.y < max.y
    }

    /// Check if `other` lies entirely within this rect.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        let max = self.max();
        let other_max = other.max();
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other_max.x <= max.x
            && other_max.y <= max.y
    }

    /// Check for strict overlap with another rect.
    ///
    /// Rects that merely touch along an edge do not overlap.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let max = self.max();
        let other_max = other.max();
        self.min.x < other_max.x
            && other.min.x < max.x
            && self.min.y < other_max.y
            && other.min.y < max.y
    }

    /// The same rect moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: glam::Vec2) -> Self {
        Self {
            min: self.min + offset,
            size: self.size,
        }
    }

    /// The same size rect with its min corner at `min`.
    #[must_use]
    pub fn at(&self, min: glam::Vec2) -> Self {
        Self {
            min,
            size: self.size,
        }
    }

    /// The rect grown by `margin` on every side.
    #[must_use]
    pub fn inflated(&self, margin: f32) -> Self {
        Self {
            min: self.min - glam::Vec2::splat(margin),
            size: self.size + glam::Vec2::splat(margin * 2.0),
        }
    }
}
