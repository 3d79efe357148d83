//! Uniform-grid spatial index for rectangle overlap queries.
//!
//! Members are bucketed into fixed-size cells keyed by floored cell
//! coordinates. The grid remembers each member's current rect, so removal
//! and update touch exactly the cells that member occupies.
//!
//! # Determinism
//!
//! Queries return keys sorted and deduplicated, so enumeration order is a
//! pure function of the member set — never of hash iteration order.

use std::collections::HashMap;
use std::hash::Hash;

use crate::Rect;

/// Default cell edge length, sized for entity-scale rects.
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

/// Uniform bucket grid mapping keys to rects.
///
/// `K` is a small copyable id (the map core uses its entity id). Queries
/// answer "which members strictly overlap this rect" in time proportional
/// to the cells the query touches.
///
/// # Example
///
/// ```
/// use loam::{Rect, SpatialGrid};
///
/// let mut grid: SpatialGrid<u32> = SpatialGrid::new();
/// grid.insert(1, Rect::new(0.0, 0.0, 10.0, 10.0));
/// grid.insert(2, Rect::new(200.0, 200.0, 10.0, 10.0));
///
/// assert_eq!(grid.query(Rect::new(5.0, 5.0, 10.0, 10.0)), vec![1]);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialGrid<K> {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<K>>,
    members: HashMap<K, Rect>,
}

impl<K> SpatialGrid<K>
where
    K: Copy + Eq + Hash + Ord,
{
    /// Create an empty grid with the default cell size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cell_size(DEFAULT_CELL_SIZE)
    }

    /// Create an empty grid with a custom cell size.
    ///
    /// Pick roughly 2-4x the typical member extent; very small cells cost
    /// memory, very large cells degrade queries toward a full scan.
    #[must_use]
    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            members: HashMap::new(),
        }
    }

    /// The cell edge length this grid buckets by.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Insert a member, replacing its previous rect if already present.
    pub fn insert(&mut self, key: K, rect: Rect) {
        if self.members.contains_key(&key) {
            self.remove(&key);
        }
        for cell in Self::cell_range(self.cell_size, &rect) {
            self.cells.entry(cell).or_default().push(key);
        }
        self.members.insert(key, rect);
    }

    /// Remove a member. Returns true if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(rect) = self.members.remove(key) else {
            return false;
        };
        for cell in Self::cell_range(self.cell_size, &rect) {
            if let Some(bucket) = self.cells.get_mut(&cell) {
                bucket.retain(|k| k != key);
                if bucket.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
        true
    }

    /// Move an existing member to a new rect. Returns false if absent.
    pub fn update(&mut self, key: &K, rect: Rect) -> bool {
        if !self.members.contains_key(key) {
            return false;
        }
        self.insert(*key, rect);
        true
    }

    /// The rect currently registered for a member, if any.
    #[must_use]
    pub fn rect_of(&self, key: &K) -> Option<Rect> {
        self.members.get(key).copied()
    }

    /// True if the member is registered.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.members.contains_key(key)
    }

    /// All members strictly overlapping `rect`, sorted and deduplicated.
    ///
    /// Never mutates; safe to call repeatedly within one step.
    #[must_use]
    pub fn query(&self, rect: Rect) -> Vec<K> {
        let mut results: Vec<K> = Vec::new();
        for cell in Self::cell_range(self.cell_size, &rect) {
            if let Some(bucket) = self.cells.get(&cell) {
                for key in bucket {
                    if self.members[key].intersects(&rect) {
                        results.push(*key);
                    }
                }
            }
        }
        results.sort_unstable();
        results.dedup();
        results
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the grid has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Drop all members and buckets.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.members.clear();
    }

    /// Iterate the cell coordinates a rect's bounds touch.
    fn cell_range(cell_size: f32, rect: &Rect) -> impl Iterator<Item = (i32, i32)> {
        #[allow(clippy::cast_possible_truncation)]
        let to_cell = move |v: f32| (v / cell_size).floor() as i32;
        let (x0, x1) = (to_cell(rect.min.x), to_cell(rect.max().x));
        let (y0, y1) = (to_cell(rect.min.y), to_cell(rect.max().y));
        (x0..=x1).flat_map(move |x| (y0..=y1).map(move |y| (x, y)))
    }
}

impl<K> Default for SpatialGrid<K>
where
    K: Copy + Eq + Hash + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}
