//! # Emberfall Map Core
//!
//! The spatial/entity core of Emberfall's tile-free 2D world.
//!
//! A [`Map`] exclusively owns every entity placed on a level: it assigns
//! stable identifiers to networked (dynamic) entities, resolves collisions
//! between entities and static geometry, repairs invalid placements, and
//! persists/restores map state.
//!
//! ## Architecture
//!
//! - [`entity`]: ids, slots, collision modes, the entity record
//! - [`index`]: sparse reusable slot allocator for dynamic entities
//! - [`map`]: the container, its lifecycle operations, and the update loop
//! - [`wall`]: wall bodies and the wall-side resolution rule
//! - [`actor`]: the behavior seam concrete dynamic entity types implement
//! - [`placement`]: placement validation and the bounded repair search
//! - [`codec`]: the JSON map document, actor registry, and file naming
//! - [`clock`]: the injected time collaborator and per-step delta clock
//!
//! The spatial substrate (rects, penetration math, the grid index) lives in
//! the `loam` crate.
//!
//! ## Usage
//!
//! ```
//! use emberfall_core::entity::CollisionMode;
//! use emberfall_core::map::Map;
//! use emberfall_core::wall::WallBody;
//! use loam::Rect;
//!
//! let mut map = Map::new("hollow", 800.0, 600.0);
//! map.add_wall(Rect::new(0.0, 560.0, 800.0, 40.0), WallBody::solid());
//!
//! // One step of 16 ms
//! map.update(16);
//!
//! assert!(map.is_valid_placement(Rect::new(100.0, 100.0, 20.0, 20.0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actor;
pub mod clock;
pub mod codec;
pub mod entity;
pub mod error;
pub mod index;
pub mod map;
pub mod placement;
pub mod wall;

mod collision;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use actor::{Actor, WallContact};
pub use clock::{StepClock, SystemTimeSource, TimeSource};
pub use codec::{
    map_file_name, map_path, parse_map_index, ActorRegistry, DynamicNode, MapDocument, MapHeader,
    MapIndex, WallNode, MAP_FILE_SUFFIX,
};
pub use entity::{CollisionMode, Entity, EntityId, MapSlot};
pub use error::MapError;
pub use index::IndexTable;
pub use map::{Map, MapEvent};
pub use placement::PLACEMENT_PADDING;
pub use wall::{BlockDirs, WallBody};
