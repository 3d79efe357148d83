//! Behavior seam for dynamic entities.
//!
//! Concrete dynamic entity types live outside this core; they plug in by
//! implementing [`Actor`]. The map stores each dynamic entity's actor in a
//! box and hands it `&mut Map` during callbacks by temporarily taking the
//! box out of its slot — which is why callbacks receive the entity's own id
//! explicitly rather than reading it off the map.
//!
//! # Callbacks
//!
//! - [`Actor::update`] runs once per step from the map's update loop and
//!   may freely add or remove entities, including its own.
//! - [`Actor::on_hit_wall`] / [`Actor::on_collide_into`] /
//!   [`Actor::on_collide_from`] run from the collision resolver; a typical
//!   wall handler applies `contact.mtd` to its own position via
//!   `Map::translate_entity`.
//!
//! # Persistence
//!
//! [`Actor::type_tag`] names the concrete type in map documents and must
//! match a decoder registered in the
//! [`ActorRegistry`](crate::codec::ActorRegistry); [`Actor::save`] produces
//! the polymorphic payload that decoder will later read back.

use std::fmt;

use glam::Vec2;
use loam::Rect;

use crate::entity::EntityId;
use crate::map::Map;
use crate::wall::BlockDirs;

/// Everything an actor's wall handler needs to know about one contact.
#[derive(Debug, Clone, Copy)]
pub struct WallContact {
    /// Id of the wall entity.
    pub wall: EntityId,
    /// The wall's shape.
    pub rect: Rect,
    /// The wall's push directions.
    pub dirs: BlockDirs,
    /// Minimum translation distance moving the mover out of the wall.
    /// Always non-zero.
    pub mtd: Vec2,
}

/// Polymorphic behavior and payload of a dynamic entity.
///
/// All callbacks default to no-ops so purely passive dynamic entities only
/// implement the persistence pair.
pub trait Actor: fmt::Debug {
    /// Type tag keying this actor's decoder in the registry.
    fn type_tag(&self) -> &'static str;

    /// Serialize the actor's payload for the map document.
    ///
    /// # Errors
    ///
    /// Whatever serde raises for unserializable state; the map save aborts.
    fn save(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Advance this entity by one step of `dt_ms` milliseconds.
    ///
    /// May add or remove entities, including removing or disposing itself.
    fn update(&mut self, _id: EntityId, _map: &mut Map, _dt_ms: u32) {}

    /// The mover-side half of a wall contact.
    fn on_hit_wall(&mut self, _id: EntityId, _map: &mut Map, _contact: &WallContact) {}

    /// This entity, moving, overlapped `other`. Runs before the other
    /// side's [`Actor::on_collide_from`].
    fn on_collide_into(&mut self, _id: EntityId, _map: &mut Map, _other: EntityId, _mtd: Vec2) {}

    /// Another moving entity overlapped this one. `mtd` is the vector that
    /// separates the *mover* — from this side's perspective it points away.
    fn on_collide_from(&mut self, _id: EntityId, _map: &mut Map, _other: EntityId, _mtd: Vec2) {}

    /// Use-targeting predicate: can a character use this entity?
    fn usable(&self) -> bool {
        false
    }
}
