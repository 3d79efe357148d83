//! Entity model for the map core.
//!
//! This module provides the identity and storage types for everything a map
//! owns:
//!
//! - [`EntityId`]: monotonic handle assigned by the map at insertion
//! - [`MapSlot`]: small reusable identity for dynamic entities
//! - [`CollisionMode`]: whether an entity participates in collision work
//! - [`Entity`]: the complete entity record (shape, mode, kind)
//!
//! # Identity
//!
//! Every entity on a map carries an [`EntityId`], never reused within that
//! map; their numeric order is the map's deterministic processing order.
//! Dynamic entities additionally carry a [`MapSlot`] — the small, stable,
//! *reusable* index other systems (most importantly the network layer)
//! reference them by. Slots come from the map's index table and return to
//! it on removal.

use std::fmt;

use glam::Vec2;
use loam::Rect;
use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::wall::WallBody;

/// Unique identifier for an entity on a map.
///
/// `EntityId` is a newtype over `u64`, assigned monotonically when the
/// entity is added and never reused by that map. The numeric ordering of
/// ids is the deterministic enumeration order used throughout the core.
///
/// # Example
///
/// ```
/// use emberfall_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Stable reusable index of a dynamic entity — the map entity index.
///
/// Slots are allocated lowest-free-first by the map's index table, so they
/// stay small; a freed slot is reused by the next insertion. No two live
/// dynamic entities on one map share a slot.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapSlot(u32);

impl MapSlot {
    /// Creates a `MapSlot` from a raw `u32` value.
    #[must_use]
    pub const fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Returns the raw `u32` value of this slot.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the slot as a `usize` array index.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for MapSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapSlot({})", self.0)
    }
}

impl fmt::Display for MapSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MapSlot {
    fn from(slot: u32) -> Self {
        Self::new(slot)
    }
}

/// Collision participation policy for an entity.
///
/// `None` entities are purely decorative as far as collision goes: the
/// resolver performs no geometry work for them, neither as mover nor as
/// target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionMode {
    /// No collision participation at all.
    None,
    /// Participates in wall and entity collision passes.
    Solid,
}

impl fmt::Display for CollisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Solid => write!(f, "Solid"),
        }
    }
}

/// Kind-specific storage for an entity.
///
/// Not part of the public surface: callers classify entities through the
/// `is_*`/`as_*` accessors on [`Entity`].
#[derive(Debug)]
pub(crate) enum EntityKind {
    /// Plain scenery with no behavior.
    Prop,
    /// Immovable collision source.
    Wall(WallBody),
    /// Networked entity with a slot and polymorphic behavior.
    ///
    /// The actor box is `None` only while taken out for a callback (its
    /// update or a collision handler), so it can receive `&mut Map`.
    Dynamic {
        slot: MapSlot,
        actor: Option<Box<dyn Actor>>,
    },
}

/// A complete entity owned by a map.
///
/// An entity combines an [`EntityId`], a collision shape (axis-aligned box,
/// min corner + size), a [`CollisionMode`], a disposal flag, and its kind
/// (prop, wall, or dynamic). Ownership transfers to the map on add and ends
/// on remove/dispose.
///
/// # Position changes
///
/// **Important**: the map's spatial index is not automatically synchronized
/// when a shape is edited through `get_mut`. Move entities with
/// `Map::translate_entity` / `Map::set_entity_position`, or call
/// `Map::sync_spatial` after direct edits.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    shape: Rect,
    mode: CollisionMode,
    disposed: bool,
    kind: EntityKind,
}

impl Entity {
    pub(crate) fn new_prop(id: EntityId, shape: Rect, mode: CollisionMode) -> Self {
        Self {
            id,
            shape,
            mode,
            disposed: false,
            kind: EntityKind::Prop,
        }
    }

    pub(crate) fn new_wall(id: EntityId, shape: Rect, body: WallBody) -> Self {
        Self {
            id,
            shape,
            mode: CollisionMode::Solid,
            disposed: false,
            kind: EntityKind::Wall(body),
        }
    }

    pub(crate) fn new_dynamic(
        id: EntityId,
        shape: Rect,
        mode: CollisionMode,
        slot: MapSlot,
        actor: Box<dyn Actor>,
    ) -> Self {
        Self {
            id,
            shape,
            mode,
            disposed: false,
            kind: EntityKind::Dynamic {
                slot,
                actor: Some(actor),
            },
        }
    }

    /// The entity's map-unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// The entity's collision shape.
    #[must_use]
    pub const fn shape(&self) -> Rect {
        self.shape
    }

    /// Replace the collision shape. See the type docs on spatial sync.
    pub fn set_shape(&mut self, shape: Rect) {
        self.shape = shape;
    }

    /// The entity's position: the min corner of its shape.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.shape.min
    }

    /// Move the shape's min corner, keeping its size.
    pub fn set_position(&mut self, min: Vec2) {
        self.shape.min = min;
    }

    /// The entity's collision participation mode.
    #[must_use]
    pub const fn mode(&self) -> CollisionMode {
        self.mode
    }

    /// Change the collision participation mode.
    pub fn set_mode(&mut self, mode: CollisionMode) {
        self.mode = mode;
    }

    /// True once the entity has signalled its own disposal.
    #[must_use]
    pub const fn disposed(&self) -> bool {
        self.disposed
    }

    /// Signal disposal: the map purges the entity at the end of its turn in
    /// the current step (or at the start of its next one).
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    /// True if this entity is a wall.
    #[must_use]
    pub const fn is_wall(&self) -> bool {
        matches!(self.kind, EntityKind::Wall(_))
    }

    /// True if this entity is dynamic.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self.kind, EntityKind::Dynamic { .. })
    }

    /// True if this entity is a plain prop.
    #[must_use]
    pub const fn is_prop(&self) -> bool {
        matches!(self.kind, EntityKind::Prop)
    }

    /// The wall body, if this entity is a wall.
    #[must_use]
    pub const fn as_wall(&self) -> Option<&WallBody> {
        match &self.kind {
            EntityKind::Wall(body) => Some(body),
            _ => None,
        }
    }

    /// The map entity index, if this entity is dynamic.
    #[must_use]
    pub const fn slot(&self) -> Option<MapSlot> {
        match &self.kind {
            EntityKind::Dynamic { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    /// Borrow the dynamic behavior, if present.
    ///
    /// `None` for props and walls, and transiently for a dynamic entity
    /// whose actor is currently out on a callback.
    #[must_use]
    pub fn actor(&self) -> Option<&dyn Actor> {
        match &self.kind {
            EntityKind::Dynamic {
                actor: Some(actor), ..
            } => Some(actor.as_ref()),
            _ => None,
        }
    }

    /// Use-targeting predicate: can a character use this entity?
    #[must_use]
    pub fn usable(&self) -> bool {
        self.actor().is_some_and(|actor| actor.usable())
    }

    /// Take the actor out of its slot for a callback.
    pub(crate) fn take_actor(&mut self) -> Option<Box<dyn Actor>> {
        match &mut self.kind {
            EntityKind::Dynamic { actor, .. } => actor.take(),
            _ => None,
        }
    }

    /// Return a taken actor to its slot.
    pub(crate) fn put_actor(&mut self, returned: Box<dyn Actor>) {
        if let EntityKind::Dynamic { actor, .. } = &mut self.kind {
            *actor = Some(returned);
        }
    }
}
