//! The map: exclusive owner of every entity on a level.
//!
//! A `Map` composes the core's moving parts: the entity store, the index
//! table handing out [`MapSlot`]s for dynamic entities, the spatial grid
//! answering overlap queries, the flat updateable list the update loop
//! walks, and the event queue outer layers drain for bookkeeping.
//!
//! # Determinism
//!
//! Entities are stored in a `BTreeMap` keyed by monotonically assigned
//! [`EntityId`]s, and every spatial query returns sorted ids — so wall
//! passes, entity passes, and iteration are all stable across runs.
//!
//! # Invariants
//!
//! - A dynamic entity's slot in the index table resolves back to its id,
//!   and the entity records that same slot.
//! - Dynamic entities are a subset of all entities.
//! - No two live dynamic entities share a slot.
//! - An entity is in the spatial grid iff it is in the entity store, under
//!   its current shape.
//!
//! Violations are reported on the tracing channel and recovered along the
//! documented fallback path; they never panic a running world.
//!
//! # Spatial synchronization
//!
//! Shape edits made directly through [`Map::get_mut`] do **not** update the
//! spatial grid. Move entities with [`Map::translate_entity`] /
//! [`Map::set_entity_position`], or call [`Map::sync_spatial`] afterwards:
//!
//! ```
//! use emberfall_core::entity::CollisionMode;
//! use emberfall_core::map::Map;
//! use glam::Vec2;
//! use loam::Rect;
//!
//! let mut map = Map::new("yard", 800.0, 600.0);
//! let id = map.add_prop(Rect::new(0.0, 0.0, 16.0, 16.0), CollisionMode::Solid);
//!
//! if let Some(entity) = map.get_mut(id) {
//!     entity.set_position(Vec2::new(100.0, 100.0));
//! }
//! // REQUIRED: sync the spatial grid after a direct edit
//! map.sync_spatial(id);
//! ```

use std::collections::BTreeMap;

use glam::Vec2;
use loam::{Rect, SpatialGrid};

use crate::actor::Actor;
use crate::entity::{CollisionMode, Entity, EntityId, MapSlot};
use crate::index::IndexTable;
use crate::wall::WallBody;

/// Notification collected by the map for outer layers to drain.
///
/// Events accumulate in insertion order until [`Map::take_events`] empties
/// the queue; the core never acts on them itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    /// A save completed successfully.
    Saved,
    /// An entity was added to the map.
    EntityAdded(EntityId),
    /// An entity was removed from the map.
    EntityRemoved(EntityId),
}

/// A level's spatial/entity world.
///
/// The map exclusively owns its entities: they transfer in through the
/// `add_*` methods and are dropped on removal or disposal. All operations
/// are synchronous and run on the calling thread.
#[derive(Debug)]
pub struct Map {
    name: String,
    music: String,
    width: f32,
    height: f32,
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    dynamics: IndexTable<EntityId>,
    spatial: SpatialGrid<EntityId>,
    updateables: Vec<EntityId>,
    events: Vec<MapEvent>,
    pub(crate) misc: serde_json::Value,
}

impl Map {
    /// Create an empty map spanning `[0,width) x [0,height)`.
    #[must_use]
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            music: String::new(),
            width,
            height,
            next_id: 0,
            entities: BTreeMap::new(),
            dynamics: IndexTable::new(),
            spatial: SpatialGrid::new(),
            updateables: Vec::new(),
            events: Vec::new(),
            misc: serde_json::Value::Null,
        }
    }

    /// The map's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the map.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The map's music reference (an asset key; empty for silence).
    #[must_use]
    pub fn music(&self) -> &str {
        &self.music
    }

    /// Change the music reference.
    pub fn set_music(&mut self, music: impl Into<String>) {
        self.music = music.into();
    }

    /// Playfield width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Playfield height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// The playfield as a rect with its min corner at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Opaque extension data round-tripped with the map document.
    #[must_use]
    pub const fn misc(&self) -> &serde_json::Value {
        &self.misc
    }

    /// Replace the extension data.
    pub fn set_misc(&mut self, misc: serde_json::Value) {
        self.misc = misc;
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Add a plain scenery entity.
    pub fn add_prop(&mut self, shape: Rect, mode: CollisionMode) -> EntityId {
        let id = self.alloc_id();
        self.insert_entity(Entity::new_prop(id, shape, mode))
    }

    /// Add a wall: immovable static geometry.
    pub fn add_wall(&mut self, shape: Rect, body: WallBody) -> EntityId {
        let id = self.alloc_id();
        self.insert_entity(Entity::new_wall(id, shape, body))
    }

    /// Add a dynamic entity, allocating the lowest free map slot for it.
    ///
    /// Returns the new entity's id; read its slot back via
    /// [`Entity::slot`].
    pub fn add_dynamic(
        &mut self,
        shape: Rect,
        mode: CollisionMode,
        actor: Box<dyn Actor>,
    ) -> EntityId {
        let id = self.alloc_id();
        let slot = self.dynamics.insert(id);
        self.insert_entity(Entity::new_dynamic(id, shape, mode, slot, actor))
    }

    /// Add a dynamic entity at an explicitly chosen slot.
    ///
    /// This is the restore path for slots assigned earlier — by a persisted
    /// map file or a network message. A live occupant in the slot is an
    /// invariant violation: it is reported on the diagnostics channel and
    /// removed from the map before the new entity takes the slot.
    pub fn add_dynamic_at(
        &mut self,
        slot: MapSlot,
        shape: Rect,
        mode: CollisionMode,
        actor: Box<dyn Actor>,
    ) -> EntityId {
        if let Some(&occupant) = self.dynamics.get(slot) {
            tracing::error!(%slot, %occupant, "restoring into an occupied slot; evicting occupant");
            self.remove_entity(occupant);
        }
        let id = self.alloc_id();
        self.dynamics.set_at(slot, id);
        self.insert_entity(Entity::new_dynamic(id, shape, mode, slot, actor))
    }

    /// Remove an entity, purging it from the entity store, the spatial
    /// grid, the updateable list, and (for dynamics) the index table.
    ///
    /// Removing an entity not on this map is an invariant violation: it is
    /// reported on the diagnostics channel and otherwise ignored.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.remove(&id) else {
            tracing::warn!(%id, "remove of an entity not on this map ignored");
            return false;
        };
        self.spatial.remove(&id);
        if let Some(slot) = entity.slot() {
            self.dynamics.remove_at(slot);
        }
        if let Some(position) = self.updateables.iter().position(|&u| u == id) {
            self.updateables.remove(position);
        }
        self.events.push(MapEvent::EntityRemoved(id));
        true
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        self.spatial.insert(id, entity.shape());
        if entity.is_dynamic() {
            self.updateables.push(id);
        }
        self.entities.insert(id, entity);
        self.events.push(MapEvent::EntityAdded(id));
        id
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Borrow an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutably borrow an entity by id.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// True if the entity is on this map.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// The id of the dynamic entity in a slot, if the slot is occupied.
    #[must_use]
    pub fn dynamic_id(&self, slot: MapSlot) -> Option<EntityId> {
        self.dynamics.get(slot).copied()
    }

    /// The dynamic entity in a slot.
    ///
    /// A slot that resolves to an id missing from the entity store is an
    /// invariant violation; it is reported on the diagnostics channel and
    /// answered with `None`.
    #[must_use]
    pub fn dynamic(&self, slot: MapSlot) -> Option<&Entity> {
        let id = self.dynamic_id(slot)?;
        let entity = self.entities.get(&id);
        if entity.is_none() {
            tracing::error!(%slot, %id, "slot resolves to an entity missing from the store");
        }
        entity
    }

    /// True if a slot lookup would find a live dynamic entity.
    #[must_use]
    pub fn can_get_slot(&self, slot: MapSlot) -> bool {
        self.dynamics.can_get(slot)
    }

    /// Number of entities on the map.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of dynamic entities on the map.
    #[must_use]
    pub fn dynamic_count(&self) -> usize {
        self.dynamics.len()
    }

    /// True if the map has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity ids in ascending (insertion) order.
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Entities in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    // =========================================================================
    // Movement
    // =========================================================================

    /// Move an entity by an offset, keeping the spatial grid in sync.
    pub fn translate_entity(&mut self, id: EntityId, offset: Vec2) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        let shape = entity.shape().translated(offset);
        entity.set_shape(shape);
        self.spatial.update(&id, shape);
        true
    }

    /// Place an entity's min corner, keeping the spatial grid in sync.
    pub fn set_entity_position(&mut self, id: EntityId, min: Vec2) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        let shape = entity.shape().at(min);
        entity.set_shape(shape);
        self.spatial.update(&id, shape);
        true
    }

    /// Re-register an entity's current shape with the spatial grid.
    ///
    /// Call after editing a shape directly through [`Map::get_mut`].
    pub fn sync_spatial(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get(&id) {
            let shape = entity.shape();
            self.spatial.update(&id, shape);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Entities overlapping `rect` that pass `filter`, in ascending id
    /// order. Never mutates; safe to call repeatedly within one step.
    pub fn entities_in<F>(&self, rect: Rect, filter: F) -> Vec<EntityId>
    where
        F: Fn(&Entity) -> bool,
    {
        self.spatial
            .query(rect)
            .into_iter()
            .filter(|id| self.entities.get(id).is_some_and(&filter))
            .collect()
    }

    /// Walls overlapping `rect`, in ascending id order.
    #[must_use]
    pub fn walls_in(&self, rect: Rect) -> Vec<EntityId> {
        self.entities_in(rect, Entity::is_wall)
    }

    /// Usable entities overlapping `rect`, in ascending id order.
    ///
    /// The use-targeting query: dynamic entities whose actor answers
    /// [`Actor::usable`] with true.
    #[must_use]
    pub fn usable_in(&self, rect: Rect) -> Vec<EntityId> {
        self.entities_in(rect, Entity::usable)
    }

    // =========================================================================
    // Update loop
    // =========================================================================

    /// Advance every updateable entity by one step of `dt_ms` milliseconds.
    ///
    /// The updateable list is walked with a held-position cursor: the
    /// cursor advances only when the id occupying its position after an
    /// entity's turn is the id observed before it. A removal shifts the
    /// list left and the shifted-in entity is visited at the held position,
    /// so each surviving entity updates exactly once per step with no
    /// snapshot copy of the list. Entities added during the step append to
    /// the list and take their turn later in the same step.
    ///
    /// After its update, each entity's collision pass runs (see
    /// [`Map::check_collisions`]); entities flagged as disposed are purged
    /// at the end of their turn, and any flagged after their turn are swept
    /// when the step ends.
    pub fn update(&mut self, dt_ms: u32) {
        let mut cursor = 0;
        while cursor < self.updateables.len() {
            let id = self.updateables[cursor];
            self.step_entity(id, dt_ms);
            if self.updateables.get(cursor) == Some(&id) {
                cursor += 1;
            }
        }
        self.sweep_disposed();
    }

    /// One entity's turn: disposal check, update callback, collision pass.
    fn step_entity(&mut self, id: EntityId, dt_ms: u32) {
        if self.entities.get(&id).is_some_and(Entity::disposed) {
            self.remove_entity(id);
            return;
        }
        if let Some(mut actor) = self.take_actor(id) {
            actor.update(id, self, dt_ms);
            self.restore_actor(id, actor);
        }
        if self.contains(id) {
            self.check_collisions(id);
        }
        if self.entities.get(&id).is_some_and(Entity::disposed) {
            self.remove_entity(id);
        }
    }

    /// Purge every entity flagged as disposed.
    fn sweep_disposed(&mut self) {
        let disposed: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.disposed())
            .map(Entity::id)
            .collect();
        for id in disposed {
            self.remove_entity(id);
        }
    }

    /// Take an entity's actor out of its slot for a callback.
    pub(crate) fn take_actor(&mut self, id: EntityId) -> Option<Box<dyn Actor>> {
        self.entities.get_mut(&id).and_then(Entity::take_actor)
    }

    /// Return a taken actor; dropped if its entity left the map meanwhile.
    pub(crate) fn restore_actor(&mut self, id: EntityId, actor: Box<dyn Actor>) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.put_actor(actor);
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Drain the pending event queue.
    pub fn take_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }

    /// Peek at the pending event queue without draining it.
    #[must_use]
    pub fn events(&self) -> &[MapEvent] {
        &self.events
    }

    /// Queue an event. Used by the codec after a successful save.
    pub(crate) fn push_event(&mut self, event: MapEvent) {
        self.events.push(event);
    }
}
