//! Sample actors and setup utilities shared by tests.
//!
//! The serde-backed actors (`Sentry`, `Chest`, `Walker`) are registered in
//! [`test_registry`] and round-trip through the codec; the counter-backed
//! actors observe update-loop behavior through shared `Rc<Cell>` handles.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use loam::Rect;
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, WallContact};
use crate::codec::ActorRegistry;
use crate::entity::{CollisionMode, EntityId};
use crate::error::MapError;
use crate::map::Map;

// =============================================================================
// Serde-backed actors (registered, persistable)
// =============================================================================

/// Stationary guard with a patrol radius. The simplest persistable actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentry {
    pub patrol: f32,
}

impl Actor for Sentry {
    fn type_tag(&self) -> &'static str {
        "sentry"
    }

    fn save(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

pub fn decode_sentry(node: &serde_json::Value) -> Result<Box<dyn Actor>, MapError> {
    let sentry: Sentry = serde_json::from_value(node.clone())?;
    Ok(Box::new(sentry))
}

/// Openable container: the canonical usable entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chest {
    pub opened: bool,
}

impl Actor for Chest {
    fn type_tag(&self) -> &'static str {
        "chest"
    }

    fn save(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn usable(&self) -> bool {
        !self.opened
    }
}

pub fn decode_chest(node: &serde_json::Value) -> Result<Box<dyn Actor>, MapError> {
    let chest: Chest = serde_json::from_value(node.clone())?;
    Ok(Box::new(chest))
}

/// Moves by its velocity each step and lets walls push it back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walker {
    /// Velocity in units per second.
    pub velocity: Vec2,
}

impl Actor for Walker {
    fn type_tag(&self) -> &'static str {
        "walker"
    }

    fn save(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn update(&mut self, id: EntityId, map: &mut Map, dt_ms: u32) {
        #[allow(clippy::cast_precision_loss)]
        let dt = dt_ms as f32 / 1000.0;
        map.translate_entity(id, self.velocity * dt);
    }

    fn on_hit_wall(&mut self, id: EntityId, map: &mut Map, contact: &WallContact) {
        map.translate_entity(id, contact.mtd);
    }
}

pub fn decode_walker(node: &serde_json::Value) -> Result<Box<dyn Actor>, MapError> {
    let walker: Walker = serde_json::from_value(node.clone())?;
    Ok(Box::new(walker))
}

/// Registry knowing every serde-backed test actor.
pub fn test_registry() -> ActorRegistry {
    let mut registry = ActorRegistry::new();
    registry.register("sentry", decode_sentry);
    registry.register("chest", decode_chest);
    registry.register("walker", decode_walker);
    registry
}

// =============================================================================
// Counter-backed actors (update-loop observation)
// =============================================================================

/// Counts its update calls through a shared handle.
#[derive(Debug)]
pub struct Pulse {
    pub ticks: Rc<Cell<u32>>,
}

impl Actor for Pulse {
    fn type_tag(&self) -> &'static str {
        "pulse"
    }

    fn save(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(serde_json::Value::Null)
    }

    fn update(&mut self, _id: EntityId, _map: &mut Map, _dt_ms: u32) {
        self.ticks.set(self.ticks.get() + 1);
    }
}

/// Counts one update, then removes itself from the map mid-call.
#[derive(Debug)]
pub struct SelfRemover {
    pub ticks: Rc<Cell<u32>>,
}

impl Actor for SelfRemover {
    fn type_tag(&self) -> &'static str {
        "self-remover"
    }

    fn save(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(serde_json::Value::Null)
    }

    fn update(&mut self, id: EntityId, map: &mut Map, _dt_ms: u32) {
        self.ticks.set(self.ticks.get() + 1);
        map.remove_entity(id);
    }
}

/// Signals its own disposal during its first update.
#[derive(Debug)]
pub struct Fader;

impl Actor for Fader {
    fn type_tag(&self) -> &'static str {
        "fader"
    }

    fn save(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(serde_json::Value::Null)
    }

    fn update(&mut self, id: EntityId, map: &mut Map, _dt_ms: u32) {
        if let Some(entity) = map.get_mut(id) {
            entity.dispose();
        }
    }
}

/// Adds one `Pulse` entity on its first update.
#[derive(Debug)]
pub struct SpawnerOnce {
    pub spawned: bool,
    pub child_ticks: Rc<Cell<u32>>,
}

impl Actor for SpawnerOnce {
    fn type_tag(&self) -> &'static str {
        "spawner-once"
    }

    fn save(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(serde_json::Value::Null)
    }

    fn update(&mut self, _id: EntityId, map: &mut Map, _dt_ms: u32) {
        if !self.spawned {
            self.spawned = true;
            map.add_dynamic(
                Rect::new(400.0, 400.0, 8.0, 8.0),
                CollisionMode::None,
                Box::new(Pulse {
                    ticks: Rc::clone(&self.child_ticks),
                }),
            );
        }
    }
}

// =============================================================================
// Setup
// =============================================================================

/// Fresh counter handle for the counter-backed actors.
pub fn counter() -> Rc<Cell<u32>> {
    Rc::new(Cell::new(0))
}

/// An 800x600 map with no geometry.
pub fn open_map() -> Map {
    Map::new("test", 800.0, 600.0)
}

/// Spawn a `Pulse` reporting to `ticks`, placed out of everything's way.
pub fn spawn_pulse(map: &mut Map, ticks: &Rc<Cell<u32>>) -> EntityId {
    map.add_dynamic(
        Rect::new(700.0, 500.0, 8.0, 8.0),
        CollisionMode::None,
        Box::new(Pulse {
            ticks: Rc::clone(ticks),
        }),
    )
}
