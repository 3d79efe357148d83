//! End-to-end scenarios across the map core.

use std::rc::Rc;

use glam::Vec2;
use loam::Rect;

use crate::codec::{map_path, MapIndex};
use crate::entity::{CollisionMode, MapSlot};
use crate::error::MapError;
use crate::map::{Map, MapEvent};
use crate::wall::WallBody;

use super::helpers::{
    counter, open_map, spawn_pulse, test_registry, Chest, Fader, SelfRemover, Sentry, SpawnerOnce,
    Walker,
};

// =============================================================================
// Update loop
// =============================================================================

#[test]
fn each_surviving_entity_updates_exactly_once_despite_self_removal() {
    let mut map = open_map();
    let first = counter();
    let second = counter();
    let third = counter();

    spawn_pulse(&mut map, &first);
    map.add_dynamic(
        Rect::new(100.0, 100.0, 8.0, 8.0),
        CollisionMode::None,
        Box::new(SelfRemover {
            ticks: Rc::clone(&second),
        }),
    );
    spawn_pulse(&mut map, &third);

    map.update(16);

    assert_eq!(first.get(), 1);
    assert_eq!(second.get(), 1);
    assert_eq!(third.get(), 1);
    assert_eq!(map.dynamic_count(), 2);
}

#[test]
fn repeated_steps_update_every_entity_once_per_step() {
    let mut map = open_map();
    let ticks = counter();
    spawn_pulse(&mut map, &ticks);
    spawn_pulse(&mut map, &ticks);

    for _ in 0..5 {
        map.update(16);
    }

    assert_eq!(ticks.get(), 10);
}

#[test]
fn entity_added_during_update_runs_in_the_same_step() {
    let mut map = open_map();
    let child_ticks = counter();
    map.add_dynamic(
        Rect::new(10.0, 10.0, 8.0, 8.0),
        CollisionMode::None,
        Box::new(SpawnerOnce {
            spawned: false,
            child_ticks: Rc::clone(&child_ticks),
        }),
    );

    map.update(16);
    assert_eq!(map.dynamic_count(), 2);
    // Appended mid-step, the child still took its turn before the step ended
    assert_eq!(child_ticks.get(), 1);

    map.update(16);
    assert_eq!(child_ticks.get(), 2);
}

#[test]
fn disposal_purges_entity_from_every_structure() {
    let mut map = open_map();
    let id = map.add_dynamic(
        Rect::new(50.0, 50.0, 8.0, 8.0),
        CollisionMode::Solid,
        Box::new(Fader),
    );
    let slot = map.get(id).unwrap().slot().unwrap();

    map.update(16);

    assert!(!map.contains(id));
    assert!(!map.can_get_slot(slot));
    assert!(map
        .entities_in(Rect::new(0.0, 0.0, 800.0, 600.0), |_| true)
        .is_empty());
    // The freed slot is reused by the next dynamic entity
    let next = map.add_dynamic(
        Rect::new(60.0, 60.0, 8.0, 8.0),
        CollisionMode::Solid,
        Box::new(Sentry { patrol: 1.0 }),
    );
    assert_eq!(map.get(next).unwrap().slot(), Some(slot));
}

// =============================================================================
// Collision scenarios
// =============================================================================

#[test]
fn walker_is_separated_from_wall_by_minimum_translation() {
    let mut map = open_map();
    map.add_wall(Rect::new(100.0, 0.0, 50.0, 600.0), WallBody::solid());
    // Walking right at 1000 units/second toward the wall
    let walker = map.add_dynamic(
        Rect::new(60.0, 100.0, 20.0, 20.0),
        CollisionMode::Solid,
        Box::new(Walker {
            velocity: Vec2::new(1000.0, 0.0),
        }),
    );

    // One 32 ms step moves the walker 32 units: from x=60 to x=92, poking
    // 12 units into the wall; the wall pushes it back to x=80
    map.update(32);

    let shape = map.get(walker).unwrap().shape();
    assert_eq!(shape.min, Vec2::new(80.0, 100.0));
    assert!(map.is_valid_placement(shape));
}

#[test]
fn walker_slides_along_a_one_way_platform() {
    let mut map = open_map();
    map.add_wall(Rect::new(0.0, 300.0, 800.0, 16.0), WallBody::platform());
    // Falling onto the platform
    let walker = map.add_dynamic(
        Rect::new(100.0, 270.0, 20.0, 20.0),
        CollisionMode::Solid,
        Box::new(Walker {
            velocity: Vec2::new(0.0, 500.0),
        }),
    );

    map.update(40); // falls 20 units, overlapping the platform by 10

    let shape = map.get(walker).unwrap().shape();
    assert_eq!(shape.min, Vec2::new(100.0, 280.0));
}

// =============================================================================
// Slot identity
// =============================================================================

#[test]
fn slots_are_unique_and_resolve_back_to_their_entity() {
    let mut map = open_map();
    let mut seen = Vec::new();
    for i in 0..4u8 {
        let id = map.add_dynamic(
            Rect::new(f32::from(i) * 30.0, 0.0, 8.0, 8.0),
            CollisionMode::Solid,
            Box::new(Sentry { patrol: 5.0 }),
        );
        let slot = map.get(id).unwrap().slot().unwrap();
        assert!(!seen.contains(&slot), "slot {slot} handed out twice");
        // Lookup by slot immediately after insertion returns the same entity
        assert_eq!(map.dynamic_id(slot), Some(id));
        assert_eq!(map.dynamic(slot).unwrap().id(), id);
        seen.push(slot);
    }
}

#[test]
fn removed_slot_is_reused_lowest_first() {
    let mut map = open_map();
    let ids: Vec<_> = (0..3u8)
        .map(|i| {
            map.add_dynamic(
                Rect::new(f32::from(i) * 30.0, 0.0, 8.0, 8.0),
                CollisionMode::Solid,
                Box::new(Sentry { patrol: 5.0 }),
            )
        })
        .collect();

    map.remove_entity(ids[0]);
    map.remove_entity(ids[1]);

    let replacement = map.add_dynamic(
        Rect::new(90.0, 0.0, 8.0, 8.0),
        CollisionMode::Solid,
        Box::new(Sentry { patrol: 5.0 }),
    );
    assert_eq!(map.get(replacement).unwrap().slot(), Some(MapSlot::new(0)));
}

#[test]
fn restoring_into_an_occupied_slot_evicts_the_occupant() {
    let mut map = open_map();
    let original = map.add_dynamic(
        Rect::new(0.0, 0.0, 8.0, 8.0),
        CollisionMode::Solid,
        Box::new(Sentry { patrol: 5.0 }),
    );
    let slot = map.get(original).unwrap().slot().unwrap();

    let restored = map.add_dynamic_at(
        slot,
        Rect::new(40.0, 0.0, 8.0, 8.0),
        CollisionMode::Solid,
        Box::new(Sentry { patrol: 9.0 }),
    );

    // The occupant was removed from the map entirely, not just displaced
    assert!(!map.contains(original));
    assert_eq!(map.dynamic_id(slot), Some(restored));
    assert_eq!(map.dynamic_count(), 1);
}

// =============================================================================
// Use targeting
// =============================================================================

#[test]
fn usable_query_finds_unopened_chests() {
    let mut map = open_map();
    let chest = map.add_dynamic(
        Rect::new(100.0, 100.0, 16.0, 16.0),
        CollisionMode::Solid,
        Box::new(Chest { opened: false }),
    );
    map.add_dynamic(
        Rect::new(120.0, 100.0, 16.0, 16.0),
        CollisionMode::Solid,
        Box::new(Chest { opened: true }),
    );
    map.add_dynamic(
        Rect::new(140.0, 100.0, 16.0, 16.0),
        CollisionMode::Solid,
        Box::new(Sentry { patrol: 5.0 }),
    );

    let reach = Rect::new(90.0, 90.0, 100.0, 40.0);
    assert_eq!(map.usable_in(reach), vec![chest]);
}

// =============================================================================
// Persistence round-trips
// =============================================================================

fn populated_map() -> Map {
    let mut map = Map::new("cinder-keep", 800.0, 600.0);
    map.set_music("theme-keep");
    map.add_wall(Rect::new(0.0, 560.0, 800.0, 40.0), WallBody::solid());
    map.add_wall(Rect::new(200.0, 400.0, 120.0, 16.0), WallBody::platform());
    map.add_dynamic(
        Rect::new(50.0, 50.0, 16.0, 16.0),
        CollisionMode::Solid,
        Box::new(Sentry { patrol: 64.0 }),
    );
    map.add_dynamic(
        Rect::new(300.0, 300.0, 16.0, 16.0),
        CollisionMode::Solid,
        Box::new(Chest { opened: false }),
    );
    map.set_misc(serde_json::json!({ "weather": "ash" }));
    map
}

#[test]
fn document_roundtrip_preserves_map_state() {
    let registry = test_registry();
    let mut original = populated_map();

    let mut buffer = Vec::new();
    original.save_to(&mut buffer, &registry).unwrap();
    let loaded = Map::load_from(buffer.as_slice(), &registry, true).unwrap();

    assert_eq!(loaded.name(), "cinder-keep");
    assert_eq!(loaded.music(), "theme-keep");
    assert_eq!(loaded.width(), 800.0);
    assert_eq!(loaded.height(), 600.0);
    assert_eq!(loaded.entity_count(), original.entity_count());
    assert_eq!(loaded.dynamic_count(), 2);
    assert_eq!(loaded.misc(), &serde_json::json!({ "weather": "ash" }));

    // The persisted forms are equivalent node for node: same wall shapes,
    // same dynamic payloads, same slots
    let before = original.to_document(&registry).unwrap();
    let after = loaded.to_document(&registry).unwrap();
    assert_eq!(before, after);
}

#[test]
fn load_without_dynamics_keeps_static_geometry_only() {
    let registry = test_registry();
    let mut original = populated_map();

    let mut buffer = Vec::new();
    original.save_to(&mut buffer, &registry).unwrap();
    let loaded = Map::load_from(buffer.as_slice(), &registry, false).unwrap();

    assert_eq!(loaded.dynamic_count(), 0);
    assert_eq!(loaded.entity_count(), 2);
    assert_eq!(loaded.entities().filter(|e| e.is_wall()).count(), 2);
}

#[test]
fn file_roundtrip_through_canonical_naming() {
    let registry = test_registry();
    let maps_dir = tempfile::tempdir().unwrap();
    let index = MapIndex::new(3).unwrap();
    let path = map_path(maps_dir.path(), index);

    populated_map().save_file(&path, &registry).unwrap();
    let loaded = Map::load_file(&path, &registry, true).unwrap();

    assert_eq!(loaded.name(), "cinder-keep");
    assert_eq!(loaded.dynamic_count(), 2);
}

#[test]
fn loading_a_missing_file_fails_fast() {
    let registry = test_registry();
    let maps_dir = tempfile::tempdir().unwrap();
    let path = map_path(maps_dir.path(), MapIndex::new(9).unwrap());

    let result = Map::load_file(&path, &registry, true);
    assert!(matches!(result, Err(MapError::File { .. })));
}

#[test]
fn loading_malformed_content_fails_fast() {
    let registry = test_registry();
    let result = Map::load_from("not a map document".as_bytes(), &registry, true);
    assert!(matches!(result, Err(MapError::Document(_))));
}

#[test]
fn loading_an_unregistered_tag_fails_fast() {
    let mut original = populated_map();
    let full = test_registry();
    let mut buffer = Vec::new();
    original.save_to(&mut buffer, &full).unwrap();

    // A registry that has never heard of chests
    let mut partial = crate::codec::ActorRegistry::new();
    partial.register("sentry", super::helpers::decode_sentry);

    let result = Map::load_from(buffer.as_slice(), &partial, true);
    assert!(matches!(result, Err(MapError::UnknownActorTag(tag)) if tag == "chest"));
}

// =============================================================================
// Events
// =============================================================================

#[test]
fn lifecycle_and_save_events_are_collected_in_order() {
    let registry = test_registry();
    let mut map = open_map();

    let wall = map.add_wall(Rect::new(0.0, 0.0, 32.0, 32.0), WallBody::solid());
    let sentry = map.add_dynamic(
        Rect::new(50.0, 50.0, 8.0, 8.0),
        CollisionMode::Solid,
        Box::new(Sentry { patrol: 5.0 }),
    );
    map.remove_entity(wall);
    map.save_to(&mut Vec::new(), &registry).unwrap();

    assert_eq!(
        map.take_events(),
        vec![
            MapEvent::EntityAdded(wall),
            MapEvent::EntityAdded(sentry),
            MapEvent::EntityRemoved(wall),
            MapEvent::Saved,
        ]
    );
    // Draining empties the queue
    assert!(map.events().is_empty());
}

// =============================================================================
// Placement in a live world
// =============================================================================

#[test]
fn repaired_placement_is_usable_for_spawning() {
    let mut map = open_map();
    map.add_wall(Rect::new(100.0, 100.0, 50.0, 50.0), WallBody::solid());

    let wanted = Rect::new(100.0, 100.0, 20.0, 20.0);
    let position = map.find_valid_placement(wanted).unwrap();
    assert_eq!(position, Vec2::new(100.0, 80.0));

    let id = map.add_dynamic(
        wanted.at(position),
        CollisionMode::Solid,
        Box::new(Sentry { patrol: 5.0 }),
    );
    // The spawned entity overlaps nothing; its collision pass is silent
    map.update(16);
    assert_eq!(map.get(id).unwrap().shape().min, position);
}
