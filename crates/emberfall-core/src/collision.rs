//! Collision resolver: broad phase, narrow phase, double-dispatch.
//!
//! One call resolves one moving entity against the world: a spatial query
//! bounds the narrow-phase MTD work to overlapping candidates, walls are
//! processed before other entities, and every non-zero MTD produces the
//! paired notifications both sides observe.
//!
//! Candidates are processed in ascending [`EntityId`] order — ids are
//! assigned at insertion, so the pass order is stable across runs.

use crate::actor::WallContact;
use crate::entity::{CollisionMode, EntityId};
use crate::map::Map;

impl Map {
    /// Detect and report every overlap for one moving entity.
    ///
    /// Skips entirely — no queries, no geometry — when the mover's mode is
    /// [`CollisionMode::None`]. Otherwise:
    ///
    /// 1. **Wall pass**: for each wall overlapping the mover's broad-phase
    ///    rect, compute the wall-rule MTD
    ///    ([`WallBody::resolve`](crate::wall::WallBody::resolve)). A
    ///    non-zero MTD is observed by the shared wall-side handler and the
    ///    mover's [`Actor::on_hit_wall`](crate::actor::Actor::on_hit_wall).
    /// 2. **Entity pass**: for each other participating non-wall entity
    ///    overlapping the same rect, compute the plain MTD; a non-zero MTD
    ///    runs `on_collide_into` on the mover first, then
    ///    `on_collide_from` on the other.
    ///
    /// Handlers receive `&mut Map` and may mutate freely: the mover's rect
    /// is re-read for every candidate, candidates removed by an earlier
    /// handler are skipped, and the pass stops if the mover itself leaves
    /// the map.
    ///
    /// The update loop calls this once per step for each entity after its
    /// update; calling it re-entrantly for the entity currently being
    /// updated still reports wall-side contacts but cannot run that
    /// entity's own handlers (its actor is out on the update callback).
    pub fn check_collisions(&mut self, id: EntityId) {
        let Some(entity) = self.get(id) else {
            tracing::warn!(%id, "collision check for an entity not on this map ignored");
            return;
        };
        if entity.mode() == CollisionMode::None {
            return;
        }
        let broad = entity.shape();

        let mut actor = self.take_actor(id);

        // Wall pass
        for wall_id in self.walls_in(broad) {
            let Some(mover) = self.get(id) else { break };
            let mover_rect = mover.shape();
            let Some(wall) = self.get(wall_id) else {
                continue;
            };
            let Some(body) = wall.as_wall().copied() else {
                continue;
            };
            let wall_rect = wall.shape();
            let Some(push) = body.resolve(&mover_rect, &wall_rect) else {
                continue;
            };
            body.observe_contact(wall_id, id, push);
            if let Some(actor) = actor.as_mut() {
                let contact = WallContact {
                    wall: wall_id,
                    rect: wall_rect,
                    dirs: body.dirs(),
                    mtd: push,
                };
                actor.on_hit_wall(id, self, &contact);
            }
        }

        // Entity pass
        let others = self.entities_in(broad, |e| {
            e.id() != id && !e.is_wall() && e.mode() != CollisionMode::None
        });
        for other_id in others {
            let Some(mover) = self.get(id) else { break };
            let mover_rect = mover.shape();
            let Some(other) = self.get(other_id) else {
                continue;
            };
            let Some(push) = loam::mtd(&mover_rect, &other.shape()) else {
                continue;
            };
            if let Some(actor) = actor.as_mut() {
                actor.on_collide_into(id, self, other_id, push);
            }
            if let Some(mut other_actor) = self.take_actor(other_id) {
                other_actor.on_collide_from(other_id, self, id, push);
                self.restore_actor(other_id, other_actor);
            }
        }

        if let Some(actor) = actor {
            self.restore_actor(id, actor);
        }
    }
}
