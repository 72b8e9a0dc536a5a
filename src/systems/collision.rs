//! Collision processing: all-pairs detection, resolution and notification.
//!
//! [`process_collisions`] runs once per frame after the scene update:
//!
//! 1. Every registered shape's hit counter goes back to zero.
//! 2. Each unordered pair `(i, j)`, `i < j`, in registration order is
//!    tested unless a shape is inactive or neither mask matches the other's
//!    layer.
//! 3. On contact, if both shapes react to each other, their owners are
//!    pushed apart first. Then each shape that reacts to the other is
//!    notified; the second shape of the pair gets the normal negated.
//! 4. A shape that has used up `max_collisions_per_frame` notifications
//!    drops any further ones for the rest of the frame.
//!
//! Geometry is read fresh for every pair, so corrections made earlier in
//! the pass are seen by later pairs. Removals requested by listeners go
//! through the deferred queue and take effect after the pass.

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{error, trace};

use crate::components::collisionshape::CollisionShape;
use crate::events::collision::{CollisionInfo, CollisionNotice};
use crate::resources::collisionregistry::CollisionRegistry;
use crate::systems::hierarchy::{global_matrix, parent_of, translate_global};
use crate::systems::narrowphase::{WorldShape, check_collision};

/// What the pair loop needs to know about one shape.
#[derive(Debug, Clone, Copy)]
struct ShapeState {
    entity: Entity,
    active: bool,
    is_static: bool,
    layer: u32,
    mask: u32,
    geometry: WorldShape,
}

impl ShapeState {
    fn read(world: &World, entity: Entity) -> Option<Self> {
        let shape = world.get::<CollisionShape>(entity)?;
        Some(Self {
            entity,
            active: shape.active,
            is_static: shape.is_static,
            layer: shape.layer,
            mask: shape.mask,
            geometry: shape.world_shape(&global_matrix(world, entity)),
        })
    }

    fn reacts_to(&self, other: &ShapeState) -> bool {
        (self.mask & other.layer) != 0
    }
}

/// Exclusive system: one full collision pass over the registry.
pub fn process_collisions(world: &mut World) {
    let shapes = {
        let Some(mut registry) = world.get_resource_mut::<CollisionRegistry>() else {
            return;
        };
        registry.begin_pass();
        registry.shapes().to_vec()
    };

    for &entity in &shapes {
        if let Some(mut shape) = world.get_mut::<CollisionShape>(entity) {
            shape.reset_hits();
        }
    }

    for i in 0..shapes.len() {
        for j in (i + 1)..shapes.len() {
            process_pair(world, shapes[i], shapes[j]);
        }
    }

    if let Some(mut registry) = world.get_resource_mut::<CollisionRegistry>() {
        registry.end_pass();
    }
}

fn process_pair(world: &mut World, entity_a: Entity, entity_b: Entity) {
    let (Some(a), Some(b)) = (
        ShapeState::read(world, entity_a),
        ShapeState::read(world, entity_b),
    ) else {
        return;
    };
    if !a.active || !b.active {
        return;
    }
    let a_reacts = a.reacts_to(&b);
    let b_reacts = b.reacts_to(&a);
    if !a_reacts && !b_reacts {
        return;
    }

    let info = check_collision(&a.geometry, &b.geometry);
    if !info.has_collision {
        return;
    }
    trace!(
        "collision {:?} <-> {:?}: normal={} penetration={}",
        a.entity, b.entity, info.normal, info.penetration
    );

    if a_reacts && b_reacts {
        correct_positions(world, &a, &b, &info);
    }
    if a_reacts {
        notify(world, a.entity, b.entity, info);
    }
    if b_reacts {
        notify(world, b.entity, a.entity, info.flipped());
    }
}

/// Direction in which `b` must move to leave `a`: the contact normal,
/// flipped if needed so it points from `a`'s center toward `b`'s.
fn separation_direction(a: &ShapeState, b: &ShapeState, normal: Vec2) -> Vec2 {
    let centers = b.geometry.center() - a.geometry.center();
    if centers.dot(normal) < 0.0 { -normal } else { normal }
}

fn correct_positions(world: &mut World, a: &ShapeState, b: &ShapeState, info: &CollisionInfo) {
    let direction = separation_direction(a, b, info.normal);
    let depth = info.penetration;
    match (a.is_static, b.is_static) {
        (false, false) => {
            move_owner(world, a, -direction * depth * 0.5);
            move_owner(world, b, direction * depth * 0.5);
        }
        (true, false) => move_owner(world, b, direction * depth),
        (false, true) => move_owner(world, a, -direction * depth),
        (true, true) => {}
    }
}

/// Moves the body a shape belongs to, i.e. the shape node's parent.
fn move_owner(world: &mut World, shape: &ShapeState, offset: Vec2) {
    let owner = parent_of(world, shape.entity);
    debug_assert!(
        owner.is_some(),
        "collision shape {:?} has no owner to correct",
        shape.entity
    );
    let Some(owner) = owner else {
        error!("collision: shape {:?} has no owner; skipping correction", shape.entity);
        return;
    };
    if let Err(e) = translate_global(world, owner, offset) {
        error!("collision: failed to move owner {owner:?}: {e}");
    }
}

fn notify(world: &mut World, target: Entity, other: Entity, info: CollisionInfo) {
    let mut listeners = {
        let Some(mut shape) = world.get_mut::<CollisionShape>(target) else {
            return;
        };
        if !shape.try_record_hit() {
            trace!("collision: {target:?} is over its per-frame budget, dropping hit");
            return;
        }
        shape.take_listeners()
    };

    let notice = CollisionNotice {
        shape: target,
        other,
        info,
    };
    for (_, callback) in listeners.iter_mut() {
        callback(world, &notice);
    }

    if let Some(mut shape) = world.get_mut::<CollisionShape>(target) {
        shape.restore_listeners(listeners);
    }
}
