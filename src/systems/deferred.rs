//! Deferred queue drain.
//!
//! [`process_deferred`] is the last system of the frame. It pops and applies
//! actions until the queue is empty, so an action that enqueues more work
//! (a `queue_free` inside an `end` hook, for instance) is applied within the
//! same drain and before the frame is drawn.

use bevy_ecs::prelude::*;
use log::{debug, trace};

use crate::resources::activescene::ActiveScene;
use crate::resources::deferredqueue::{DeferredAction, DeferredQueue};
use crate::systems::hierarchy::{parent_of, remove_child};
use crate::systems::lifecycle::end_node;

/// Exclusive system: drains the [`DeferredQueue`] to empty.
pub fn process_deferred(world: &mut World) {
    let mut applied = 0usize;
    loop {
        // Popped one at a time so actions can enqueue onto the live queue.
        let Some(action) = world
            .get_resource_mut::<DeferredQueue>()
            .and_then(|mut queue| queue.pop_front())
        else {
            break;
        };
        apply(world, action);
        applied += 1;
    }
    if applied > 0 {
        trace!("deferred: applied {applied} action(s)");
    }
}

fn apply(world: &mut World, action: DeferredAction) {
    match action {
        DeferredAction::DetachAndEnd(entity) => detach_and_end(world, entity),
        DeferredAction::Call(callback) => callback(world),
    }
}

fn detach_and_end(world: &mut World, entity: Entity) {
    if world.get_entity(entity).is_err() {
        debug!("deferred: {entity:?} is already gone");
        return;
    }
    if let Some(parent) = parent_of(world, entity) {
        remove_child(world, parent, entity);
    }
    end_node(world, entity);

    if let Some(mut scene) = world.get_resource_mut::<ActiveScene>() {
        if scene.root == Some(entity) {
            scene.root = None;
        }
    }
    if let Ok(entity_mut) = world.get_entity_mut(entity) {
        entity_mut.despawn();
    }
    debug!("deferred: removed {entity:?}");
}
