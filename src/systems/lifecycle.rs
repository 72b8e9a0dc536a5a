//! Node lifecycle: start and end cascades, removal, deferral.
//!
//! Both cascades are depth-first with children handled before their parent:
//! children, then the node's collision shape and attached scripts, then the
//! node's own logic. A node moves `Constructed -> Started -> Ended` and never
//! leaves `Ended`.
//!
//! [`queue_free`] never touches the tree directly. It flags the node and
//! parks a [`DeferredAction::DetachAndEnd`] on the world's
//! [`DeferredQueue`], which the frame drains after collision processing.

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::components::behavior::{run_behaviors, run_logic};
use crate::components::collisionshape::CollisionShape;
use crate::components::node::{Lifecycle, Node};
use crate::error::{KernelError, KernelResult};
use crate::resources::collisionregistry::CollisionRegistry;
use crate::resources::deferredqueue::{DeferredAction, DeferredQueue};
use crate::systems::hierarchy::children_of;

fn set_lifecycle(world: &mut World, entity: Entity, lifecycle: Lifecycle) {
    if let Some(mut node) = world.get_mut::<Node>(entity) {
        node.lifecycle = lifecycle;
    }
}

/// Starts `entity` and its subtree.
///
/// Already-started nodes are skipped; ended nodes cannot be restarted.
pub fn start_node(world: &mut World, entity: Entity) {
    let Some(lifecycle) = world.get::<Node>(entity).map(|n| n.lifecycle()) else {
        return;
    };
    match lifecycle {
        Lifecycle::Constructed => {}
        Lifecycle::Started => {
            debug!("start_node: {entity:?} already started");
            return;
        }
        Lifecycle::Ended => {
            warn!("start_node: {entity:?} has ended and cannot be restarted");
            return;
        }
    }
    set_lifecycle(world, entity, Lifecycle::Started);

    for child in children_of(world, entity) {
        start_node(world, child);
    }
    if world.get::<CollisionShape>(entity).is_some() {
        world
            .get_resource_or_insert_with(CollisionRegistry::default)
            .register(entity);
    }
    run_behaviors(world, entity, |behavior, ctx| behavior.start(ctx));
    run_logic(world, entity, |logic, ctx| logic.start(ctx));
    debug!("started {entity:?}");
}

/// Ends `entity` and its subtree. Ending twice is a no-op.
pub fn end_node(world: &mut World, entity: Entity) {
    let Some(lifecycle) = world.get::<Node>(entity).map(|n| n.lifecycle()) else {
        return;
    };
    if lifecycle == Lifecycle::Ended {
        debug!("end_node: {entity:?} already ended");
        return;
    }
    set_lifecycle(world, entity, Lifecycle::Ended);

    for child in children_of(world, entity) {
        end_node(world, child);
    }
    if world.get::<CollisionShape>(entity).is_some() {
        if let Some(mut registry) = world.get_resource_mut::<CollisionRegistry>() {
            registry.unregister(entity);
        }
    }
    run_behaviors(world, entity, |behavior, ctx| behavior.end(ctx));
    run_logic(world, entity, |logic, ctx| logic.end(ctx));
    debug!("ended {entity:?}");
}

/// Schedules `entity` to be detached and ended at the next deferred drain.
///
/// A second call before the drain only logs a warning.
pub fn queue_free(world: &mut World, entity: Entity) -> KernelResult<()> {
    {
        let mut node = world
            .get_mut::<Node>(entity)
            .ok_or(KernelError::MissingEntity(entity))?;
        if node.pending_removal {
            warn!("queue_free: {entity:?} ({}) is already queued for removal", node.name);
            return Ok(());
        }
        node.pending_removal = true;
    }
    deferred_queue(world).enqueue(DeferredAction::DetachAndEnd(entity));
    Ok(())
}

/// Runs `action` at the next deferred drain.
pub fn call_deferred(world: &mut World, action: impl FnOnce(&mut World) + Send + Sync + 'static) {
    deferred_queue(world).enqueue(DeferredAction::call(action));
}

/// Toggles the enabled flag. Ended nodes are left alone.
pub fn set_enabled(world: &mut World, entity: Entity, enabled: bool) -> KernelResult<()> {
    let mut node = world
        .get_mut::<Node>(entity)
        .ok_or(KernelError::MissingEntity(entity))?;
    if node.is_ended() {
        warn!("set_enabled: {entity:?} has ended");
        return Ok(());
    }
    node.enabled = enabled;
    Ok(())
}

pub(crate) fn deferred_queue(world: &mut World) -> Mut<'_, DeferredQueue> {
    world.get_resource_or_insert_with(DeferredQueue::default)
}
