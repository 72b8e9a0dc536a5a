//! Per-frame update and draw traversals of the scene tree.
//!
//! Update visits, for each node: own `update`, every child in order, every
//! attached script's `update` then every script's `update_done`, own
//! `update_done`. A disabled or pending-removal node skips its whole subtree.
//!
//! Draw visits: own `draw`, the collision shape's debug outline, every
//! child, the scripts' `draw` then `draw_done`, own `draw_done`. Only
//! disabled nodes are skipped here, so a node queued for removal is drawn
//! until the deferred drain takes it out.
//!
//! Ended nodes are never visited by either walk.
//!
//! Child lists are copied before recursing, so hooks may reparent or add
//! nodes without invalidating the walk.

use bevy_ecs::prelude::*;

use crate::components::behavior::{run_behaviors, run_logic};
use crate::components::collisionshape::CollisionShape;
use crate::components::node::Node;
use crate::render::{DebugColor, RenderSurface};
use crate::resources::activescene::ActiveScene;
use crate::resources::worldtime::WorldTime;
use crate::systems::hierarchy::{children_of, global_matrix};
use crate::systems::narrowphase::WorldShape;

pub fn update_node(world: &mut World, entity: Entity, dt: f32) {
    let Some(node) = world.get::<Node>(entity) else {
        return;
    };
    if node.pending_removal || !node.enabled || node.is_ended() {
        return;
    }

    run_logic(world, entity, |logic, ctx| logic.update(ctx, dt));
    for child in children_of(world, entity) {
        update_node(world, child, dt);
    }
    run_behaviors(world, entity, |behavior, ctx| behavior.update(ctx, dt));
    run_behaviors(world, entity, |behavior, ctx| behavior.update_done(ctx, dt));
    run_logic(world, entity, |logic, ctx| logic.update_done(ctx, dt));
}

pub fn draw_node(world: &mut World, entity: Entity, surface: &mut dyn RenderSurface) {
    let Some(node) = world.get::<Node>(entity) else {
        return;
    };
    if !node.enabled || node.is_ended() {
        return;
    }

    run_logic(world, entity, |logic, ctx| logic.draw(ctx, &mut *surface));
    draw_shape_outline(world, entity, surface);
    for child in children_of(world, entity) {
        draw_node(world, child, surface);
    }
    run_behaviors(world, entity, |behavior, ctx| behavior.draw(ctx, &mut *surface));
    run_behaviors(world, entity, |behavior, ctx| behavior.draw_done(ctx, &mut *surface));
    run_logic(world, entity, |logic, ctx| logic.draw_done(ctx, &mut *surface));
}

fn draw_shape_outline(world: &World, entity: Entity, surface: &mut dyn RenderSurface) {
    let Some(shape) = world.get::<CollisionShape>(entity) else {
        return;
    };
    if !shape.visible {
        return;
    }
    let color = if !shape.active {
        DebugColor::Inactive
    } else if shape.is_static {
        DebugColor::Static
    } else {
        DebugColor::Active
    };
    match shape.world_shape(&global_matrix(world, entity)) {
        WorldShape::Circle { center, radius } => surface.draw_circle(center, radius, color),
        WorldShape::Aabb { min, max } => surface.draw_rect(min, max - min, color),
    }
}

/// Exclusive system: updates the active scene root with the frame's scaled delta.
pub fn update_scene(world: &mut World) {
    let Some(root) = world.get_resource::<ActiveScene>().and_then(|s| s.root) else {
        return;
    };
    let dt = world
        .get_resource::<WorldTime>()
        .map(|t| t.delta)
        .unwrap_or(0.0);
    update_node(world, root, dt);
}

/// Draws the active scene, if any.
pub fn draw_scene(world: &mut World, surface: &mut dyn RenderSurface) {
    if let Some(root) = world.get_resource::<ActiveScene>().and_then(|s| s.root) {
        draw_node(world, root, surface);
    }
}
