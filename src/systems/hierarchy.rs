//! Scene-tree structure: parenting, lookups, and transform composition.
//!
//! Parent links are bevy's [`ChildOf`] relationship and child lists are the
//! matching [`Children`] target, which keeps insertion order. Every function
//! here works directly on a `&World`/`&mut World` so it can be called from
//! systems, hooks, deferred actions and tests alike.
//!
//! Global matrices are computed on demand by walking up the parent chain;
//! nothing is cached, so a position written during the frame is visible to
//! the very next query.

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;
use glam::{Affine2, Vec2};
use log::{error, warn};

use crate::components::node::{Lifecycle, Node};
use crate::components::transform2d::Transform2D;
use crate::error::{KernelError, KernelResult};
use crate::systems::lifecycle::start_node;

/// Spawns a detached, not-yet-started node.
pub fn spawn_node(world: &mut World, name: impl Into<String>, transform: Transform2D) -> Entity {
    world.spawn((Node::new(name), transform)).id()
}

pub fn is_node(world: &World, entity: Entity) -> bool {
    world.get::<Node>(entity).is_some()
}

pub(crate) fn ensure_node(world: &World, entity: Entity) -> KernelResult<()> {
    if is_node(world, entity) {
        Ok(())
    } else {
        Err(KernelError::MissingEntity(entity))
    }
}

pub fn node_name(world: &World, entity: Entity) -> Option<&str> {
    world.get::<Node>(entity).map(|n| n.name.as_str())
}

pub fn parent_of(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<ChildOf>(entity).map(|c| c.parent())
}

/// Current children of `entity`, in order.
pub fn children_of(world: &World, entity: Entity) -> Vec<Entity> {
    world
        .get::<Children>(entity)
        .map(|children| children.to_vec())
        .unwrap_or_default()
}

/// True if `ancestor` is `entity` or sits anywhere above it.
pub fn is_ancestor_or_self(world: &World, ancestor: Entity, entity: Entity) -> bool {
    let mut current = Some(entity);
    while let Some(e) = current {
        if e == ancestor {
            return true;
        }
        current = parent_of(world, e);
    }
    false
}

/// Makes `child` the last child of `parent`.
///
/// A child that already has a parent is detached from it first. Attaching a
/// not-yet-started child under a started parent starts the child's subtree.
/// Ended nodes are refused with [`KernelError::InvalidHierarchy`].
///
/// # Panics
///
/// In debug builds, if `child` is `parent` or one of its ancestors.
pub fn add_child(world: &mut World, parent: Entity, child: Entity) -> KernelResult<()> {
    debug_assert_ne!(parent, child, "a node cannot be its own parent");
    if parent == child {
        error!("add_child: {child:?} cannot be its own parent");
        return Err(KernelError::InvalidHierarchy(format!(
            "{child:?} cannot be its own parent"
        )));
    }
    ensure_node(world, parent)?;
    ensure_node(world, child)?;
    if world.get::<Node>(child).is_some_and(|n| n.is_ended()) {
        warn!("add_child: {child:?} has ended and cannot rejoin the tree");
        return Err(KernelError::InvalidHierarchy(format!("{child:?} has ended")));
    }

    let creates_cycle = is_ancestor_or_self(world, child, parent);
    debug_assert!(
        !creates_cycle,
        "adding {child:?} under {parent:?} would create a cycle"
    );
    if creates_cycle {
        error!("add_child: {child:?} is an ancestor of {parent:?}");
        return Err(KernelError::InvalidHierarchy(format!(
            "{child:?} is an ancestor of {parent:?}"
        )));
    }

    if let Some(old_parent) = parent_of(world, child) {
        remove_child(world, old_parent, child);
    }
    world.entity_mut(child).insert(ChildOf(parent));

    let parent_started = world.get::<Node>(parent).is_some_and(|n| n.is_started());
    let child_constructed = world
        .get::<Node>(child)
        .is_some_and(|n| n.lifecycle() == Lifecycle::Constructed);
    if parent_started && child_constructed {
        start_node(world, child);
    }
    Ok(())
}

/// Detaches `child` from `parent`. Returns false, changing nothing, if
/// `child` is not currently a child of `parent`.
pub fn remove_child(world: &mut World, parent: Entity, child: Entity) -> bool {
    if parent_of(world, child) != Some(parent) {
        return false;
    }
    world.entity_mut(child).remove::<ChildOf>();
    true
}

/// First child carrying component `T`, optionally also matching `name`.
pub fn find_child<T: Component>(
    world: &World,
    parent: Entity,
    name: Option<&str>,
) -> KernelResult<Entity> {
    children_with::<T>(world, parent)
        .find(|child| name.is_none_or(|wanted| node_name(world, *child) == Some(wanted)))
        .ok_or_else(|| KernelError::NotFound {
            parent,
            query: match name {
                Some(name) => format!("{} named {name:?}", std::any::type_name::<T>()),
                None => std::any::type_name::<T>().to_string(),
            },
        })
}

pub fn find_child_by_name(world: &World, parent: Entity, name: &str) -> KernelResult<Entity> {
    find_child::<Node>(world, parent, Some(name))
}

/// Lazily yields the children of `parent` that carry component `T`.
///
/// The child list is captured when called; the component test runs as the
/// iterator advances. The iterator is `Clone`, so a copy taken before
/// iterating restarts from the first child.
pub fn children_with<T: Component>(
    world: &World,
    parent: Entity,
) -> impl Iterator<Item = Entity> + Clone + '_ {
    children_of(world, parent)
        .into_iter()
        .filter(move |child| world.get::<T>(*child).is_some())
}

pub fn local_matrix(world: &World, entity: Entity) -> Affine2 {
    world
        .get::<Transform2D>(entity)
        .map(|t| t.local_matrix())
        .unwrap_or(Affine2::IDENTITY)
}

/// Local matrix composed with every ancestor's, root last.
pub fn global_matrix(world: &World, entity: Entity) -> Affine2 {
    let mut matrix = local_matrix(world, entity);
    let mut current = parent_of(world, entity);
    while let Some(parent) = current {
        matrix = local_matrix(world, parent) * matrix;
        current = parent_of(world, parent);
    }
    matrix
}

pub fn global_position(world: &World, entity: Entity) -> Vec2 {
    global_matrix(world, entity).translation
}

/// Moves `entity` so its global position becomes `position`.
///
/// With a parent, the target point is brought into the parent's space
/// through the inverse of the parent's global matrix.
pub fn set_global_position(world: &mut World, entity: Entity, position: Vec2) -> KernelResult<()> {
    let local = match parent_of(world, entity) {
        Some(parent) => global_matrix(world, parent)
            .inverse()
            .transform_point2(position),
        None => position,
    };
    let mut transform = world
        .get_mut::<Transform2D>(entity)
        .ok_or(KernelError::MissingEntity(entity))?;
    transform.position = local;
    Ok(())
}

/// Moves `entity` by `offset` in world space.
pub fn translate_global(world: &mut World, entity: Entity, offset: Vec2) -> KernelResult<()> {
    let target = global_position(world, entity) + offset;
    set_global_position(world, entity, target)
}
