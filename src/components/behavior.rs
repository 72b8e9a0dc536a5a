//! Per-node logic and attached scripts.
//!
//! A node's own logic is a single [`NodeLogic`]; attached scripts live in
//! [`Behaviors`]. Both hold boxed [`Behavior`] values, a trait whose hooks
//! all default to no-ops so implementors only write the ones they need.
//!
//! # Hook order
//!
//! - start / end: children, then attached behaviors, then own logic
//! - update: own `update`, children, attached behaviors' `update` then
//!   `update_done`, own `update_done`
//! - draw: own `draw`, shape debug outline, children, attached behaviors'
//!   `draw` then `draw_done`, own `draw_done`
//!
//! Hooks receive a [`NodeContext`] borrowing the world, so they can inspect
//! and mutate the tree. Structural removals should go through
//! [`NodeContext::queue_free`] or [`NodeContext::call_deferred`], which apply
//! at the end of the frame instead of mid-traversal.

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::node::Node;
use crate::components::transform2d::Transform2D;
use crate::error::KernelResult;
use crate::render::RenderSurface;
use crate::systems::hierarchy;
use crate::systems::lifecycle;

/// Lifecycle callbacks for node logic and scripts.
pub trait Behavior: Send + Sync + 'static {
    fn start(&mut self, _ctx: &mut NodeContext<'_>) {}
    fn update(&mut self, _ctx: &mut NodeContext<'_>, _dt: f32) {}
    /// Runs after the node's children and scripts have updated.
    fn update_done(&mut self, _ctx: &mut NodeContext<'_>, _dt: f32) {}
    fn draw(&mut self, _ctx: &mut NodeContext<'_>, _surface: &mut dyn RenderSurface) {}
    fn draw_done(&mut self, _ctx: &mut NodeContext<'_>, _surface: &mut dyn RenderSurface) {}
    fn end(&mut self, _ctx: &mut NodeContext<'_>) {}
}

/// The node's own type-specific logic.
#[derive(Component)]
pub struct NodeLogic(pub Box<dyn Behavior>);

impl NodeLogic {
    pub fn new(behavior: impl Behavior) -> Self {
        Self(Box::new(behavior))
    }
}

/// Scripts attached to a node, run in insertion order.
#[derive(Component, Default)]
pub struct Behaviors(pub Vec<Box<dyn Behavior>>);

impl Behaviors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, behavior: impl Behavior) -> Self {
        self.0.push(Box::new(behavior));
        self
    }

    pub fn push(&mut self, behavior: impl Behavior) {
        self.0.push(Box::new(behavior));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// World access handed to a hook, scoped to the node being visited.
pub struct NodeContext<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> NodeContext<'w> {
    pub fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn world(&self) -> &World {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    pub fn node(&self) -> Option<&Node> {
        self.world.get::<Node>(self.entity)
    }

    pub fn parent(&self) -> Option<Entity> {
        hierarchy::parent_of(self.world, self.entity)
    }

    pub fn transform(&self) -> Option<&Transform2D> {
        self.world.get::<Transform2D>(self.entity)
    }

    pub fn transform_mut(&mut self) -> Option<Mut<'_, Transform2D>> {
        self.world.get_mut::<Transform2D>(self.entity)
    }

    pub fn global_position(&self) -> Vec2 {
        hierarchy::global_position(self.world, self.entity)
    }

    pub fn set_global_position(&mut self, position: Vec2) -> KernelResult<()> {
        hierarchy::set_global_position(self.world, self.entity, position)
    }

    /// Schedules this node for removal at the end of the frame.
    pub fn queue_free(&mut self) -> KernelResult<()> {
        lifecycle::queue_free(self.world, self.entity)
    }

    pub fn call_deferred(&mut self, action: impl FnOnce(&mut World) + Send + Sync + 'static) {
        lifecycle::call_deferred(self.world, action);
    }
}

/// Runs `hook` on the node's own logic, if any.
///
/// The component is taken out of the entity for the duration of the call so
/// the hook can borrow the world mutably. If the hook installed a different
/// `NodeLogic` in the meantime, that one wins.
pub(crate) fn run_logic(
    world: &mut World,
    entity: Entity,
    hook: impl FnOnce(&mut dyn Behavior, &mut NodeContext<'_>),
) {
    let Some(mut logic) = world
        .get_entity_mut(entity)
        .ok()
        .and_then(|mut e| e.take::<NodeLogic>())
    else {
        return;
    };

    {
        let mut ctx = NodeContext::new(world, entity);
        hook(logic.0.as_mut(), &mut ctx);
    }

    if let Ok(mut e) = world.get_entity_mut(entity) {
        if !e.contains::<NodeLogic>() {
            e.insert(logic);
        }
    }
}

/// Runs `hook` on every attached script, in order.
///
/// Scripts attached while the hooks run are kept and appended after the
/// existing ones; they are first called on the next traversal.
pub(crate) fn run_behaviors(
    world: &mut World,
    entity: Entity,
    mut hook: impl FnMut(&mut dyn Behavior, &mut NodeContext<'_>),
) {
    let Some(mut behaviors) = world
        .get_entity_mut(entity)
        .ok()
        .and_then(|mut e| e.take::<Behaviors>())
    else {
        return;
    };

    for behavior in behaviors.0.iter_mut() {
        let mut ctx = NodeContext::new(world, entity);
        hook(behavior.as_mut(), &mut ctx);
    }

    if let Ok(mut e) = world.get_entity_mut(entity) {
        if let Some(added) = e.take::<Behaviors>() {
            behaviors.0.extend(added.0);
        }
        e.insert(behaviors);
    }
}
