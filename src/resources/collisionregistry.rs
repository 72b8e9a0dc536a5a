//! Registry of shapes taking part in collision processing.
//!
//! Membership is by entity identity and registration order is preserved,
//! since pair iteration follows it. One registry lives in each world; the
//! scene swap clears it.

use bevy_ecs::prelude::*;
use log::debug;
use rustc_hash::FxHashSet;

#[derive(Resource, Default, Debug)]
pub struct CollisionRegistry {
    shapes: Vec<Entity>,
    members: FxHashSet<Entity>,
    processing: bool,
}

impl CollisionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shape. Returns false if it was already registered.
    pub fn register(&mut self, shape: Entity) -> bool {
        self.assert_not_processing("register");
        if !self.members.insert(shape) {
            return false;
        }
        self.shapes.push(shape);
        debug!("collision: registered {shape:?}");
        true
    }

    /// Removes a shape. Returns false if it was not registered.
    pub fn unregister(&mut self, shape: Entity) -> bool {
        self.assert_not_processing("unregister");
        if !self.members.remove(&shape) {
            return false;
        }
        self.shapes.retain(|e| *e != shape);
        debug!("collision: unregistered {shape:?}");
        true
    }

    pub fn reset(&mut self) {
        self.assert_not_processing("reset");
        self.shapes.clear();
        self.members.clear();
    }

    pub fn contains(&self, shape: Entity) -> bool {
        self.members.contains(&shape)
    }

    /// Registered shapes in registration order.
    pub fn shapes(&self) -> &[Entity] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub(crate) fn begin_pass(&mut self) {
        self.processing = true;
    }

    pub(crate) fn end_pass(&mut self) {
        self.processing = false;
    }

    fn assert_not_processing(&self, op: &str) {
        debug_assert!(
            !self.processing,
            "collision registry {op} during collision processing; defer it with call_deferred"
        );
    }
}
