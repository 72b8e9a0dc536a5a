//! Deferred action queue.
//!
//! Structural changes requested while the tree or the collision registry is
//! being walked are parked here and applied by
//! [`process_deferred`](crate::systems::deferred::process_deferred) at the
//! end of the frame. The queue is FIFO and drains to empty: actions enqueued
//! by an action run during the same drain.

use bevy_ecs::prelude::*;
use std::collections::VecDeque;
use std::fmt;

use crate::error::{KernelError, KernelResult};

/// Boxed one-shot callback run against the world.
pub type DeferredFn = Box<dyn FnOnce(&mut World) + Send + Sync>;

/// A unit of deferred work.
pub enum DeferredAction {
    /// Detach the node from its parent, end it, then despawn its subtree.
    DetachAndEnd(Entity),
    Call(DeferredFn),
}

impl DeferredAction {
    pub fn call(action: impl FnOnce(&mut World) + Send + Sync + 'static) -> Self {
        DeferredAction::Call(Box::new(action))
    }
}

impl fmt::Debug for DeferredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferredAction::DetachAndEnd(entity) => {
                f.debug_tuple("DetachAndEnd").field(entity).finish()
            }
            DeferredAction::Call(_) => f.write_str("Call(..)"),
        }
    }
}

#[derive(Resource, Default, Debug)]
pub struct DeferredQueue {
    actions: VecDeque<DeferredAction>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, action: DeferredAction) {
        self.actions.push_back(action);
    }

    /// Enqueues an action coming from a bridge that may hand over an empty slot.
    pub fn try_enqueue(&mut self, action: Option<DeferredAction>) -> KernelResult<()> {
        let action = action.ok_or(KernelError::NullDeferredAction)?;
        self.enqueue(action);
        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<DeferredAction> {
        self.actions.pop_front()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}
