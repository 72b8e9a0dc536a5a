//! Collision shape capability for scene nodes.
//!
//! A [`CollisionShape`] sits on its own node, parented under the body it
//! belongs to (its *owner*). Geometry is derived on demand from the shape
//! node's global matrix: the translation is the center, the matrix scale
//! stretches the radius or half-extent. Position correction moves the owner,
//! so the shape and any sibling nodes follow.
//!
//! # Layers and masks
//!
//! `layer` is what the shape is, `mask` is what it reacts to. A shape reacts
//! to another when its mask intersects the other's layer; the test is made
//! independently in each direction.
//!
//! # Notifications
//!
//! Listeners are plain callbacks registered with [`CollisionShape::subscribe`]
//! and removed with [`CollisionShape::unsubscribe`].
//! [`CollisionShape::subscribe_channel`] wraps a listener around a
//! crossbeam channel for consumers that prefer polling.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, unbounded};
use glam::{Affine2, Vec2};
use smallvec::SmallVec;
use std::fmt;

use crate::components::transform2d::matrix_scale;
use crate::events::collision::{CollisionInfo, CollisionNotice};
use crate::systems::narrowphase::{WorldShape, check_collision};

pub const DEFAULT_MAX_COLLISIONS_PER_FRAME: u32 = 32;
pub const DEFAULT_LAYER: u32 = 1;
pub const DEFAULT_MASK: u32 = 1;

/// Callback invoked for each delivered notification.
pub type CollisionCallback = Box<dyn FnMut(&mut World, &CollisionNotice) + Send + Sync>;

/// Handle returned by [`CollisionShape::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Local geometry of a shape, before the node's global matrix is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Circle { radius: f32 },
    /// Axis-aligned box centered on the node, `size` is the full width/height.
    Box { size: Vec2 },
}

#[derive(Component)]
pub struct CollisionShape {
    pub kind: ShapeKind,
    /// Submit a debug outline during draw.
    pub visible: bool,
    /// Static shapes never move during position correction.
    pub is_static: bool,
    pub active: bool,
    pub layer: u32,
    pub mask: u32,
    pub max_collisions_per_frame: u32,
    hits_this_frame: u32,
    listeners: SmallVec<[(ListenerId, CollisionCallback); 2]>,
    next_listener: u32,
    /// Ids of the listeners taken out for the current dispatch, if any.
    dispatching: SmallVec<[ListenerId; 2]>,
    unsubscribed_while_dispatching: SmallVec<[ListenerId; 2]>,
}

impl fmt::Debug for CollisionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionShape")
            .field("kind", &self.kind)
            .field("visible", &self.visible)
            .field("is_static", &self.is_static)
            .field("active", &self.active)
            .field("layer", &self.layer)
            .field("mask", &self.mask)
            .field("max_collisions_per_frame", &self.max_collisions_per_frame)
            .field("hits_this_frame", &self.hits_this_frame)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl CollisionShape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            visible: false,
            is_static: false,
            active: true,
            layer: DEFAULT_LAYER,
            mask: DEFAULT_MASK,
            max_collisions_per_frame: DEFAULT_MAX_COLLISIONS_PER_FRAME,
            hits_this_frame: 0,
            listeners: SmallVec::new(),
            next_listener: 0,
            dispatching: SmallVec::new(),
            unsubscribed_while_dispatching: SmallVec::new(),
        }
    }

    pub fn circle(radius: f32) -> Self {
        Self::new(ShapeKind::Circle { radius })
    }

    /// Axis-aligned box of the given full width and height.
    pub fn rect(width: f32, height: f32) -> Self {
        Self::new(ShapeKind::Box {
            size: Vec2::new(width, height),
        })
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_mask(mut self, mask: u32) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_max_collisions(mut self, max: u32) -> Self {
        self.max_collisions_per_frame = max;
        self
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// True when this shape's mask intersects `other`'s layer.
    pub fn reacts_to(&self, other: &CollisionShape) -> bool {
        (self.mask & other.layer) != 0
    }

    /// Notifications delivered so far this frame.
    pub fn hits_this_frame(&self) -> u32 {
        self.hits_this_frame
    }

    pub(crate) fn reset_hits(&mut self) {
        self.hits_this_frame = 0;
    }

    /// Counts a notification, or returns false once the per-frame budget is spent.
    pub(crate) fn try_record_hit(&mut self) -> bool {
        if self.hits_this_frame >= self.max_collisions_per_frame {
            return false;
        }
        self.hits_this_frame += 1;
        true
    }

    /// World-space geometry for the given global matrix.
    pub fn world_shape(&self, global: &Affine2) -> WorldShape {
        let center = global.translation;
        let scale = matrix_scale(global);
        match self.kind {
            ShapeKind::Circle { radius } => WorldShape::Circle {
                center,
                radius: radius * scale.x.max(scale.y),
            },
            ShapeKind::Box { size } => WorldShape::aabb_from_center(center, size * 0.5 * scale),
        }
    }

    /// Narrow-phase test against `other`. Inactive shapes never collide.
    pub fn check_collision(
        &self,
        global: &Affine2,
        other: &CollisionShape,
        other_global: &Affine2,
    ) -> CollisionInfo {
        if !self.active || !other.active {
            return CollisionInfo::NONE;
        }
        check_collision(&self.world_shape(global), &other.world_shape(other_global))
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&mut World, &CollisionNotice) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Removes a listener. Returns false if the id is unknown or was
    /// already removed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        if let Some(index) = self.listeners.iter().position(|(lid, _)| *lid == id) {
            drop(self.listeners.remove(index));
            return true;
        }
        if self.dispatching.contains(&id) && !self.unsubscribed_while_dispatching.contains(&id) {
            self.unsubscribed_while_dispatching.push(id);
            return true;
        }
        false
    }

    /// Delivers notices through a channel instead of a callback.
    pub fn subscribe_channel(&mut self) -> Receiver<CollisionNotice> {
        let (tx, rx) = unbounded();
        self.subscribe(move |_world, notice| {
            // receiver dropped: nobody is listening anymore
            let _ = tx.send(*notice);
        });
        rx
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn take_listeners(&mut self) -> SmallVec<[(ListenerId, CollisionCallback); 2]> {
        self.dispatching = self.listeners.iter().map(|(id, _)| *id).collect();
        std::mem::take(&mut self.listeners)
    }

    /// Puts dispatched listeners back in front of any added during dispatch.
    pub(crate) fn restore_listeners(
        &mut self,
        mut listeners: SmallVec<[(ListenerId, CollisionCallback); 2]>,
    ) {
        let removed = std::mem::take(&mut self.unsubscribed_while_dispatching);
        listeners.retain(|(id, _)| !removed.contains(id));
        listeners.extend(self.listeners.drain(..));
        self.listeners = listeners;
        self.dispatching.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn defaults() {
        let shape = CollisionShape::circle(4.0);
        assert!(shape.active);
        assert!(!shape.visible);
        assert!(!shape.is_static);
        assert_eq!(shape.layer, DEFAULT_LAYER);
        assert_eq!(shape.mask, DEFAULT_MASK);
        assert_eq!(shape.max_collisions_per_frame, 32);
        assert_eq!(shape.hits_this_frame(), 0);
    }

    #[test]
    fn reacts_to_is_directional() {
        let a = CollisionShape::circle(1.0).with_layer(0b01).with_mask(0b10);
        let b = CollisionShape::circle(1.0).with_layer(0b10).with_mask(0b100);
        assert!(a.reacts_to(&b));
        assert!(!b.reacts_to(&a));
    }

    #[test]
    fn hit_budget_stops_at_max() {
        let mut shape = CollisionShape::rect(1.0, 1.0).with_max_collisions(2);
        assert!(shape.try_record_hit());
        assert!(shape.try_record_hit());
        assert!(!shape.try_record_hit());
        assert_eq!(shape.hits_this_frame(), 2);
        shape.reset_hits();
        assert_eq!(shape.hits_this_frame(), 0);
        assert!(shape.try_record_hit());
    }

    #[test]
    fn world_shape_applies_translation_and_scale() {
        let global = Affine2::from_scale_angle_translation(
            Vec2::new(2.0, 3.0),
            0.0,
            Vec2::new(10.0, 20.0),
        );
        match CollisionShape::circle(5.0).world_shape(&global) {
            WorldShape::Circle { center, radius } => {
                assert_eq!(center, Vec2::new(10.0, 20.0));
                assert!(approx_eq(radius, 15.0));
            }
            other => panic!("expected circle, got {other:?}"),
        }
        match CollisionShape::rect(4.0, 2.0).world_shape(&global) {
            WorldShape::Aabb { min, max } => {
                assert!(approx_eq(min.x, 6.0) && approx_eq(min.y, 17.0));
                assert!(approx_eq(max.x, 14.0) && approx_eq(max.y, 23.0));
            }
            other => panic!("expected box, got {other:?}"),
        }
    }

    #[test]
    fn inactive_shape_never_collides() {
        let at = |x: f32| Affine2::from_translation(Vec2::new(x, 0.0));
        let mut a = CollisionShape::circle(5.0);
        let b = CollisionShape::circle(5.0);
        assert!(a.check_collision(&at(0.0), &b, &at(8.0)).has_collision);
        a.set_active(false);
        assert!(!a.check_collision(&at(0.0), &b, &at(8.0)).has_collision);
    }

    #[test]
    fn subscribe_and_unsubscribe() {
        let mut shape = CollisionShape::circle(1.0);
        let first = shape.subscribe(|_, _| {});
        let second = shape.subscribe(|_, _| {});
        assert_ne!(first, second);
        assert_eq!(shape.listener_count(), 2);
        assert!(shape.unsubscribe(first));
        assert!(!shape.unsubscribe(first));
        assert_eq!(shape.listener_count(), 1);
    }

    #[test]
    fn listeners_added_during_dispatch_are_kept_after_existing_ones() {
        let mut shape = CollisionShape::circle(1.0);
        let first = shape.subscribe(|_, _| {});
        let taken = shape.take_listeners();
        let added = shape.subscribe(|_, _| {});
        assert!(shape.unsubscribe(first));
        shape.restore_listeners(taken);
        assert_eq!(shape.listener_count(), 1);
        assert!(shape.unsubscribe(added));
    }

    #[test]
    fn unsubscribe_during_dispatch_only_accepts_dispatched_ids() {
        let mut shape = CollisionShape::circle(1.0);
        let gone = shape.subscribe(|_, _| {});
        let kept = shape.subscribe(|_, _| {});
        assert!(shape.unsubscribe(gone));

        let taken = shape.take_listeners();
        assert!(!shape.unsubscribe(gone));
        assert!(!shape.unsubscribe(ListenerId(99)));
        assert!(shape.unsubscribe(kept));
        assert!(!shape.unsubscribe(kept));
        shape.restore_listeners(taken);

        assert_eq!(shape.listener_count(), 0);
        assert!(!shape.unsubscribe(kept));
    }
}
