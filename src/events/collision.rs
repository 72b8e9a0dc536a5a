//! Collision result and notification payloads.
//!
//! The narrow phase produces a [`CollisionInfo`] per tested pair. When the
//! resolver decides a shape should hear about a contact, it hands the shape's
//! listeners a [`CollisionNotice`] naming the shape, the other shape, and the
//! info oriented for the receiver (the second shape of a pair gets the
//! normal negated).

use bevy_ecs::prelude::Entity;
use glam::Vec2;

/// Outcome of a narrow-phase test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    pub has_collision: bool,
    /// Unit separating direction. Zero when there is no collision.
    pub normal: Vec2,
    /// Overlap depth, never negative.
    pub penetration: f32,
}

impl CollisionInfo {
    /// Result of any non-overlapping test.
    pub const NONE: Self = Self {
        has_collision: false,
        normal: Vec2::ZERO,
        penetration: 0.0,
    };

    pub fn hit(normal: Vec2, penetration: f32) -> Self {
        Self {
            has_collision: true,
            normal,
            penetration: penetration.max(0.0),
        }
    }

    /// Same contact seen from the other shape.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            ..*self
        }
    }
}

impl Default for CollisionInfo {
    fn default() -> Self {
        Self::NONE
    }
}

/// Payload delivered to a shape's collision listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionNotice {
    /// The shape being notified.
    pub shape: Entity,
    /// The shape it touched.
    pub other: Entity,
    pub info: CollisionInfo,
}
