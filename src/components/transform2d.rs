//! Local 2D transform of a scene node.
//!
//! The local matrix applies scale, then rotation, then translation. A node's
//! global matrix is its parent's global matrix composed with its local one;
//! see [`global_matrix`](crate::systems::hierarchy::global_matrix).

use bevy_ecs::prelude::Component;
use glam::{Affine2, Vec2};

/// Local position, rotation (radians) and scale of a node.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl Transform2D {
    /// Transform at the given local position with no rotation and unit scale.
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn with_scale(mut self, sx: f32, sy: f32) -> Self {
        self.scale = Vec2::new(sx, sy);
        self
    }

    /// Scale, then rotate, then translate.
    pub fn local_matrix(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation, self.position)
    }
}

/// Per-axis scale baked into an affine matrix (lengths of its basis columns).
pub fn matrix_scale(matrix: &Affine2) -> Vec2 {
    Vec2::new(matrix.matrix2.x_axis.length(), matrix.matrix2.y_axis.length())
}
