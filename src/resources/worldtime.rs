//! Simulation clock.
//!
//! Advanced once per kernel frame by
//! [`update_world_time`](crate::systems::time::update_world_time), before the
//! scene update runs.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct WorldTime {
    /// Scaled seconds since the kernel was created.
    pub elapsed: f32,
    /// Scaled delta of the current frame.
    pub delta: f32,
    /// Multiplier applied to every incoming frame delta.
    pub time_scale: f32,
    /// Frames run so far.
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// `dt` with the current time scale applied.
    pub fn scaled(&self, dt: f32) -> f32 {
        dt * self.time_scale
    }
}
