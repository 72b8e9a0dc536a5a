//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per frame, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Advance `WorldTime` by one frame.
///
/// `dt` is the unscaled frame delta in seconds. The scaled delta is written
/// to `delta` and added to `elapsed`; the frame counter goes up by one.
/// Returns the scaled delta.
pub fn update_world_time(world: &mut World, dt: f32) -> f32 {
    let mut wt = world.get_resource_or_insert_with(WorldTime::default);
    let scaled_dt = wt.scaled(dt);
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.frame_count += 1;
    scaled_dt
}
