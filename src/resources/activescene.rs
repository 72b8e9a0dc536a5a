//! The single active scene root.
//!
//! Swapped only through [`set_scene`](crate::systems::scene::set_scene).

use bevy_ecs::prelude::*;

#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct ActiveScene {
    pub root: Option<Entity>,
}
