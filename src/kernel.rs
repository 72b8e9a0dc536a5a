//! Frame coordinator.
//!
//! A [`Kernel`] owns the ECS [`World`] holding the scene tree and a
//! [`Schedule`] with the per-frame systems chained in their fixed order:
//!
//! 1. [`update_scene`] – update traversal of the active root with the scaled delta
//! 2. [`process_collisions`] – one collision pass over the registry
//! 3. [`process_deferred`] – drain the deferred queue to empty
//!
//! Drawing is not part of the schedule; the surrounding loop calls
//! [`Kernel::draw`] after [`Kernel::update`] with whatever surface it renders to.
//!
//! # Example
//!
//! ```
//! use aberredcore::components::transform2d::Transform2D;
//! use aberredcore::kernel::Kernel;
//! use aberredcore::render::NullSurface;
//! use aberredcore::systems::hierarchy::spawn_node;
//!
//! let mut kernel = Kernel::new();
//! let root = spawn_node(kernel.world_mut(), "root", Transform2D::default());
//! kernel.set_scene(root).unwrap();
//! kernel.update(1.0 / 60.0);
//! kernel.draw(&mut NullSurface);
//! ```

use bevy_ecs::prelude::*;
use log::info;

use crate::error::KernelResult;
use crate::render::RenderSurface;
use crate::resources::activescene::ActiveScene;
use crate::resources::collisionregistry::CollisionRegistry;
use crate::resources::deferredqueue::DeferredQueue;
use crate::resources::kernelconfig::KernelConfig;
use crate::resources::worldtime::WorldTime;
use crate::systems::collision::process_collisions;
use crate::systems::deferred::process_deferred;
use crate::systems::scene::{scene_root, set_scene};
use crate::systems::time::update_world_time;
use crate::systems::traversal::{draw_scene, update_scene};

pub struct Kernel {
    world: World,
    schedule: Schedule,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    pub fn new() -> Self {
        Self::with_config(KernelConfig::new())
    }

    pub fn with_config(config: KernelConfig) -> Self {
        let mut world = World::new();
        install_kernel_resources(&mut world, config);
        info!("kernel ready");
        Self {
            world,
            schedule: frame_schedule(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Runs one frame: time, update, collisions, deferred drain.
    ///
    /// `dt` is unscaled; the active time scale is applied before the scene
    /// sees it.
    pub fn update(&mut self, dt: f32) {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
        self.world.clear_trackers();
    }

    /// Draws the active scene onto `surface`.
    pub fn draw(&mut self, surface: &mut dyn RenderSurface) {
        draw_scene(&mut self.world, surface);
    }

    /// Ends and despawns the current scene, clears the registry, starts `root`.
    pub fn set_scene(&mut self, root: Entity) -> KernelResult<()> {
        set_scene(&mut self.world, root)
    }

    pub fn scene_root(&self) -> Option<Entity> {
        scene_root(&self.world)
    }

    pub fn time_scale(&self) -> f32 {
        self.world.resource::<WorldTime>().time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.world.resource_mut::<WorldTime>().time_scale = time_scale;
    }

    pub fn time(&self) -> WorldTime {
        *self.world.resource::<WorldTime>()
    }

    pub fn config(&self) -> &KernelConfig {
        self.world.resource::<KernelConfig>()
    }
}

/// Inserts every resource the frame systems read.
pub fn install_kernel_resources(world: &mut World, config: KernelConfig) {
    world.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
    world.insert_resource(ActiveScene::default());
    world.insert_resource(CollisionRegistry::default());
    world.insert_resource(DeferredQueue::default());
    world.insert_resource(config);
}

/// The per-frame systems in their fixed order.
pub fn frame_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((update_scene, process_collisions, process_deferred).chain());
    schedule
}
