//! Aberred Core headless runner.
//!
//! Builds a scene, either from a JSON scene file or generated with randomly
//! scattered bodies inside four static walls, and runs it for a fixed number
//! of frames at `1 / target_fps` seconds each. Bodies drift at a constant
//! velocity and bounce off whatever they touch.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --frames 300 --bodies 40
//! cargo run --release -- --scene demos/scene.json
//! ```

use aberredcore::components::behavior::{Behavior, NodeContext, NodeLogic};
use aberredcore::components::collisionshape::CollisionShape;
use aberredcore::components::node::Node;
use aberredcore::components::transform2d::Transform2D;
use aberredcore::error::KernelResult;
use aberredcore::events::collision::CollisionNotice;
use aberredcore::kernel::Kernel;
use aberredcore::render::{RecordingSurface, RenderSurface};
use aberredcore::resources::kernelconfig::KernelConfig;
use aberredcore::scenefile::{load_scene_data, spawn_scene_data};
use aberredcore::systems::hierarchy::{
    add_child, children_of, global_position, node_name, parent_of, spawn_node,
};
use bevy_ecs::prelude::*;
use clap::Parser;
use crossbeam_channel::Receiver;
use glam::Vec2;
use std::path::PathBuf;

const ARENA_SIZE: f32 = 400.0;
const WALL_THICKNESS: f32 = 20.0;
const BODY_LAYER: u32 = 0b01;
const WALL_LAYER: u32 = 0b10;

/// Aberred Core 2D scene kernel
#[derive(Parser)]
#[command(version, about = "Headless runner for the Aberred Core scene kernel")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// JSON scene file. A random arena is generated when omitted.
    #[arg(long, value_name = "PATH")]
    scene: Option<PathBuf>,

    /// Number of frames to simulate (overrides the config file).
    #[arg(long)]
    frames: Option<u32>,

    /// Time scale applied to every frame (overrides the config file).
    #[arg(long)]
    time_scale: Option<f32>,

    /// Number of bodies in a generated arena.
    #[arg(long, default_value_t = 24)]
    bodies: usize,

    /// Seed for the generated arena and initial velocities.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the effective configuration back to the config file and exit.
    #[arg(long)]
    save_config: bool,
}

/// Constant velocity, flipped by collision listeners.
#[derive(Component, Debug, Clone, Copy)]
struct Velocity(Vec2);

/// Moves its node by [`Velocity`] every frame and labels it when drawn.
struct Drifter;

impl Behavior for Drifter {
    fn update(&mut self, ctx: &mut NodeContext<'_>, dt: f32) {
        let entity = ctx.entity();
        let Some(velocity) = ctx.world().get::<Velocity>(entity).map(|v| v.0) else {
            return;
        };
        if let Some(mut transform) = ctx.transform_mut() {
            transform.position += velocity * dt;
        }
    }

    fn draw(&mut self, ctx: &mut NodeContext<'_>, surface: &mut dyn RenderSurface) {
        let name = ctx.node().map(|n| n.name.clone()).unwrap_or_default();
        surface.draw_label(ctx.global_position(), &name);
    }
}

/// Reflects the owner's velocity when it is moving toward the other shape.
fn bounce(world: &mut World, notice: &CollisionNotice) {
    let Some(owner) = parent_of(world, notice.shape) else {
        return;
    };
    let toward = global_position(world, notice.other) - global_position(world, notice.shape);
    let Some(direction) = toward.try_normalize() else {
        return;
    };
    if let Some(mut velocity) = world.get_mut::<Velocity>(owner) {
        let approach = velocity.0.dot(direction);
        if approach > 0.0 {
            velocity.0 -= 2.0 * approach * direction;
        }
    }
}

fn random_velocity(speed: f32) -> Vec2 {
    let angle = fastrand::f32() * std::f32::consts::TAU;
    Vec2::from_angle(angle) * speed
}

fn spawn_wall(world: &mut World, root: Entity, name: &str, at: Vec2, size: Vec2) -> KernelResult<()> {
    let wall = spawn_node(world, name, Transform2D::from_xy(at.x, at.y));
    let shape = spawn_node(world, format!("{name}/shape"), Transform2D::default());
    world.entity_mut(shape).insert(
        CollisionShape::rect(size.x, size.y)
            .with_layer(WALL_LAYER)
            .with_mask(BODY_LAYER)
            .with_static(true)
            .with_visible(true),
    );
    add_child(world, wall, shape)?;
    add_child(world, root, wall)
}

fn generate_arena(world: &mut World, bodies: usize, max_collisions: u32) -> KernelResult<Entity> {
    let root = spawn_node(world, "arena", Transform2D::default());
    let half = ARENA_SIZE * 0.5;
    let span = ARENA_SIZE + WALL_THICKNESS;
    spawn_wall(world, root, "wall_top", Vec2::new(0.0, -half), Vec2::new(span, WALL_THICKNESS))?;
    spawn_wall(world, root, "wall_bottom", Vec2::new(0.0, half), Vec2::new(span, WALL_THICKNESS))?;
    spawn_wall(world, root, "wall_left", Vec2::new(-half, 0.0), Vec2::new(WALL_THICKNESS, span))?;
    spawn_wall(world, root, "wall_right", Vec2::new(half, 0.0), Vec2::new(WALL_THICKNESS, span))?;

    let inner = half - WALL_THICKNESS * 2.0;
    for i in 0..bodies {
        let x = (fastrand::f32() * 2.0 - 1.0) * inner;
        let y = (fastrand::f32() * 2.0 - 1.0) * inner;
        let body = spawn_node(world, format!("body_{i}"), Transform2D::from_xy(x, y));
        let radius = 4.0 + fastrand::f32() * 6.0;
        let shape = spawn_node(world, format!("body_{i}/shape"), Transform2D::default());
        world.entity_mut(shape).insert(
            CollisionShape::circle(radius)
                .with_layer(BODY_LAYER)
                .with_mask(BODY_LAYER | WALL_LAYER)
                .with_max_collisions(max_collisions)
                .with_visible(true),
        );
        add_child(world, body, shape)?;
        add_child(world, root, body)?;
    }
    Ok(root)
}

/// Gives every non-static shape's owner a random velocity and the drift
/// logic, and subscribes the bounce listener. Returns one channel per shape
/// for counting notifications.
fn make_bodies_drift(world: &mut World) -> Vec<Receiver<CollisionNotice>> {
    let mut query = world.query::<(Entity, &CollisionShape)>();
    let moving: Vec<Entity> = query
        .iter(world)
        .filter(|(_, shape)| !shape.is_static)
        .map(|(entity, _)| entity)
        .collect();

    let mut receivers = Vec::with_capacity(moving.len());
    for shape_entity in moving {
        let Some(owner) = parent_of(world, shape_entity) else {
            log::warn!("shape {shape_entity:?} has no owner, it will not drift");
            continue;
        };
        world
            .entity_mut(owner)
            .insert((Velocity(random_velocity(60.0)), NodeLogic::new(Drifter)));
        if let Some(mut shape) = world.get_mut::<CollisionShape>(shape_entity) {
            shape.subscribe(bounce);
            receivers.push(shape.subscribe_channel());
        }
    }
    receivers
}

fn log_tree(world: &World, entity: Entity, depth: usize) {
    let name = node_name(world, entity).unwrap_or("<?>");
    let position = global_position(world, entity);
    let enabled = world.get::<Node>(entity).is_some_and(|n| n.enabled);
    log::info!(
        "{:indent$}{name} at ({:.1}, {:.1}){}",
        "",
        position.x,
        position.y,
        if enabled { "" } else { " [disabled]" },
        indent = depth * 2
    );
    for child in children_of(world, entity) {
        log_tree(world, child, depth + 1);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = KernelConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::info!("using default configuration ({e})");
    }
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }
    if let Some(time_scale) = cli.time_scale {
        config.time_scale = time_scale;
    }

    if cli.save_config {
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    if let Some(seed) = cli.seed {
        fastrand::seed(seed);
    }

    let frames = config.frames;
    let dt = config.fixed_delta();
    let max_collisions = config.max_collisions_per_frame;
    let mut kernel = Kernel::with_config(config);

    let root = match &cli.scene {
        Some(path) => load_scene_data(path).and_then(|data| spawn_scene_data(kernel.world_mut(), &data)),
        None => generate_arena(kernel.world_mut(), cli.bodies, max_collisions),
    };
    let root = match root {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error building scene: {e}");
            std::process::exit(1);
        }
    };
    let receivers = make_bodies_drift(kernel.world_mut());

    if let Err(e) = kernel.set_scene(root) {
        eprintln!("Error starting scene: {e}");
        std::process::exit(1);
    }

    let mut surface = RecordingSurface::new();
    let mut total_notices = 0usize;
    for frame in 0..frames {
        kernel.update(dt);
        surface.clear();
        kernel.draw(&mut surface);

        let notices: usize = receivers.iter().map(|rx| rx.try_iter().count()).sum();
        total_notices += notices;
        log::debug!(
            "frame {frame}: {notices} collision notice(s), {} draw command(s)",
            surface.commands.len()
        );
    }

    let time = kernel.time();
    log::info!(
        "ran {} frame(s), {:.2}s simulated, {total_notices} collision notice(s)",
        time.frame_count,
        time.elapsed
    );
    if let Some(root) = kernel.scene_root() {
        log_tree(kernel.world(), root, 0);
    }
}
