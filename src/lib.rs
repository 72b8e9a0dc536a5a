//! Aberred Core library.
//!
//! A 2D scene-graph kernel on top of `bevy_ecs`: a tree of nodes with
//! lifecycle hooks, transform composition, a per-frame collision pass with
//! position correction, and a deferred queue for structural changes.
//!
//! - [`components`] – node data, transforms, behaviors, collision shapes
//! - [`error`] – the crate's error type
//! - [`events`] – collision info and notices
//! - [`kernel`] – frame coordinator owning the world and the frame schedule
//! - [`render`] – render surface trait and headless implementations
//! - [`resources`] – registry, deferred queue, time, active scene, config
//! - [`scenefile`] – JSON scene descriptions
//! - [`systems`] – tree operations and per-frame systems

pub mod components;
pub mod error;
pub mod events;
pub mod kernel;
pub mod render;
pub mod resources;
pub mod scenefile;
pub mod systems;
