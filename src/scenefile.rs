//! JSON scene descriptions.
//!
//! A scene file is one nested [`NodeData`] tree. Spawning it only goes
//! through the public tree API ([`spawn_node`], [`add_child`], inserting a
//! [`CollisionShape`]), so it behaves like any external content loader.
//!
//! A node's `shape` becomes a child node named `"<name>/shape"` carrying the
//! [`CollisionShape`]; the node itself is then the shape's owner and is what
//! position correction moves.
//!
//! ```json
//! {
//!   "name": "level",
//!   "children": [
//!     { "name": "ball", "position": [40, 10],
//!       "shape": { "kind": "circle", "radius": 4, "mask": 3 } },
//!     { "name": "floor", "position": [0, 100],
//!       "shape": { "kind": "box", "width": 200, "height": 10,
//!                  "layer": 2, "static": true, "visible": true } }
//!   ]
//! }
//! ```

use bevy_ecs::prelude::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::components::collisionshape::{
    CollisionShape, DEFAULT_LAYER, DEFAULT_MASK, ShapeKind,
};
use crate::components::transform2d::Transform2D;
use crate::error::KernelResult;
use crate::resources::kernelconfig::KernelConfig;
use crate::systems::hierarchy::{add_child, spawn_node};

fn default_scale() -> [f32; 2] {
    [1.0, 1.0]
}

fn default_true() -> bool {
    true
}

fn default_layer() -> u32 {
    DEFAULT_LAYER
}

fn default_mask() -> u32 {
    DEFAULT_MASK
}

/// One node of a scene file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeData {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 2],
    /// Radians.
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_scale")]
    pub scale: [f32; 2],
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub shape: Option<ShapeData>,
    #[serde(default)]
    pub children: Vec<NodeData>,
}

impl NodeData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: [0.0, 0.0],
            rotation: 0.0,
            scale: default_scale(),
            enabled: true,
            shape: None,
            children: Vec::new(),
        }
    }

    /// Nodes in this subtree, shape nodes included.
    pub fn node_count(&self) -> usize {
        1 + usize::from(self.shape.is_some())
            + self.children.iter().map(NodeData::node_count).sum::<usize>()
    }

    fn transform(&self) -> Transform2D {
        Transform2D::from_xy(self.position[0], self.position[1])
            .with_rotation(self.rotation)
            .with_scale(self.scale[0], self.scale[1])
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeKindData {
    Circle { radius: f32 },
    Box { width: f32, height: f32 },
}

impl From<ShapeKindData> for ShapeKind {
    fn from(data: ShapeKindData) -> Self {
        match data {
            ShapeKindData::Circle { radius } => ShapeKind::Circle { radius },
            ShapeKindData::Box { width, height } => ShapeKind::Box {
                size: Vec2::new(width, height),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShapeData {
    #[serde(flatten)]
    pub kind: ShapeKindData,
    #[serde(default = "default_layer")]
    pub layer: u32,
    #[serde(default = "default_mask")]
    pub mask: u32,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub visible: bool,
    /// Falls back to the world's `KernelConfig` budget.
    #[serde(default)]
    pub max_collisions_per_frame: Option<u32>,
}

impl ShapeData {
    fn build(&self, default_budget: u32) -> CollisionShape {
        CollisionShape::new(self.kind.into())
            .with_layer(self.layer)
            .with_mask(self.mask)
            .with_static(self.is_static)
            .with_visible(self.visible)
            .with_max_collisions(self.max_collisions_per_frame.unwrap_or(default_budget))
    }
}

pub fn parse_scene_data(json: &str) -> KernelResult<NodeData> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_scene_data(path: impl AsRef<Path>) -> KernelResult<NodeData> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_scene_data(&content)
}

/// Spawns `data` as a detached, not-yet-started tree and returns its root.
pub fn spawn_scene_data(world: &mut World, data: &NodeData) -> KernelResult<Entity> {
    let default_budget = world
        .get_resource::<KernelConfig>()
        .map(|config| config.max_collisions_per_frame)
        .unwrap_or_else(|| KernelConfig::new().max_collisions_per_frame);
    spawn_data_node(world, data, default_budget)
}

fn spawn_data_node(world: &mut World, data: &NodeData, default_budget: u32) -> KernelResult<Entity> {
    let entity = spawn_node(world, data.name.clone(), data.transform());
    if !data.enabled {
        crate::systems::lifecycle::set_enabled(world, entity, false)?;
    }

    if let Some(shape) = &data.shape {
        let shape_node = spawn_node(world, format!("{}/shape", data.name), Transform2D::default());
        world.entity_mut(shape_node).insert(shape.build(default_budget));
        add_child(world, entity, shape_node)?;
    }

    for child in &data.children {
        let child_entity = spawn_data_node(world, child, default_budget)?;
        add_child(world, entity, child_entity)?;
    }
    Ok(entity)
}
