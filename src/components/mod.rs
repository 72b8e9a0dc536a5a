//! ECS components for scene-tree nodes.
//!
//! Every node entity carries a [`node::Node`] and a
//! [`transform2d::Transform2D`]. The remaining components are optional and
//! give a node its behavior or its physical presence.
//!
//! Submodules overview:
//! - [`behavior`] – the `Behavior` hook trait, node logic, attached scripts and `NodeContext`
//! - [`collisionshape`] – circle or box collision shape with layer/mask and listeners
//! - [`node`] – name, enabled flag, pending-removal flag and lifecycle state
//! - [`transform2d`] – local position, rotation and scale

pub mod behavior;
pub mod collisionshape;
pub mod node;
pub mod transform2d;
