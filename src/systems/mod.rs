//! Kernel systems and tree operations.
//!
//! Frame systems are exclusive (`fn(&mut World)`) and run chained in the
//! order update, collision, deferred drain. The tree operations are plain
//! functions over the world so behaviors and deferred actions can call them.
//!
//! Submodules overview
//! - [`collision`] – per-frame pair pass: detection, position correction, notification
//! - [`deferred`] – drain the deferred queue to empty
//! - [`hierarchy`] – parenting, child lookup and global transforms
//! - [`lifecycle`] – start/end cascades, `queue_free`, `call_deferred`
//! - [`narrowphase`] – circle/box overlap tests
//! - [`scene`] – swap the active scene root
//! - [`time`] – advance simulation time with time scale
//! - [`traversal`] – update and draw walks over the tree

pub mod collision;
pub mod deferred;
pub mod hierarchy;
pub mod lifecycle;
pub mod narrowphase;
pub mod scene;
pub mod time;
pub mod traversal;
