//! ECS resources made available to systems.
//!
//! Kernel-wide state lives in the world as resources rather than globals, so
//! every world (and every test) gets its own isolated copy.
//!
//! Overview
//! - `activescene` – root entity of the scene being run
//! - `collisionregistry` – ordered set of shapes taking part in collision passes
//! - `deferredqueue` – FIFO of structural changes applied at the end of the frame
//! - `kernelconfig` – INI-backed kernel settings
//! - `worldtime` – simulation time and delta
pub mod activescene;
pub mod collisionregistry;
pub mod deferredqueue;
pub mod kernelconfig;
pub mod worldtime;
