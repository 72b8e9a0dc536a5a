//! Error type shared by the kernel's fallible operations.
//!
//! Invariant violations (self-parenting, cycles, a collision owner without a
//! parent) are programming errors: they trip a `debug_assert!` in debug
//! builds and surface as [`KernelError::InvalidHierarchy`] in release builds.
//! Everything else is an ordinary recoverable error.

use bevy_ecs::prelude::Entity;
use thiserror::Error;

/// Errors reported by the scene kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    /// A typed or named child lookup found no match.
    #[error("no child of {parent:?} matches {query}")]
    NotFound { parent: Entity, query: String },

    /// The entity is not alive, or is not a scene node.
    #[error("entity {0:?} is not a live scene node")]
    MissingEntity(Entity),

    /// A hierarchy change would break the tree invariants.
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// A deferred action slot was empty at enqueue time.
    #[error("deferred action is missing")]
    NullDeferredAction,

    /// A scene description could not be parsed.
    #[error("scene file: {0}")]
    SceneFile(#[from] serde_json::Error),

    /// A configuration file could not be read or written.
    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate.
pub type KernelResult<T> = Result<T, KernelError>;
