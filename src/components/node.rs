//! Scene-graph node component.
//!
//! Every entity that takes part in the scene tree carries a [`Node`]. The
//! parent link and the ordered child list are bevy's own
//! [`ChildOf`](bevy_ecs::hierarchy::ChildOf) /
//! [`Children`](bevy_ecs::hierarchy::Children) relationship; this component
//! holds the rest of the per-node state.

use bevy_ecs::prelude::Component;

/// Lifecycle of a node. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Constructed,
    Started,
    Ended,
}

#[derive(Component, Debug, Clone)]
pub struct Node {
    /// Human-readable name, used by name lookups and logs.
    pub name: String,
    /// Disabled nodes skip update and draw for their whole subtree.
    pub enabled: bool,
    pub(crate) pending_removal: bool,
    pub(crate) lifecycle: Lifecycle,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            pending_removal: false,
            lifecycle: Lifecycle::Constructed,
        }
    }

    /// Set by `queue_free`; the node is detached and ended at the next drain.
    pub fn is_pending_removal(&self) -> bool {
        self.pending_removal
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_started(&self) -> bool {
        self.lifecycle == Lifecycle::Started
    }

    pub fn is_ended(&self) -> bool {
        self.lifecycle == Lifecycle::Ended
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("node")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_enabled_and_constructed() {
        let node = Node::new("player");
        assert_eq!(node.name, "player");
        assert!(node.enabled);
        assert!(!node.is_pending_removal());
        assert_eq!(node.lifecycle(), Lifecycle::Constructed);
        assert!(!node.is_started());
        assert!(!node.is_ended());
    }
}
