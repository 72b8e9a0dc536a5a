//! Scene swapping.

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::error::{KernelError, KernelResult};
use crate::resources::activescene::ActiveScene;
use crate::resources::collisionregistry::CollisionRegistry;
use crate::systems::hierarchy::{ensure_node, is_ancestor_or_self, node_name};
use crate::systems::lifecycle::{end_node, start_node};

/// Makes `new_root` the active scene.
///
/// The previous root, if any, is ended and despawned with its whole subtree
/// before the collision registry is cleared, so nothing of the old scene is
/// registered or alive while the new one starts. Installing the active root
/// again is a no-op; a node from inside the active scene is refused, since
/// ending that scene would end it too.
pub fn set_scene(world: &mut World, new_root: Entity) -> KernelResult<()> {
    ensure_node(world, new_root)?;

    let previous = world
        .get_resource::<ActiveScene>()
        .and_then(|scene| scene.root);
    if let Some(previous) = previous {
        if previous == new_root {
            debug!("scene: {new_root:?} is already active");
            return Ok(());
        }
        if is_ancestor_or_self(world, previous, new_root) {
            return Err(KernelError::InvalidHierarchy(format!(
                "{new_root:?} belongs to the scene being replaced"
            )));
        }
        end_node(world, previous);
        if let Ok(old) = world.get_entity_mut(previous) {
            old.despawn();
        }
    }
    world
        .get_resource_or_insert_with(CollisionRegistry::default)
        .reset();
    world
        .get_resource_or_insert_with(ActiveScene::default)
        .root = Some(new_root);

    info!(
        "scene: {:?} -> {new_root:?} ({})",
        previous,
        node_name(world, new_root).unwrap_or("<unnamed>")
    );
    start_node(world, new_root);
    Ok(())
}

/// Root of the active scene, if one is installed.
pub fn scene_root(world: &World) -> Option<Entity> {
    world.get_resource::<ActiveScene>().and_then(|scene| scene.root)
}
