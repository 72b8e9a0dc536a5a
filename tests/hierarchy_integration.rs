//! Integration tests for the node tree: parenting, lookups, and global transforms.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test hierarchy_integration
//! ```

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;
use glam::Vec2;

use aberredcore::components::collisionshape::CollisionShape;
use aberredcore::components::node::{Lifecycle, Node};
use aberredcore::components::transform2d::Transform2D;
use aberredcore::error::KernelError;
use aberredcore::resources::collisionregistry::CollisionRegistry;
use aberredcore::systems::hierarchy::{
    add_child, children_of, children_with, find_child, find_child_by_name, global_matrix,
    global_position, parent_of, remove_child, set_global_position, spawn_node, translate_global,
};
use aberredcore::systems::lifecycle::start_node;

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec(a: Vec2, b: Vec2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn node(world: &mut World, name: &str) -> Entity {
    spawn_node(world, name, Transform2D::default())
}

fn occurrences(world: &World, parent: Entity, child: Entity) -> usize {
    children_of(world, parent)
        .into_iter()
        .filter(|c| *c == child)
        .count()
}

#[derive(Component)]
struct Marker;

// =============================================================================
// Parenting
// =============================================================================

#[test]
fn add_child_links_both_directions() {
    let mut world = World::new();
    let parent = node(&mut world, "parent");
    let child = node(&mut world, "child");

    add_child(&mut world, parent, child).unwrap();

    assert_eq!(parent_of(&world, child), Some(parent));
    assert_eq!(occurrences(&world, parent, child), 1);
    assert_eq!(world.get::<ChildOf>(child).map(|c| c.parent()), Some(parent));
    assert!(world.get::<Children>(parent).is_some());
}

#[test]
fn add_child_twice_keeps_single_entry() {
    let mut world = World::new();
    let parent = node(&mut world, "parent");
    let child = node(&mut world, "child");

    add_child(&mut world, parent, child).unwrap();
    add_child(&mut world, parent, child).unwrap();

    assert_eq!(occurrences(&world, parent, child), 1);
}

#[test]
fn children_keep_insertion_order() {
    let mut world = World::new();
    let parent = node(&mut world, "parent");
    let a = node(&mut world, "a");
    let b = node(&mut world, "b");
    let c = node(&mut world, "c");
    for child in [a, b, c] {
        add_child(&mut world, parent, child).unwrap();
    }
    assert_eq!(children_of(&world, parent), vec![a, b, c]);
}

#[test]
fn reparent_detaches_from_previous_parent() {
    let mut world = World::new();
    let p1 = node(&mut world, "p1");
    let p2 = node(&mut world, "p2");
    let child = node(&mut world, "child");

    add_child(&mut world, p1, child).unwrap();
    add_child(&mut world, p2, child).unwrap();

    assert_eq!(parent_of(&world, child), Some(p2));
    assert_eq!(occurrences(&world, p1, child), 0);
    assert_eq!(occurrences(&world, p2, child), 1);
}

#[test]
fn remove_child_of_other_parent_is_noop() {
    let mut world = World::new();
    let p1 = node(&mut world, "p1");
    let p2 = node(&mut world, "p2");
    let a = node(&mut world, "a");
    let stranger = node(&mut world, "stranger");
    add_child(&mut world, p1, a).unwrap();
    add_child(&mut world, p2, stranger).unwrap();

    assert!(!remove_child(&mut world, p1, stranger));

    assert_eq!(children_of(&world, p1), vec![a]);
    assert_eq!(parent_of(&world, stranger), Some(p2));
}

#[test]
fn remove_child_clears_back_reference() {
    let mut world = World::new();
    let parent = node(&mut world, "parent");
    let child = node(&mut world, "child");
    add_child(&mut world, parent, child).unwrap();

    assert!(remove_child(&mut world, parent, child));

    assert_eq!(parent_of(&world, child), None);
    assert!(children_of(&world, parent).is_empty());
    assert!(world.get_entity(child).is_ok(), "detaching must not despawn");
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "own parent")]
fn self_parenting_panics_in_debug() {
    let mut world = World::new();
    let a = node(&mut world, "a");
    let _ = add_child(&mut world, a, a);
}

#[cfg(not(debug_assertions))]
#[test]
fn self_parenting_is_rejected_in_release() {
    let mut world = World::new();
    let a = node(&mut world, "a");
    assert!(matches!(
        add_child(&mut world, a, a),
        Err(KernelError::InvalidHierarchy(_))
    ));
    assert_eq!(parent_of(&world, a), None);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "cycle")]
fn parenting_under_descendant_panics_in_debug() {
    let mut world = World::new();
    let a = node(&mut world, "a");
    let b = node(&mut world, "b");
    add_child(&mut world, a, b).unwrap();
    let _ = add_child(&mut world, b, a);
}

#[test]
fn add_child_rejects_non_nodes() {
    let mut world = World::new();
    let parent = node(&mut world, "parent");
    let plain = world.spawn_empty().id();
    assert!(matches!(
        add_child(&mut world, parent, plain),
        Err(KernelError::MissingEntity(e)) if e == plain
    ));
}

#[test]
fn attaching_under_started_parent_starts_subtree() {
    let mut world = World::new();
    let root = node(&mut world, "root");
    start_node(&mut world, root);

    let body = node(&mut world, "body");
    let shape = node(&mut world, "body/shape");
    world.entity_mut(shape).insert(CollisionShape::circle(2.0));
    add_child(&mut world, body, shape).unwrap();
    assert_eq!(
        world.get::<Node>(body).unwrap().lifecycle(),
        Lifecycle::Constructed
    );

    add_child(&mut world, root, body).unwrap();

    assert!(world.get::<Node>(body).unwrap().is_started());
    assert!(world.get::<Node>(shape).unwrap().is_started());
    assert!(world.resource::<CollisionRegistry>().contains(shape));
}

// =============================================================================
// Lookups
// =============================================================================

#[test]
fn find_child_by_type_and_name() {
    let mut world = World::new();
    let parent = node(&mut world, "parent");
    let plain = node(&mut world, "plain");
    let first = node(&mut world, "first");
    let second = node(&mut world, "second");
    world.entity_mut(first).insert(Marker);
    world.entity_mut(second).insert(Marker);
    for child in [plain, first, second] {
        add_child(&mut world, parent, child).unwrap();
    }

    assert_eq!(find_child::<Marker>(&world, parent, None).unwrap(), first);
    assert_eq!(
        find_child::<Marker>(&world, parent, Some("second")).unwrap(),
        second
    );
    assert_eq!(find_child_by_name(&world, parent, "plain").unwrap(), plain);
}

#[test]
fn find_child_without_match_is_not_found() {
    let mut world = World::new();
    let parent = node(&mut world, "parent");
    let child = node(&mut world, "child");
    add_child(&mut world, parent, child).unwrap();

    let err = find_child::<Marker>(&world, parent, None).unwrap_err();
    assert!(matches!(err, KernelError::NotFound { parent: p, .. } if p == parent));

    let err = find_child_by_name(&world, parent, "missing").unwrap_err();
    assert!(err.to_string().contains("missing"));
}

#[test]
fn children_with_is_lazy_and_restartable() {
    let mut world = World::new();
    let parent = node(&mut world, "parent");
    let a = node(&mut world, "a");
    let b = node(&mut world, "b");
    let c = node(&mut world, "c");
    world.entity_mut(a).insert(Marker);
    world.entity_mut(c).insert(Marker);
    for child in [a, b, c] {
        add_child(&mut world, parent, child).unwrap();
    }

    let marked = children_with::<Marker>(&world, parent);
    let restart = marked.clone();
    assert_eq!(marked.collect::<Vec<_>>(), vec![a, c]);
    assert_eq!(restart.collect::<Vec<_>>(), vec![a, c]);

    let mut partial = children_with::<Marker>(&world, parent);
    assert_eq!(partial.next(), Some(a));
    assert_eq!(children_with::<Marker>(&world, parent).next(), Some(a));
}

// =============================================================================
// Transforms
// =============================================================================

#[test]
fn root_global_matches_local() {
    let mut world = World::new();
    let root = spawn_node(&mut world, "root", Transform2D::from_xy(3.0, -2.0));
    assert!(approx_vec(global_position(&world, root), Vec2::new(3.0, -2.0)));
}

#[test]
fn child_global_composes_parent_rotation_and_scale() {
    let mut world = World::new();
    let parent = spawn_node(
        &mut world,
        "parent",
        Transform2D::from_xy(10.0, 0.0)
            .with_rotation(std::f32::consts::FRAC_PI_2)
            .with_scale(2.0, 2.0),
    );
    let child = spawn_node(&mut world, "child", Transform2D::from_xy(1.0, 0.0));
    add_child(&mut world, parent, child).unwrap();

    assert!(approx_vec(global_position(&world, child), Vec2::new(10.0, 2.0)));
    let scale = global_matrix(&world, child).matrix2.x_axis.length();
    assert!(approx_eq(scale, 2.0));
}

#[test]
fn global_position_follows_parent_moves_immediately() {
    let mut world = World::new();
    let parent = spawn_node(&mut world, "parent", Transform2D::from_xy(5.0, 5.0));
    let child = spawn_node(&mut world, "child", Transform2D::from_xy(1.0, 1.0));
    add_child(&mut world, parent, child).unwrap();

    world.get_mut::<Transform2D>(parent).unwrap().position = Vec2::new(-5.0, 0.0);

    assert!(approx_vec(global_position(&world, child), Vec2::new(-4.0, 1.0)));
}

#[test]
fn set_global_position_goes_through_parent_inverse() {
    let mut world = World::new();
    let parent = spawn_node(
        &mut world,
        "parent",
        Transform2D::from_xy(10.0, 0.0)
            .with_rotation(std::f32::consts::FRAC_PI_2)
            .with_scale(2.0, 2.0),
    );
    let child = node(&mut world, "child");
    add_child(&mut world, parent, child).unwrap();

    set_global_position(&mut world, child, Vec2::new(10.0, 2.0)).unwrap();

    let local = world.get::<Transform2D>(child).unwrap().position;
    assert!(approx_vec(local, Vec2::new(1.0, 0.0)));
    assert!(approx_vec(global_position(&world, child), Vec2::new(10.0, 2.0)));
}

#[test]
fn set_global_position_without_parent_sets_local() {
    let mut world = World::new();
    let solo = node(&mut world, "solo");
    set_global_position(&mut world, solo, Vec2::new(7.0, 8.0)).unwrap();
    assert_eq!(
        world.get::<Transform2D>(solo).unwrap().position,
        Vec2::new(7.0, 8.0)
    );
}

#[test]
fn translate_global_moves_in_world_space() {
    let mut world = World::new();
    let parent = spawn_node(
        &mut world,
        "parent",
        Transform2D::default().with_scale(4.0, 4.0),
    );
    let child = spawn_node(&mut world, "child", Transform2D::from_xy(1.0, 0.0));
    add_child(&mut world, parent, child).unwrap();

    translate_global(&mut world, child, Vec2::new(4.0, 0.0)).unwrap();

    assert!(approx_vec(global_position(&world, child), Vec2::new(8.0, 0.0)));
    let local = world.get::<Transform2D>(child).unwrap().position;
    assert!(approx_vec(local, Vec2::new(2.0, 0.0)));
}

#[test]
fn set_global_position_on_missing_entity_errors() {
    let mut world = World::new();
    let gone = node(&mut world, "gone");
    let _ = world.despawn(gone);
    assert!(matches!(
        set_global_position(&mut world, gone, Vec2::ZERO),
        Err(KernelError::MissingEntity(_))
    ));
}
