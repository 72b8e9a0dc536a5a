//! Narrow-phase geometry for the supported shape pairs.
//!
//! Shapes are first resolved to a [`WorldShape`] (world-space circle or
//! axis-aligned box) and then dispatched through a small pairwise table
//! indexed by shape kind. Supported pairings are circle/circle, circle/box
//! and box/box; box/circle reuses the circle/box test with the arguments
//! swapped and the normal negated.
//!
//! Normal orientation per test:
//! - circle/circle: from the first center toward the second
//! - circle/box: from the closest box point toward the circle center
//! - box/box: along the smaller-overlap axis, signed by `center_a - center_b`

use glam::Vec2;

use crate::events::collision::CollisionInfo;

/// Below this center distance the circle/circle normal falls back to +X,
/// and a circle center counts as lying inside a box.
pub const DISTANCE_EPSILON: f32 = 1e-6;

/// A collision shape resolved to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldShape {
    Circle { center: Vec2, radius: f32 },
    Aabb { min: Vec2, max: Vec2 },
}

impl WorldShape {
    /// Box centered on `center` with the given half-extent.
    pub fn aabb_from_center(center: Vec2, half_extent: Vec2) -> Self {
        let half = half_extent.abs();
        WorldShape::Aabb {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        match *self {
            WorldShape::Circle { center, .. } => center,
            WorldShape::Aabb { min, max } => (min + max) * 0.5,
        }
    }

    fn kind_index(&self) -> usize {
        match self {
            WorldShape::Circle { .. } => 0,
            WorldShape::Aabb { .. } => 1,
        }
    }
}

type PairTest = fn(&WorldShape, &WorldShape) -> CollisionInfo;

/// Indexed by `[kind(a)][kind(b)]`.
const PAIR_TABLE: [[PairTest; 2]; 2] = [
    [circle_vs_circle, circle_vs_aabb],
    [aabb_vs_circle, aabb_vs_aabb],
];

/// Tests `a` against `b`, returning [`CollisionInfo::NONE`] when apart.
pub fn check_collision(a: &WorldShape, b: &WorldShape) -> CollisionInfo {
    PAIR_TABLE[a.kind_index()][b.kind_index()](a, b)
}

fn circle_vs_circle(a: &WorldShape, b: &WorldShape) -> CollisionInfo {
    match (*a, *b) {
        (
            WorldShape::Circle {
                center: ca,
                radius: ra,
            },
            WorldShape::Circle {
                center: cb,
                radius: rb,
            },
        ) => circle_circle(ca, ra, cb, rb),
        _ => CollisionInfo::NONE,
    }
}

fn circle_vs_aabb(a: &WorldShape, b: &WorldShape) -> CollisionInfo {
    match (*a, *b) {
        (WorldShape::Circle { center, radius }, WorldShape::Aabb { min, max }) => {
            circle_aabb(center, radius, min, max)
        }
        _ => CollisionInfo::NONE,
    }
}

fn aabb_vs_circle(a: &WorldShape, b: &WorldShape) -> CollisionInfo {
    let info = circle_vs_aabb(b, a);
    if info.has_collision {
        info.flipped()
    } else {
        info
    }
}

fn aabb_vs_aabb(a: &WorldShape, b: &WorldShape) -> CollisionInfo {
    match (*a, *b) {
        (
            WorldShape::Aabb {
                min: min_a,
                max: max_a,
            },
            WorldShape::Aabb {
                min: min_b,
                max: max_b,
            },
        ) => aabb_aabb(min_a, max_a, min_b, max_b),
        _ => CollisionInfo::NONE,
    }
}

/// Circle against circle.
pub fn circle_circle(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> CollisionInfo {
    let offset = center_b - center_a;
    let distance = offset.length();
    let radii = radius_a + radius_b;
    if distance >= radii {
        return CollisionInfo::NONE;
    }
    let normal = if distance < DISTANCE_EPSILON {
        Vec2::X
    } else {
        offset / distance
    };
    CollisionInfo::hit(normal, radii - distance)
}

/// Circle against an axis-aligned box.
///
/// A center lying inside the box picks the axis on which the center sits
/// farthest from the box center relative to the half-extent, and reports the
/// full radius as penetration.
pub fn circle_aabb(center: Vec2, radius: f32, min: Vec2, max: Vec2) -> CollisionInfo {
    let closest = center.clamp(min, max);
    let delta = center - closest;
    let distance_sq = delta.length_squared();
    if distance_sq > radius * radius {
        return CollisionInfo::NONE;
    }

    if distance_sq < DISTANCE_EPSILON * DISTANCE_EPSILON {
        let box_center = (min + max) * 0.5;
        let half = ((max - min) * 0.5).max(Vec2::splat(DISTANCE_EPSILON));
        let offset = center - box_center;
        let ratio = offset.abs() / half;
        let normal = if ratio.x >= ratio.y {
            Vec2::new(sign_or_positive(offset.x), 0.0)
        } else {
            Vec2::new(0.0, sign_or_positive(offset.y))
        };
        return CollisionInfo::hit(normal, radius);
    }

    let distance = distance_sq.sqrt();
    CollisionInfo::hit(delta / distance, radius - distance)
}

/// Axis-aligned box against axis-aligned box.
///
/// Separates along the axis with the smaller overlap; the sign comes from
/// the relative position of the two centers on that axis.
pub fn aabb_aabb(min_a: Vec2, max_a: Vec2, min_b: Vec2, max_b: Vec2) -> CollisionInfo {
    let overlap_x = max_a.x.min(max_b.x) - min_a.x.max(min_b.x);
    let overlap_y = max_a.y.min(max_b.y) - min_a.y.max(min_b.y);
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return CollisionInfo::NONE;
    }

    let center_a = (min_a + max_a) * 0.5;
    let center_b = (min_b + max_b) * 0.5;
    if overlap_x <= overlap_y {
        let sign = if center_a.x < center_b.x { -1.0 } else { 1.0 };
        CollisionInfo::hit(Vec2::new(sign, 0.0), overlap_x)
    } else {
        let sign = if center_a.y < center_b.y { -1.0 } else { 1.0 };
        CollisionInfo::hit(Vec2::new(0.0, sign), overlap_y)
    }
}

fn sign_or_positive(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    fn circle(x: f32, y: f32, radius: f32) -> WorldShape {
        WorldShape::Circle {
            center: Vec2::new(x, y),
            radius,
        }
    }

    fn aabb(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> WorldShape {
        WorldShape::Aabb {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    // ==================== CIRCLE VS CIRCLE ====================

    #[test]
    fn overlapping_circles_report_penetration_and_normal() {
        let info = check_collision(&circle(0.0, 0.0, 5.0), &circle(8.0, 0.0, 5.0));
        assert!(info.has_collision);
        assert!(approx_eq(info.penetration, 2.0));
        assert!(vec_approx_eq(info.normal, Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn distant_circles_do_not_collide() {
        let info = check_collision(&circle(0.0, 0.0, 5.0), &circle(20.0, 0.0, 5.0));
        assert!(!info.has_collision);
        assert_eq!(info, CollisionInfo::NONE);
    }

    #[test]
    fn touching_circles_do_not_collide() {
        let info = check_collision(&circle(0.0, 0.0, 5.0), &circle(10.0, 0.0, 5.0));
        assert!(!info.has_collision);
    }

    #[test]
    fn concentric_circles_fall_back_to_x_axis() {
        let info = check_collision(&circle(3.0, 3.0, 2.0), &circle(3.0, 3.0, 1.0));
        assert!(info.has_collision);
        assert!(vec_approx_eq(info.normal, Vec2::X));
        assert!(approx_eq(info.penetration, 3.0));
    }

    // ==================== CIRCLE VS BOX ====================

    #[test]
    fn circle_outside_box_edge_pushes_away_from_closest_point() {
        // Box spans x in [0, 10]; circle center 3 units right of the edge.
        let info = check_collision(&circle(13.0, 5.0, 4.0), &aabb(0.0, 0.0, 10.0, 10.0));
        assert!(info.has_collision);
        assert!(vec_approx_eq(info.normal, Vec2::new(1.0, 0.0)));
        assert!(approx_eq(info.penetration, 1.0));
    }

    #[test]
    fn circle_clear_of_box_does_not_collide() {
        let info = check_collision(&circle(20.0, 5.0, 4.0), &aabb(0.0, 0.0, 10.0, 10.0));
        assert!(!info.has_collision);
    }

    #[test]
    fn circle_near_corner_but_outside_radius_does_not_collide() {
        // Closest point is the corner (10, 10); distance is sqrt(18) > 4.
        let info = check_collision(&circle(13.0, 13.0, 4.0), &aabb(0.0, 0.0, 10.0, 10.0));
        assert!(!info.has_collision);
    }

    #[test]
    fn circle_center_inside_box_picks_axis_by_relative_offset() {
        // Wide box: half-extent (10, 2). Offset (4, 1) gives ratios 0.4 and 0.5,
        // so Y wins even though the raw X offset is larger.
        let info = check_collision(&circle(4.0, 1.0, 3.0), &aabb(-10.0, -2.0, 10.0, 2.0));
        assert!(info.has_collision);
        assert!(vec_approx_eq(info.normal, Vec2::new(0.0, 1.0)));
        assert!(approx_eq(info.penetration, 3.0));
    }

    #[test]
    fn circle_center_inside_box_uses_offset_sign() {
        let info = check_collision(&circle(-6.0, 0.5, 2.0), &aabb(-10.0, -10.0, 10.0, 10.0));
        assert!(info.has_collision);
        assert!(vec_approx_eq(info.normal, Vec2::new(-1.0, 0.0)));
        assert!(approx_eq(info.penetration, 2.0));
    }

    #[test]
    fn box_vs_circle_negates_circle_vs_box_normal() {
        let circle_first = check_collision(&circle(13.0, 5.0, 4.0), &aabb(0.0, 0.0, 10.0, 10.0));
        let box_first = check_collision(&aabb(0.0, 0.0, 10.0, 10.0), &circle(13.0, 5.0, 4.0));
        assert!(box_first.has_collision);
        assert!(vec_approx_eq(box_first.normal, -circle_first.normal));
        assert!(approx_eq(box_first.penetration, circle_first.penetration));
    }

    // ==================== BOX VS BOX ====================

    #[test]
    fn boxes_separate_along_smaller_overlap() {
        let info = check_collision(&aabb(0.0, 0.0, 10.0, 10.0), &aabb(8.0, 0.0, 18.0, 10.0));
        assert!(info.has_collision);
        assert!(approx_eq(info.penetration, 2.0));
        assert!(vec_approx_eq(info.normal, Vec2::new(-1.0, 0.0)));
    }

    #[test]
    fn boxes_choose_y_axis_when_y_overlap_is_smaller() {
        let info = check_collision(&aabb(0.0, 5.0, 10.0, 15.0), &aabb(2.0, 0.0, 8.0, 6.0));
        assert!(info.has_collision);
        assert!(approx_eq(info.penetration, 1.0));
        assert!(vec_approx_eq(info.normal, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn edge_touching_boxes_do_not_collide() {
        let info = check_collision(&aabb(0.0, 0.0, 10.0, 10.0), &aabb(10.0, 0.0, 20.0, 10.0));
        assert!(!info.has_collision);
    }

    #[test]
    fn aabb_from_center_normalizes_negative_extent() {
        let shape = WorldShape::aabb_from_center(Vec2::new(5.0, 5.0), Vec2::new(-2.0, 1.0));
        assert_eq!(
            shape,
            WorldShape::Aabb {
                min: Vec2::new(3.0, 4.0),
                max: Vec2::new(7.0, 6.0),
            }
        );
        assert!(vec_approx_eq(shape.center(), Vec2::new(5.0, 5.0)));
    }
}
