//! Oriented bounding boxes and the separating-axis test.
//!
//! Boxes rotate only around Y, so the overlap test is a vertical interval check
//! followed by a 2D SAT on the ground plane over the four box axes.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::world::StaticId;
use crate::entity::{ActorId, TransformState};

/// What a collider wraps.
///
/// This is a back-reference by id; the collider never owns its subject.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderOwner {
    /// The player
    Player,
    /// A roster actor
    Actor(ActorId),
    /// A piece of static geometry
    Static(StaticId),
}

/// World-space oriented box rebuilt from its owner's transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    owner: ColliderOwner,
    local_half_extents: Vec3,
    min_half_extent: f32,
    center: Vec3,
    axis_u: Vec2,
    axis_v: Vec2,
    half_extents: Vec3,
}

impl Collider {
    /// Builds a collider for `owner` placed at `transform`.
    ///
    /// # Arguments
    ///
    /// * `owner` - Back-reference to the wrapped object
    /// * `transform` - Owner's current placement
    /// * `local_half_extents` - Unscaled half-extents (x, half-height, z)
    /// * `min_half_extent` - Floor applied to every world half-extent
    #[must_use]
    pub fn build(
        owner: ColliderOwner,
        transform: &TransformState,
        local_half_extents: Vec3,
        min_half_extent: f32,
    ) -> Self {
        let mut collider = Self {
            owner,
            local_half_extents,
            min_half_extent,
            center: Vec3::ZERO,
            axis_u: Vec2::X,
            axis_v: Vec2::Y,
            half_extents: Vec3::splat(min_half_extent),
        };
        collider.update(transform);
        collider
    }

    /// Recomputes center, axes and world half-extents from `transform`.
    pub fn update(&mut self, transform: &TransformState) {
        let rotation = transform.rotation();
        let u = rotation * Vec3::X;
        let v = rotation * Vec3::Z;

        self.center = transform.position;
        self.axis_u = Vec2::new(u.x, u.z).try_normalize().unwrap_or(Vec2::X);
        self.axis_v = Vec2::new(v.x, v.z).try_normalize().unwrap_or(Vec2::Y);
        self.half_extents =
            (self.local_half_extents * transform.scale.abs()).max(Vec3::splat(self.min_half_extent));
    }

    /// Returns the owner back-reference.
    #[must_use]
    pub const fn owner(&self) -> ColliderOwner {
        self.owner
    }

    /// World-space center.
    #[must_use]
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Local X axis on the ground plane.
    #[must_use]
    pub const fn axis_u(&self) -> Vec2 {
        self.axis_u
    }

    /// Local Z axis on the ground plane.
    #[must_use]
    pub const fn axis_v(&self) -> Vec2 {
        self.axis_v
    }

    /// World half-extents (x, half-height, z), each at least the minimum.
    #[must_use]
    pub const fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    fn horizontal_center(&self) -> Vec2 {
        Vec2::new(self.center.x, self.center.z)
    }

    /// Half-width of the box's shadow on `axis`.
    fn projected_radius(&self, axis: Vec2) -> f32 {
        self.half_extents.x * self.axis_u.dot(axis).abs()
            + self.half_extents.z * self.axis_v.dot(axis).abs()
    }
}

/// Outcome of [`test`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SatResult {
    /// Whether the boxes overlap
    pub intersects: bool,
    /// Axis of minimum overlap on the ground plane (unit length)
    pub axis: Vec2,
    /// Overlap along `axis`
    pub depth: f32,
    /// `+1` or `-1`; moving the first box along `axis * push_sign` separates it
    pub push_sign: f32,
}

impl SatResult {
    /// Result for boxes that do not touch.
    pub const SEPARATED: Self = Self {
        intersects: false,
        axis: Vec2::ZERO,
        depth: 0.0,
        push_sign: 0.0,
    };

    /// Separation vector for the first box, on the ground plane, without epsilon.
    #[must_use]
    pub fn push(&self) -> Vec2 {
        self.axis * (self.depth * self.push_sign)
    }
}

/// Tests two colliders for overlap.
///
/// Boxes that are only touching (zero overlap on some axis) do not intersect.
#[must_use]
pub fn test(a: &Collider, b: &Collider) -> SatResult {
    if (a.center.y - b.center.y).abs() > a.half_extents.y + b.half_extents.y {
        return SatResult::SEPARATED;
    }

    let offset = b.horizontal_center() - a.horizontal_center();
    let mut best = SatResult::SEPARATED;
    let mut best_overlap = f32::INFINITY;

    for axis in [a.axis_u, a.axis_v, b.axis_u, b.axis_v] {
        let distance = offset.dot(axis);
        let overlap = a.projected_radius(axis) + b.projected_radius(axis) - distance.abs();
        if overlap <= 0.0 {
            return SatResult::SEPARATED;
        }
        if overlap < best_overlap {
            best_overlap = overlap;
            best = SatResult {
                intersects: true,
                axis,
                depth: overlap,
                push_sign: if distance > 0.0 { -1.0 } else { 1.0 },
            };
        }
    }

    best
}

/// Moves `mover` out of the overlap described by `result`.
///
/// The mover is pushed by the full depth plus `epsilon` along the separating
/// axis, so a follow-up [`test`] against the same box reports no overlap.
///
/// # Returns
///
/// The horizontal displacement applied, zero when `result` is not an overlap.
pub fn resolve_penetration(mover: &mut TransformState, result: &SatResult, epsilon: f32) -> Vec2 {
    if !result.intersects {
        return Vec2::ZERO;
    }
    let displacement = result.axis * (result.push_sign * (result.depth + epsilon));
    mover.position.x += displacement.x;
    mover.position.z += displacement.y;
    displacement
}

/// Returns `true` if `point` lies inside `collider`, boundary included.
///
/// # Arguments
///
/// * `collider` - Box to test against
/// * `point` - World-space point
/// * `tolerance` - Slack added to every half-extent
#[must_use]
pub fn contains_point(collider: &Collider, point: Vec3, tolerance: f32) -> bool {
    if (point.y - collider.center.y).abs() > collider.half_extents.y + tolerance {
        return false;
    }
    let local = Vec2::new(point.x - collider.center.x, point.z - collider.center.z);
    local.dot(collider.axis_u).abs() <= collider.half_extents.x + tolerance
        && local.dot(collider.axis_v).abs() <= collider.half_extents.z + tolerance
}

// =============================================================================
// Tests
// =============================================================================
