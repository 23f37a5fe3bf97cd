//! Hit tests for attack attempts.
//!
//! Each test scores a target center; lower scores are better (squared
//! distance for reach tests, distance along the ray for ray tests).

use glam::Vec3;

use crate::arena::Arena;
use crate::entity::ActorId;
use crate::error::{CombatError, CombatResult};
use crate::output::{HitTest, TargetSet};

/// Scores `center` against `test`.
///
/// # Errors
///
/// [`CombatError::OutOfRange`] when the target is beyond reach, behind the ray
/// origin or too far from the ray. [`CombatError::NoTarget`] for a ray with no
/// direction.
pub(crate) fn score(test: &HitTest, center: Vec3) -> CombatResult<f32> {
    match *test {
        HitTest::Reach { origin, range } => {
            let distance_sq = origin.distance_squared(center);
            if distance_sq <= range * range {
                Ok(distance_sq)
            } else {
                Err(CombatError::OutOfRange {
                    distance: distance_sq.sqrt(),
                    range,
                })
            }
        }
        HitTest::Ray {
            origin,
            direction,
            max_range,
            radius,
        } => {
            let direction = direction.normalize_or_zero();
            if direction == Vec3::ZERO {
                return Err(CombatError::NoTarget);
            }
            let along = (center - origin).dot(direction);
            if along < 0.0 || along > max_range {
                return Err(CombatError::OutOfRange {
                    distance: along.abs(),
                    range: max_range,
                });
            }
            let miss = center.distance(origin + direction * along);
            if miss <= radius {
                Ok(along)
            } else {
                Err(CombatError::OutOfRange {
                    distance: miss,
                    range: radius,
                })
            }
        }
        HitTest::Contact { .. } => Ok(0.0),
    }
}

/// Picks the actor an attack lands on.
///
/// An engaged target must be alive and pass the test. From an actor list,
/// the best-scoring hostile actor wins; ties keep the earlier-spawned one.
///
/// # Errors
///
/// Missing-reference errors for a dead or unknown engaged target, the test's
/// own error for an engaged target that misses, and [`CombatError::NoTarget`]
/// when nothing in a list qualifies.
pub(crate) fn select_target(arena: &Arena, targets: &TargetSet, test: &HitTest) -> CombatResult<ActorId> {
    match targets {
        TargetSet::Engaged(id) => {
            let actor = arena.living(*id)?;
            score(test, actor.transform.position)?;
            Ok(*id)
        }
        TargetSet::Actors(ids) => ids
            .iter()
            .filter_map(|id| arena.living(*id).ok())
            .filter(|actor| actor.is_hostile())
            .filter_map(|actor| {
                score(test, actor.transform.position)
                    .ok()
                    .map(|s| (s, actor.id()))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
            .ok_or(CombatError::NoTarget),
        TargetSet::Player => Err(CombatError::NoTarget),
    }
}
