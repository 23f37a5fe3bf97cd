//! Ranged (kiting) state machine.
//!
//! In `Aim` the actor keeps to a distance band around its target:
//!
//! | distance              | motion                         | shooting    |
//! |-----------------------|--------------------------------|-------------|
//! | `> too_far`           | close in at run speed          | yes         |
//! | ideal band            | hold                           | yes         |
//! | `(danger, ideal_min)` | back away at aim speed         | yes         |
//! | `<= danger`           | run to a far tank, else flee   | timer holds |
//!
//! `RunToTank` steers at the teammate tank until inside the support radius,
//! then returns to `Aim`. Distances between `ideal_max` and `too_far` hold
//! position like the ideal band.

use glam::Vec3;

use super::{horizontal_distance_sq, steer};
use crate::config::RangedTuning;
use crate::entity::{RangedData, RangedState};

/// Result of one ranged update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangedStep {
    /// Velocity for this tick
    pub velocity: Vec3,
    /// `true` when a shot should be fired at the target this tick
    pub fire: bool,
}

/// Advances the state machine by `dt`.
///
/// # Arguments
///
/// * `data` - The actor's persistent ranged state (updated in place)
/// * `tuning` - Distance bands and support radius
/// * `position` - Actor position
/// * `target` - Target position
/// * `tank` - Position of the nearest living teammate tank, if any
/// * `dt` - Elapsed seconds
pub fn update(
    data: &mut RangedData,
    tuning: &RangedTuning,
    position: Vec3,
    target: Vec3,
    tank: Option<Vec3>,
    dt: f32,
) -> RangedStep {
    let distance_sq = horizontal_distance_sq(position, target);
    let support_sq = tuning.tank_support_radius * tuning.tank_support_radius;
    let far_tank = tank.filter(|t| horizontal_distance_sq(position, *t) > support_sq);

    let mut step = RangedStep {
        velocity: Vec3::ZERO,
        fire: false,
    };

    match data.state {
        RangedState::RunToTank => match far_tank {
            Some(tank) => step.velocity = steer(position, tank, data.run_speed),
            None => data.state = RangedState::Aim,
        },
        RangedState::Aim => {
            if distance_sq <= tuning.danger_range * tuning.danger_range {
                if far_tank.is_some() {
                    data.state = RangedState::RunToTank;
                } else {
                    step.velocity = -steer(position, target, data.run_speed);
                }
                data.shot_timer = data.shot_timer.max(0.0);
                return step;
            }

            if distance_sq > tuning.too_far * tuning.too_far {
                step.velocity = steer(position, target, data.run_speed);
            } else if distance_sq < tuning.ideal_min * tuning.ideal_min {
                step.velocity = -steer(position, target, data.aim_speed);
            }

            data.shot_timer -= dt;
            if data.shot_timer <= 0.0 {
                step.fire = true;
                data.shot_timer = data.shot_cooldown;
            }
        }
    }

    step
}
