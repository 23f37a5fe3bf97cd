//! Melee and tank state machine.
//!
//! `Idle -> Chase -> Windup -> (strike) -> Recover -> Chase | Idle`
//!
//! Every range check compares squared horizontal distances.

use glam::Vec3;

use super::{horizontal_distance_sq, steer};
use crate::config::BrawlerTuning;
use crate::entity::{BrawlerData, BrawlerState};

/// Result of one brawler update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrawlerStep {
    /// Velocity for this tick
    pub velocity: Vec3,
    /// `true` when a swing landed this tick
    pub strike: bool,
}

/// Advances the state machine by `dt`.
///
/// # Arguments
///
/// * `data` - The actor's persistent brawler state (updated in place)
/// * `tuning` - Ranges and timings for the archetype
/// * `position` - Actor position
/// * `target` - Target position
/// * `dt` - Elapsed seconds
pub fn update(
    data: &mut BrawlerData,
    tuning: &BrawlerTuning,
    position: Vec3,
    target: Vec3,
    dt: f32,
) -> BrawlerStep {
    let distance_sq = horizontal_distance_sq(position, target);
    let chase_sq = tuning.chase_range * tuning.chase_range;
    let attack_sq = tuning.attack_range * tuning.attack_range;

    let mut step = BrawlerStep {
        velocity: Vec3::ZERO,
        strike: false,
    };

    match data.state {
        BrawlerState::Idle => {
            if distance_sq < chase_sq {
                data.state = BrawlerState::Chase;
            }
        }
        BrawlerState::Chase => {
            if distance_sq <= attack_sq {
                data.state = BrawlerState::Windup;
                data.timer = tuning.windup_time;
            } else {
                step.velocity = steer(position, target, data.move_speed);
            }
        }
        BrawlerState::Windup => {
            data.timer -= dt;
            if data.timer <= 0.0 {
                step.strike = distance_sq <= attack_sq;
                data.state = BrawlerState::Recover;
                data.timer = tuning.recover_time;
            }
        }
        BrawlerState::Recover => {
            data.timer -= dt;
            if data.timer <= 0.0 {
                data.state = if distance_sq <= chase_sq {
                    BrawlerState::Chase
                } else {
                    BrawlerState::Idle
                };
            }
        }
    }

    step
}

#[cfg(test)]
mod tests {
    use super::*;

    fn melee() -> (BrawlerData, BrawlerTuning) {
        let tuning = BrawlerTuning::melee();
        (BrawlerData::new(tuning.move_speed, tuning.damage), tuning)
    }

    fn at(distance: f32) -> Vec3 {
        Vec3::new(distance, 0.0, 0.0)
    }

    #[test]
    fn fixed_distance_sequence() {
        let (mut data, tuning) = melee();
        let distances = [25.0, 25.0, 10.0, 10.0, 2.0, 2.0, 2.0, 10.0, 10.0];
        let expected = [
            (BrawlerState::Idle, false),
            (BrawlerState::Idle, false),
            (BrawlerState::Chase, false),
            (BrawlerState::Chase, false),
            (BrawlerState::Windup, false),
            (BrawlerState::Recover, true),
            (BrawlerState::Recover, false),
            (BrawlerState::Chase, false),
            (BrawlerState::Chase, false),
        ];

        let observed: Vec<(BrawlerState, bool)> = distances
            .iter()
            .map(|d| {
                let step = update(&mut data, &tuning, Vec3::ZERO, at(*d), 0.4);
                (data.state, step.strike)
            })
            .collect();

        assert_eq!(observed, expected);
    }

    #[test]
    fn recover_beyond_chase_range_goes_idle() {
        let (mut data, tuning) = melee();
        data.state = BrawlerState::Recover;
        data.timer = 0.1;

        update(&mut data, &tuning, Vec3::ZERO, at(25.0), 0.2);
        assert_eq!(data.state, BrawlerState::Idle);
    }

    #[test]
    fn windup_whiffs_when_target_steps_out() {
        let (mut data, tuning) = melee();
        data.state = BrawlerState::Windup;
        data.timer = 0.1;

        let step = update(&mut data, &tuning, Vec3::ZERO, at(4.0), 0.2);
        assert!(!step.strike);
        assert_eq!(data.state, BrawlerState::Recover);
        assert_eq!(data.timer, tuning.recover_time);
    }

    #[test]
    fn chase_steers_at_cached_speed() {
        let (mut data, tuning) = melee();
        data.state = BrawlerState::Chase;
        data.move_speed = 7.0;

        let step = update(&mut data, &tuning, Vec3::ZERO, Vec3::new(0.0, 3.0, 10.0), 0.1);
        assert!((step.velocity - Vec3::new(0.0, 0.0, 7.0)).length() < 0.0001);
    }

    #[test]
    fn idle_and_windup_stand_still() {
        let (mut data, tuning) = melee();
        let step = update(&mut data, &tuning, Vec3::ZERO, at(30.0), 0.1);
        assert_eq!(step.velocity, Vec3::ZERO);

        data.state = BrawlerState::Windup;
        data.timer = 1.0;
        let step = update(&mut data, &tuning, Vec3::ZERO, at(1.0), 0.1);
        assert_eq!(step.velocity, Vec3::ZERO);
    }

    #[test]
    fn tank_ranges_are_wider() {
        let tuning = BrawlerTuning::tank();
        let mut data = BrawlerData::new(tuning.move_speed, tuning.damage);
        data.state = BrawlerState::Chase;

        update(&mut data, &tuning, Vec3::ZERO, at(2.9), 0.1);
        assert_eq!(data.state, BrawlerState::Windup);
        assert_eq!(data.timer, 0.7);
    }
}
