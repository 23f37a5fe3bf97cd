//! Component structs shared by actors and the player.
//!
//! Components hold plain state. Behavior that reads or writes several
//! components at once lives in the AI, collision and resolver modules.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

// =============================================================================
// Transform
// =============================================================================

/// World-space placement of an actor, the player or a piece of static geometry.
///
/// Rotation is a single yaw around the world Y axis; nothing in the combat core
/// pitches or rolls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// Center of the object in world units
    pub position: Vec3,
    /// Rotation around +Y in radians; yaw 0 faces +Z
    pub yaw: f32,
    /// Per-axis scale applied to local half-extents
    pub scale: Vec3,
}

impl TransformState {
    /// Creates an unscaled transform.
    #[must_use]
    pub const fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            yaw,
            scale: Vec3::ONE,
        }
    }

    /// Creates an unrotated, unscaled transform at `position`.
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self::new(position, 0.0)
    }

    /// Returns this transform with a different scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation as a quaternion.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Position projected onto the ground plane as `(x, z)`.
    #[must_use]
    pub fn horizontal(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    /// Turns to face `target` on the ground plane.
    ///
    /// A target directly above or below leaves the yaw unchanged.
    pub fn face_towards(&mut self, target: Vec3) {
        let dx = target.x - self.position.x;
        let dz = target.z - self.position.z;
        if dx.abs() > f32::EPSILON || dz.abs() > f32::EPSILON {
            self.yaw = dx.atan2(dz);
        }
    }

    /// Unit vector the transform is facing, on the ground plane.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

// =============================================================================
// Health
// =============================================================================

/// Hit point pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Remaining hit points, never negative
    pub current: f32,
    /// Hit points at full health
    pub max: f32,
}

impl Health {
    /// Creates a full pool.
    #[must_use]
    pub const fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Subtracts `amount` and clamps at zero.
    ///
    /// # Returns
    ///
    /// The damage actually absorbed, which is less than `amount` only when the
    /// pool runs dry.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).max(0.0);
        before - self.current
    }

    /// Returns `true` once the pool is empty.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Remaining health as a fraction of max in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            (self.current / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

// =============================================================================
// Hit feedback
// =============================================================================

/// Knockback impulse spread over a short duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knockback {
    /// Displacement per second while active
    pub velocity: Vec3,
    /// Seconds left
    pub remaining: f32,
}

/// Short-lived visual and physical reaction to being hit.
///
/// Both effects are countdowns decremented by [`HitFeedback::tick`], so they
/// behave identically under test and in the game loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HitFeedback {
    /// Seconds the hit flash stays on
    pub flash_remaining: f32,
    /// Active knockback, if any
    pub knockback: Option<Knockback>,
}

impl HitFeedback {
    /// Starts a flash and a knockback along `direction`.
    ///
    /// # Arguments
    ///
    /// * `direction` - Horizontal push direction; normalized here, zero pushes along +X
    /// * `strength` - Total displacement over the knockback
    /// * `duration` - Seconds over which the displacement is applied
    /// * `flash` - Seconds the hit flash stays visible
    pub fn trigger(&mut self, direction: Vec3, strength: f32, duration: f32, flash: f32) {
        self.flash_remaining = flash;
        let flat = Vec3::new(direction.x, 0.0, direction.z).try_normalize().unwrap_or(Vec3::X);
        self.knockback = if duration <= 0.0 {
            None
        } else {
            Some(Knockback {
                velocity: flat * (strength / duration),
                remaining: duration,
            })
        };
    }

    /// Advances both countdowns.
    ///
    /// # Returns
    ///
    /// The knockback displacement to apply this tick.
    pub fn tick(&mut self, dt: f32) -> Vec3 {
        self.flash_remaining = (self.flash_remaining - dt).max(0.0);

        let Some(mut knockback) = self.knockback else {
            return Vec3::ZERO;
        };
        let step = dt.min(knockback.remaining);
        knockback.remaining -= step;
        self.knockback = (knockback.remaining > 0.0).then_some(knockback);
        knockback.velocity * step
    }

    /// Returns `true` while the hit flash should be drawn.
    #[must_use]
    pub fn is_flashing(&self) -> bool {
        self.flash_remaining > 0.0
    }
}

// =============================================================================
// AI state
// =============================================================================

/// State of the melee/tank state machine.
///
/// The attack itself happens on the `Windup -> Recover` edge and has no state
/// of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrawlerState {
    /// Waiting for the target to come within chase range
    #[default]
    Idle,
    /// Steering straight at the target
    Chase,
    /// Committed to a swing
    Windup,
    /// Cooling down after a swing
    Recover,
}

/// Persistent data for melee and tank actors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrawlerData {
    /// Current state
    pub state: BrawlerState,
    /// Seconds left in `Windup` or `Recover`
    pub timer: f32,
    /// Chase speed with difficulty scaling applied at spawn
    pub move_speed: f32,
    /// Swing damage with difficulty scaling applied at spawn
    pub damage: f32,
}

impl BrawlerData {
    /// Creates idle data with cached, already-scaled speed and damage.
    #[must_use]
    pub const fn new(move_speed: f32, damage: f32) -> Self {
        Self {
            state: BrawlerState::Idle,
            timer: 0.0,
            move_speed,
            damage,
        }
    }
}

/// State of the ranged state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangedState {
    /// Holding the distance band and shooting
    #[default]
    Aim,
    /// Running to a tank teammate for cover
    RunToTank,
}

/// Persistent data for ranged actors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangedData {
    /// Current state
    pub state: RangedState,
    /// Seconds until the next shot
    pub shot_timer: f32,
    /// Scaled speed for closing distance, fleeing and running to a tank
    pub run_speed: f32,
    /// Scaled speed for backing away while shooting
    pub aim_speed: f32,
    /// Scaled cooldown between shots
    pub shot_cooldown: f32,
    /// Scaled projectile damage
    pub projectile_damage: f32,
}

impl RangedData {
    /// Creates aiming data; the first shot waits a full cooldown.
    #[must_use]
    pub const fn new(run_speed: f32, aim_speed: f32, shot_cooldown: f32, projectile_damage: f32) -> Self {
        Self {
            state: RangedState::Aim,
            shot_timer: shot_cooldown,
            run_speed,
            aim_speed,
            shot_cooldown,
            projectile_damage,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod transform_tests {
        use super::*;
        use std::f32::consts::FRAC_PI_2;

        #[test]
        fn face_towards_positive_x() {
            let mut transform = TransformState::at(Vec3::ZERO);
            transform.face_towards(Vec3::new(5.0, 0.0, 0.0));
            assert!((transform.yaw - FRAC_PI_2).abs() < 0.0001);
            assert!((transform.forward() - Vec3::X).length() < 0.0001);
        }

        #[test]
        fn face_towards_same_point_keeps_yaw() {
            let mut transform = TransformState::new(Vec3::ZERO, 1.0);
            transform.face_towards(Vec3::new(0.0, 3.0, 0.0));
            assert_eq!(transform.yaw, 1.0);
        }

        #[test]
        fn horizontal_drops_height() {
            let transform = TransformState::at(Vec3::new(1.0, 7.0, -2.0));
            assert_eq!(transform.horizontal(), Vec2::new(1.0, -2.0));
        }
    }

    mod health_tests {
        use super::*;

        #[test]
        fn damage_clamps_at_zero() {
            let mut health = Health::full(30.0);
            let absorbed = health.apply_damage(50.0);
            assert_eq!(health.current, 0.0);
            assert_eq!(absorbed, 30.0);
            assert!(health.is_depleted());
        }

        #[test]
        fn negative_damage_does_not_heal() {
            let mut health = Health::full(30.0);
            health.apply_damage(-10.0);
            assert_eq!(health.current, 30.0);
        }

        #[test]
        fn fraction_of_max() {
            let mut health = Health::full(80.0);
            health.apply_damage(20.0);
            assert!((health.fraction() - 0.75).abs() < 0.0001);
        }
    }

    mod feedback_tests {
        use super::*;

        #[test]
        fn knockback_total_displacement_matches_strength() {
            let mut feedback = HitFeedback::default();
            feedback.trigger(Vec3::X, 1.5, 0.15, 0.15);

            let mut total = Vec3::ZERO;
            for _ in 0..10 {
                total += feedback.tick(0.05);
            }

            assert!((total.x - 1.5).abs() < 0.0001);
            assert!(feedback.knockback.is_none());
        }

        #[test]
        fn flash_expires() {
            let mut feedback = HitFeedback::default();
            feedback.trigger(Vec3::Z, 1.0, 0.1, 0.15);
            feedback.tick(0.1);
            assert!(feedback.is_flashing());
            feedback.tick(0.1);
            assert!(!feedback.is_flashing());
        }

        #[test]
        fn vertical_direction_pushes_along_x() {
            let mut feedback = HitFeedback::default();
            feedback.trigger(Vec3::Y, 1.5, 0.15, 0.15);
            let knockback = feedback.knockback.unwrap();
            assert!((knockback.velocity - Vec3::new(10.0, 0.0, 0.0)).length() < 0.0001);
            assert!(feedback.is_flashing());
        }
    }

    #[test]
    fn ranged_data_starts_on_full_cooldown() {
        let data = RangedData::new(5.0, 2.5, 2.5, 8.0);
        assert_eq!(data.state, RangedState::Aim);
        assert_eq!(data.shot_timer, 2.5);
    }
}
