//! Tunable constants for the combat core.
//!
//! Every constant the AI, collision and combat code reads lives in
//! [`CombatConfig`]. `Default` reproduces the shipped game balance; a JSON
//! document only needs to name the values it overrides:
//!
//! ```
//! use delve_core::config::CombatConfig;
//!
//! let config = CombatConfig::from_json_str(r#"{ "melee": { "damage": 14.0 } }"#).unwrap();
//! assert_eq!(config.melee.damage, 14.0);
//! assert_eq!(config.melee.chase_range, 18.0);
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::Archetype;
use crate::error::ConfigError;

// =============================================================================
// Actor AI tuning
// =============================================================================

/// Tuning for the melee-style state machine shared by melee and tank actors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrawlerTuning {
    /// Distance under which an idle actor starts chasing
    pub chase_range: f32,
    /// Distance at which a chasing actor winds up a swing
    pub attack_range: f32,
    /// Base chase speed (units per second) before difficulty scaling
    pub move_speed: f32,
    /// Seconds between the start of the windup and the swing landing
    pub windup_time: f32,
    /// Seconds of recovery after a swing
    pub recover_time: f32,
    /// Base swing damage before difficulty scaling
    pub damage: f32,
}

impl BrawlerTuning {
    /// Balance for the melee archetype.
    #[must_use]
    pub const fn melee() -> Self {
        Self {
            chase_range: 18.0,
            attack_range: 2.5,
            move_speed: 5.0,
            windup_time: 0.35,
            recover_time: 0.45,
            damage: 10.0,
        }
    }

    /// Balance for the tank archetype: slower, longer reach, heavier hits.
    #[must_use]
    pub const fn tank() -> Self {
        Self {
            chase_range: 20.0,
            attack_range: 3.0,
            move_speed: 3.0,
            windup_time: 0.7,
            recover_time: 0.8,
            damage: 20.0,
        }
    }
}

impl Default for BrawlerTuning {
    fn default() -> Self {
        Self::melee()
    }
}

/// A partial [`BrawlerTuning`] as it appears in a JSON document.
#[derive(Debug, Deserialize)]
struct BrawlerOverrides {
    chase_range: Option<f32>,
    attack_range: Option<f32>,
    move_speed: Option<f32>,
    windup_time: Option<f32>,
    recover_time: Option<f32>,
    damage: Option<f32>,
}

impl BrawlerOverrides {
    fn onto(self, base: BrawlerTuning) -> BrawlerTuning {
        BrawlerTuning {
            chase_range: self.chase_range.unwrap_or(base.chase_range),
            attack_range: self.attack_range.unwrap_or(base.attack_range),
            move_speed: self.move_speed.unwrap_or(base.move_speed),
            windup_time: self.windup_time.unwrap_or(base.windup_time),
            recover_time: self.recover_time.unwrap_or(base.recover_time),
            damage: self.damage.unwrap_or(base.damage),
        }
    }
}

/// Reads a tank block, filling missing fields from [`BrawlerTuning::tank`].
fn tank_with_defaults<'de, D>(deserializer: D) -> Result<BrawlerTuning, D::Error>
where
    D: serde::Deserializer<'de>,
{
    BrawlerOverrides::deserialize(deserializer).map(|overrides| overrides.onto(BrawlerTuning::tank()))
}

/// Tuning for the ranged (kiting) archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedTuning {
    /// Lower edge of the preferred distance band
    pub ideal_min: f32,
    /// Upper edge of the preferred distance band
    pub ideal_max: f32,
    /// Beyond this distance the actor closes in at run speed
    pub too_far: f32,
    /// At or inside this distance the actor flees or runs to a tank
    pub danger_range: f32,
    /// Speed used to close distance, flee and run to a tank
    pub run_speed: f32,
    /// Speed used to back away while still shooting
    pub aim_speed: f32,
    /// Seconds between shots before difficulty scaling
    pub shot_cooldown: f32,
    /// Base projectile damage before difficulty scaling
    pub projectile_damage: f32,
    /// A tank within this radius counts as protection
    pub tank_support_radius: f32,
}

impl Default for RangedTuning {
    fn default() -> Self {
        Self {
            ideal_min: 10.0,
            ideal_max: 15.0,
            too_far: 20.0,
            danger_range: 3.0,
            run_speed: 5.0,
            aim_speed: 2.5,
            shot_cooldown: 2.5,
            projectile_damage: 8.0,
            tank_support_radius: 6.0,
        }
    }
}

// =============================================================================
// Projectiles
// =============================================================================

/// Projectile flight and hit-test parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Speed of actor-fired projectiles
    pub enemy_speed: f32,
    /// Lifetime of actor-fired projectiles in seconds
    pub enemy_lifetime: f32,
    /// Speed of player-fired projectiles
    pub player_speed: f32,
    /// Lifetime of player-fired projectiles in seconds
    pub player_lifetime: f32,
    /// Distance in front of the shooter where a projectile appears
    pub muzzle_offset: f32,
    /// Height above the shooter's center that projectiles leave from
    pub muzzle_height: f32,
    /// Perpendicular distance from the ray that still counts as a hit
    pub hit_radius: f32,
    /// Damage used when a projectile carries no damage of its own
    pub default_damage: f32,
}

impl ProjectileTuning {
    /// Furthest along its ray a player shot can land.
    #[must_use]
    pub fn player_max_range(&self) -> f32 {
        self.player_speed * self.player_lifetime
    }
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            enemy_speed: 16.0,
            enemy_lifetime: 2.5,
            player_speed: 16.0,
            player_lifetime: 2.0,
            muzzle_offset: 0.8,
            muzzle_height: 0.3,
            hit_radius: 1.2,
            default_damage: 8.0,
        }
    }
}

// =============================================================================
// Difficulty, health and economy
// =============================================================================

/// Linear difficulty scaling, `1 + step * (difficulty - 1)`.
///
/// Difficulty values below 1 are treated as 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyScaling {
    /// Speed gain per difficulty level
    pub speed_step: f32,
    /// Damage gain per difficulty level
    pub damage_step: f32,
    /// Fire-rate gain per difficulty level
    pub fire_rate_step: f32,
    /// Floor for the scaled shot cooldown
    pub min_shot_cooldown: f32,
    /// Health gain per difficulty level
    pub health_step: f32,
    /// Gold reward gain per difficulty level
    pub gold_step: f32,
}

impl DifficultyScaling {
    #[allow(clippy::cast_precision_loss)]
    fn levels_above_first(difficulty: u32) -> f32 {
        difficulty.max(1).saturating_sub(1) as f32
    }

    fn linear(step: f32, difficulty: u32) -> f32 {
        1.0 + step * Self::levels_above_first(difficulty)
    }

    /// Movement speed multiplier.
    #[must_use]
    pub fn speed_multiplier(&self, difficulty: u32) -> f32 {
        Self::linear(self.speed_step, difficulty)
    }

    /// Damage multiplier.
    #[must_use]
    pub fn damage_multiplier(&self, difficulty: u32) -> f32 {
        Self::linear(self.damage_step, difficulty)
    }

    /// Health multiplier applied when an actor's pool is created.
    #[must_use]
    pub fn health_multiplier(&self, difficulty: u32) -> f32 {
        Self::linear(self.health_step, difficulty)
    }

    /// Gold reward multiplier.
    #[must_use]
    pub fn gold_multiplier(&self, difficulty: u32) -> f32 {
        Self::linear(self.gold_step, difficulty)
    }

    /// Shot cooldown shortened by difficulty, never below `min_shot_cooldown`.
    #[must_use]
    pub fn shot_cooldown(&self, base: f32, difficulty: u32) -> f32 {
        (base / Self::linear(self.fire_rate_step, difficulty)).max(self.min_shot_cooldown)
    }
}

impl Default for DifficultyScaling {
    fn default() -> Self {
        Self {
            speed_step: 0.15,
            damage_step: 0.2,
            fire_rate_step: 0.1,
            min_shot_cooldown: 0.4,
            health_step: 0.1,
            gold_step: 0.25,
        }
    }
}

/// Base health pools and per-level growth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthTuning {
    /// Base HP for melee actors
    pub melee: f32,
    /// Base HP for ranged actors
    pub ranged: f32,
    /// Base HP for tank actors
    pub tank: f32,
    /// Base HP for neutral actors
    pub neutral: f32,
    /// HP gain per actor level above 1
    pub level_step: f32,
}

impl HealthTuning {
    /// Base HP for an archetype.
    #[must_use]
    pub const fn base_hp(&self, archetype: Archetype) -> f32 {
        match archetype {
            Archetype::Melee => self.melee,
            Archetype::Ranged => self.ranged,
            Archetype::Tank => self.tank,
            Archetype::Neutral => self.neutral,
        }
    }

    /// Multiplier for an actor level; level 0 is treated as 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn level_multiplier(&self, level: u32) -> f32 {
        1.0 + self.level_step * level.max(1).saturating_sub(1) as f32
    }
}

impl Default for HealthTuning {
    fn default() -> Self {
        Self {
            melee: 100.0,
            ranged: 70.0,
            tank: 180.0,
            neutral: 100.0,
            level_step: 0.5,
        }
    }
}

/// Inclusive gold reward range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldRange {
    /// Smallest unscaled reward
    pub min: u32,
    /// Largest unscaled reward
    pub max: u32,
}

impl GoldRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Kill rewards and the difficulty ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Gold for killing a melee actor
    pub melee_gold: GoldRange,
    /// Gold for killing a ranged actor
    pub ranged_gold: GoldRange,
    /// Gold for killing a tank actor
    pub tank_gold: GoldRange,
    /// Gold for killing a neutral actor
    pub neutral_gold: GoldRange,
    /// Score granted per kill
    pub score_per_kill: u32,
    /// Difficulty rises by one every this many kills
    pub kills_per_difficulty: u32,
    /// Emit a replacement spawn request whenever a dungeon actor dies
    pub respawn_on_kill: bool,
}

impl EconomyConfig {
    /// Gold range for an archetype.
    #[must_use]
    pub const fn gold_range(&self, archetype: Archetype) -> GoldRange {
        match archetype {
            Archetype::Melee => self.melee_gold,
            Archetype::Ranged => self.ranged_gold,
            Archetype::Tank => self.tank_gold,
            Archetype::Neutral => self.neutral_gold,
        }
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            melee_gold: GoldRange::new(5, 12),
            ranged_gold: GoldRange::new(6, 14),
            tank_gold: GoldRange::new(10, 25),
            neutral_gold: GoldRange::new(1, 3),
            score_per_kill: 10,
            kills_per_difficulty: 3,
            respawn_on_kill: true,
        }
    }
}

/// Monster generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Inner radius of the ring around the player used when no position is given
    pub ring_min: f32,
    /// Outer radius of that ring
    pub ring_max: f32,
    /// Difficulty at which spawned monsters become elite (level 2)
    pub elite_difficulty: u32,
    /// Share of dungeon spawns that are melee
    pub dungeon_melee_share: f32,
    /// Share of dungeon spawns that are ranged; the rest are tanks
    pub dungeon_ranged_share: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            ring_min: 6.0,
            ring_max: 12.0,
            elite_difficulty: 3,
            dungeon_melee_share: 0.4,
            dungeon_ranged_share: 0.3,
        }
    }
}

// =============================================================================
// Feedback and collision
// =============================================================================

/// Player hit reaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackTuning {
    /// Total knockback displacement
    pub knockback_strength: f32,
    /// Seconds over which the knockback is applied
    pub knockback_duration: f32,
    /// Seconds the hit flash stays visible
    pub hit_flash_duration: f32,
}

impl Default for FeedbackTuning {
    fn default() -> Self {
        Self {
            knockback_strength: 1.5,
            knockback_duration: 0.15,
            hit_flash_duration: 0.15,
        }
    }
}

/// Collision volume sizes and numeric tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Extra distance added when separating overlapping volumes
    pub separation_epsilon: f32,
    /// Slack allowed on the boundary of point containment
    pub containment_tolerance: f32,
    /// Half-extents are clamped to at least this value
    pub min_half_extent: f32,
    /// Default actor half-extents (x, half-height, z)
    pub actor_half_extents: Vec3,
    /// Player half-extents (x, half-height, z)
    pub player_half_extents: Vec3,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            separation_epsilon: 0.01,
            containment_tolerance: 1e-4,
            min_half_extent: 1e-3,
            actor_half_extents: Vec3::new(0.5, 1.0, 0.5),
            player_half_extents: Vec3::new(0.4, 1.0, 0.4),
        }
    }
}

// =============================================================================
// CombatConfig
// =============================================================================

/// Complete set of combat tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Melee archetype
    pub melee: BrawlerTuning,
    /// Tank archetype
    #[serde(deserialize_with = "tank_with_defaults")]
    pub tank: BrawlerTuning,
    /// Ranged archetype
    pub ranged: RangedTuning,
    /// Projectile flight and hit tests
    pub projectile: ProjectileTuning,
    /// Difficulty multipliers
    pub difficulty: DifficultyScaling,
    /// Health pools
    pub health: HealthTuning,
    /// Rewards and difficulty ramp
    pub economy: EconomyConfig,
    /// Monster generation
    pub spawn: SpawnTuning,
    /// Player hit reaction
    pub feedback: FeedbackTuning,
    /// Collision volumes and tolerances
    pub collision: CollisionTuning,
    /// Seed for reward and spawn rolls
    pub seed: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            melee: BrawlerTuning::melee(),
            tank: BrawlerTuning::tank(),
            ranged: RangedTuning::default(),
            projectile: ProjectileTuning::default(),
            difficulty: DifficultyScaling::default(),
            health: HealthTuning::default(),
            economy: EconomyConfig::default(),
            spawn: SpawnTuning::default(),
            feedback: FeedbackTuning::default(),
            collision: CollisionTuning::default(),
            seed: 0,
        }
    }
}

impl CombatConfig {
    /// Parses a (possibly partial) JSON document and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Brawler tuning for an archetype, if it uses the brawler state machine.
    #[must_use]
    pub const fn brawler(&self, archetype: Archetype) -> Option<&BrawlerTuning> {
        match archetype {
            Archetype::Melee => Some(&self.melee),
            Archetype::Tank => Some(&self.tank),
            Archetype::Ranged | Archetype::Neutral => None,
        }
    }

    /// Checks that every value is inside its domain.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let brawlers = [
            (&self.melee, ["melee.attack_range", "melee.chase_range", "melee.windup_time", "melee.recover_time"]),
            (&self.tank, ["tank.attack_range", "tank.chase_range", "tank.windup_time", "tank.recover_time"]),
        ];
        for (tuning, [attack, chase, windup, recover]) in brawlers {
            positive(attack, tuning.attack_range)?;
            positive(chase, tuning.chase_range)?;
            non_negative(windup, tuning.windup_time)?;
            non_negative(recover, tuning.recover_time)?;
        }

        let ranged = &self.ranged;
        if ranged.ideal_min > ranged.ideal_max {
            return Err(ConfigError::Invalid {
                field: "ranged.ideal_min",
                reason: "must not exceed ranged.ideal_max",
            });
        }
        if ranged.danger_range >= ranged.ideal_min {
            return Err(ConfigError::Invalid {
                field: "ranged.danger_range",
                reason: "must be below ranged.ideal_min",
            });
        }
        positive("ranged.shot_cooldown", ranged.shot_cooldown)?;

        positive("projectile.enemy_lifetime", self.projectile.enemy_lifetime)?;
        positive("projectile.player_lifetime", self.projectile.player_lifetime)?;
        positive("projectile.hit_radius", self.projectile.hit_radius)?;
        positive("feedback.knockback_duration", self.feedback.knockback_duration)?;
        positive("collision.min_half_extent", self.collision.min_half_extent)?;

        let economy = &self.economy;
        for range in [
            economy.melee_gold,
            economy.ranged_gold,
            economy.tank_gold,
            economy.neutral_gold,
        ] {
            if range.min > range.max {
                return Err(ConfigError::Invalid {
                    field: "economy.gold",
                    reason: "gold range min must not exceed max",
                });
            }
        }
        if economy.kills_per_difficulty == 0 {
            return Err(ConfigError::Invalid {
                field: "economy.kills_per_difficulty",
                reason: "must be at least 1",
            });
        }
        if self.spawn.ring_min > self.spawn.ring_max {
            return Err(ConfigError::Invalid {
                field: "spawn.ring_min",
                reason: "must not exceed spawn.ring_max",
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be positive",
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must not be negative",
        })
    }
}
