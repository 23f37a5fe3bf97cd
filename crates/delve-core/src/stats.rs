//! Player stats collaborator.
//!
//! The combat core never owns player health or progression. It reads and
//! writes them through [`PlayerStats`], which the game implements on top of its
//! own save state. [`BasicPlayerStats`] is an in-memory implementation used by
//! tests and headless runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A trainable player stat.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Raises sword damage; trained by sword kills
    Strength,
    /// Raises bow damage; trained by bow kills
    HandEye,
    /// Raises max health; trained by unarmed kills
    Health,
}

impl StatKind {
    /// Parses a stat name, accepting the common spellings of hand-eye.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "strength" => Some(Self::Strength),
            "hand-eye" | "handeye" | "hand_eye" => Some(Self::HandEye),
            "health" => Some(Self::Health),
            _ => None,
        }
    }

    /// Damage multiplier granted by `level`, +10% per level above 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn damage_multiplier(level: u32) -> f32 {
        1.0 + 0.1 * level.saturating_sub(1) as f32
    }
}

/// Weapon used for an attack.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    /// Bare fists
    #[default]
    Hand,
    /// Sword
    Sword,
    /// Bow
    Bow,
}

/// Damage and reach of a melee swing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeleeProfile {
    /// Damage after stat bonuses
    pub damage: f32,
    /// Distance from the swing origin that still connects
    pub reach: f32,
}

impl Weapon {
    /// The stat a kill with this weapon trains.
    #[must_use]
    pub const fn trained_stat(self) -> StatKind {
        match self {
            Self::Hand => StatKind::Health,
            Self::Sword => StatKind::Strength,
            Self::Bow => StatKind::HandEye,
        }
    }

    /// Swing profile, or `None` for the bow.
    ///
    /// Sword damage grows with strength; fists do not scale.
    #[must_use]
    pub fn melee_profile(self, stats: &dyn PlayerStats) -> Option<MeleeProfile> {
        match self {
            Self::Hand => Some(MeleeProfile {
                damage: 10.0,
                reach: 2.5,
            }),
            Self::Sword => Some(MeleeProfile {
                damage: 20.0 * StatKind::damage_multiplier(stats.stat_level(StatKind::Strength)),
                reach: 5.0,
            }),
            Self::Bow => None,
        }
    }

    /// Damage of a bow shot, or `None` for melee weapons.
    #[must_use]
    pub fn shot_damage(self, stats: &dyn PlayerStats) -> Option<f32> {
        match self {
            Self::Bow => Some(15.0 * StatKind::damage_multiplier(stats.stat_level(StatKind::HandEye))),
            Self::Hand | Self::Sword => None,
        }
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hand => write!(f, "hand"),
            Self::Sword => write!(f, "sword"),
            Self::Bow => write!(f, "bow"),
        }
    }
}

/// Player health, economy and progression as seen by the combat core.
pub trait PlayerStats {
    /// Current health.
    fn health(&self) -> f32;

    /// Health cap.
    fn max_health(&self) -> f32;

    /// Overwrites current health; implementations clamp to `[0, max_health]`.
    fn set_health(&mut self, value: f32);

    /// Subtracts `amount` from health, never going below zero.
    ///
    /// # Returns
    ///
    /// Health after the hit.
    fn damage(&mut self, amount: f32) -> f32 {
        let next = (self.health() - amount.max(0.0)).max(0.0);
        self.set_health(next);
        self.health()
    }

    /// Level of a trainable stat, at least 1.
    fn stat_level(&self, stat: StatKind) -> u32;

    /// Grants gold.
    fn add_gold(&mut self, amount: u32);

    /// Grants score.
    fn add_score(&mut self, amount: u32);

    /// Credits a kill to `weapon` for stat training.
    fn record_kill_with(&mut self, _weapon: Weapon) {}
}

/// Kill-driven level of one stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatProgress {
    /// Current level
    pub level: u32,
    /// Kills banked toward the next level
    pub kills_since_level: u32,
}

impl StatProgress {
    /// Adds a kill and applies every level-up it unlocks.
    ///
    /// Going from level N to N+1 takes N kills.
    ///
    /// # Returns
    ///
    /// Number of levels gained.
    pub fn add_kill(&mut self) -> u32 {
        self.kills_since_level += 1;
        let mut gained = 0;
        while self.kills_since_level >= self.level {
            self.kills_since_level -= self.level;
            self.level += 1;
            gained += 1;
        }
        gained
    }
}

impl Default for StatProgress {
    fn default() -> Self {
        Self {
            level: 1,
            kills_since_level: 0,
        }
    }
}

/// In-memory [`PlayerStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicPlayerStats {
    health: f32,
    base_max_health: f32,
    gold: u32,
    score: u32,
    strength: StatProgress,
    hand_eye: StatProgress,
    vitality: StatProgress,
}

impl BasicPlayerStats {
    /// Max health gained per health level above 1.
    pub const HEALTH_PER_LEVEL: f32 = 10.0;

    /// Creates a fresh character at full health.
    #[must_use]
    pub fn new(base_max_health: f32) -> Self {
        Self {
            health: base_max_health,
            base_max_health,
            gold: 0,
            score: 0,
            strength: StatProgress::default(),
            hand_eye: StatProgress::default(),
            vitality: StatProgress::default(),
        }
    }

    /// Gold owned.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Score earned.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Progress of one stat.
    #[must_use]
    pub const fn progress(&self, stat: StatKind) -> &StatProgress {
        match stat {
            StatKind::Strength => &self.strength,
            StatKind::HandEye => &self.hand_eye,
            StatKind::Health => &self.vitality,
        }
    }
}

impl Default for BasicPlayerStats {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl PlayerStats for BasicPlayerStats {
    fn health(&self) -> f32 {
        self.health
    }

    #[allow(clippy::cast_precision_loss)]
    fn max_health(&self) -> f32 {
        self.base_max_health + Self::HEALTH_PER_LEVEL * self.vitality.level.saturating_sub(1) as f32
    }

    fn set_health(&mut self, value: f32) {
        self.health = value.clamp(0.0, self.max_health());
    }

    fn stat_level(&self, stat: StatKind) -> u32 {
        self.progress(stat).level
    }

    fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    fn add_score(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
    }

    #[allow(clippy::cast_precision_loss)]
    fn record_kill_with(&mut self, weapon: Weapon) {
        let stat = weapon.trained_stat();
        let gained = match stat {
            StatKind::Strength => self.strength.add_kill(),
            StatKind::HandEye => self.hand_eye.add_kill(),
            StatKind::Health => self.vitality.add_kill(),
        };
        if gained == 0 {
            return;
        }
        if stat == StatKind::Health {
            let healed = self.health + Self::HEALTH_PER_LEVEL * gained as f32;
            self.set_health(healed);
        }
        tracing::info!(?stat, level = self.stat_level(stat), "player stat leveled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod progress_tests {
        use super::*;

        #[test]
        fn level_n_needs_n_kills() {
            let mut progress = StatProgress::default();
            assert_eq!(progress.add_kill(), 1);
            assert_eq!(progress.level, 2);
            assert_eq!(progress.add_kill(), 0);
            assert_eq!(progress.add_kill(), 1);
            assert_eq!(progress.level, 3);
            assert_eq!(progress.kills_since_level, 0);
        }
    }

    mod player_stats_tests {
        use super::*;

        #[test]
        fn damage_never_goes_negative() {
            let mut stats = BasicPlayerStats::default();
            assert_eq!(stats.damage(30.0), 70.0);
            assert_eq!(stats.damage(500.0), 0.0);
        }

        #[test]
        fn set_health_clamps_to_max() {
            let mut stats = BasicPlayerStats::default();
            stats.set_health(250.0);
            assert_eq!(stats.health(), 100.0);
        }

        #[test]
        fn unarmed_kill_raises_max_health() {
            let mut stats = BasicPlayerStats::default();
            stats.damage(50.0);
            stats.record_kill_with(Weapon::Hand);

            assert_eq!(stats.stat_level(StatKind::Health), 2);
            assert_eq!(stats.max_health(), 110.0);
            assert_eq!(stats.health(), 60.0);
        }

        #[test]
        fn sword_kill_trains_strength_only() {
            let mut stats = BasicPlayerStats::default();
            stats.record_kill_with(Weapon::Sword);
            assert_eq!(stats.stat_level(StatKind::Strength), 2);
            assert_eq!(stats.stat_level(StatKind::HandEye), 1);
            assert_eq!(stats.max_health(), 100.0);
        }

        /// Host stats that track health only and never train.
        struct FixedStats {
            health: f32,
        }

        impl PlayerStats for FixedStats {
            fn health(&self) -> f32 {
                self.health
            }

            fn max_health(&self) -> f32 {
                100.0
            }

            fn set_health(&mut self, value: f32) {
                self.health = value.clamp(0.0, 100.0);
            }

            fn stat_level(&self, _stat: StatKind) -> u32 {
                1
            }

            fn add_gold(&mut self, _amount: u32) {}

            fn add_score(&mut self, _amount: u32) {}
        }

        #[test]
        fn default_kill_hook_trains_nothing() {
            let mut stats = FixedStats { health: 40.0 };
            stats.record_kill_with(Weapon::Sword);
            assert_eq!(stats.stat_level(StatKind::Strength), 1);
            assert_eq!(stats.damage(15.0), 25.0);
        }

        #[test]
        fn gold_and_score_accumulate() {
            let mut stats = BasicPlayerStats::default();
            stats.add_gold(7);
            stats.add_gold(5);
            stats.add_score(10);
            assert_eq!(stats.gold(), 12);
            assert_eq!(stats.score(), 10);
        }
    }

    mod weapon_tests {
        use super::*;

        #[test]
        fn base_profiles() {
            let stats = BasicPlayerStats::default();
            let hand = Weapon::Hand.melee_profile(&stats).unwrap();
            let sword = Weapon::Sword.melee_profile(&stats).unwrap();
            assert_eq!((hand.damage, hand.reach), (10.0, 2.5));
            assert_eq!((sword.damage, sword.reach), (20.0, 5.0));
            assert!(Weapon::Bow.melee_profile(&stats).is_none());
            assert_eq!(Weapon::Bow.shot_damage(&stats), Some(15.0));
            assert!(Weapon::Sword.shot_damage(&stats).is_none());
        }

        #[test]
        fn strength_scales_sword() {
            let mut stats = BasicPlayerStats::default();
            stats.record_kill_with(Weapon::Sword);
            let sword = Weapon::Sword.melee_profile(&stats).unwrap();
            assert!((sword.damage - 22.0).abs() < 0.0001);
        }

        #[test]
        fn stat_names() {
            assert_eq!(StatKind::from_name("Hand_Eye"), Some(StatKind::HandEye));
            assert_eq!(StatKind::from_name("strength"), Some(StatKind::Strength));
            assert_eq!(StatKind::from_name("luck"), None);
        }
    }
}
