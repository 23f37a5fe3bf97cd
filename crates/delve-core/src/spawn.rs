//! Actor construction with difficulty scaling.
//!
//! Speed, damage, fire rate and health multipliers are computed once, here,
//! from the difficulty at spawn time and cached on the actor. Raising the
//! global difficulty later never changes actors already in the roster.
//!
//! # Example
//!
//! ```
//! use delve_core::arena::Arena;
//! use delve_core::collision::Scope;
//! use delve_core::config::CombatConfig;
//! use delve_core::entity::Archetype;
//! use delve_core::spawn::ActorSpawn;
//! use glam::Vec3;
//!
//! let config = CombatConfig::default();
//! let mut arena = Arena::new();
//! let id = ActorSpawn::new(Archetype::Melee, Scope::Dungeon, Vec3::new(4.0, 1.0, 0.0))
//!     .difficulty(3)
//!     .team("bandits")
//!     .hostile(true)
//!     .spawn(&mut arena, &config);
//!
//! let actor = arena.get(id).unwrap();
//! let data = actor.kind.as_brawler().unwrap();
//! assert!((data.damage - 14.0).abs() < 1e-4);
//! assert!(actor.is_hostile());
//! ```

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::arena::Arena;
use crate::collision::Scope;
use crate::config::{CombatConfig, SpawnTuning};
use crate::entity::{
    Actor, ActorId, ActorKind, Archetype, BrawlerData, BrawlerState, RangedData, TeamId,
    TransformState,
};

/// Team every generated monster belongs to.
pub const MONSTER_TEAM: &str = "bandits";

/// Builder for a new actor.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSpawn {
    archetype: Archetype,
    scope: Scope,
    position: Vec3,
    name: Option<String>,
    team: Option<TeamId>,
    level: u32,
    difficulty: u32,
    hostile: bool,
    eager: bool,
}

impl ActorSpawn {
    /// Starts a level 1, non-hostile, teamless actor at difficulty 1.
    #[must_use]
    pub const fn new(archetype: Archetype, scope: Scope, position: Vec3) -> Self {
        Self {
            archetype,
            scope,
            position,
            name: None,
            team: None,
            level: 1,
            difficulty: 1,
            hostile: false,
            eager: false,
        }
    }

    /// A generated monster: hostile, on the monster team, elite at high
    /// difficulty, and already chasing if it is a melee monster.
    #[must_use]
    pub fn monster(archetype: Archetype, scope: Scope, position: Vec3, difficulty: u32, tuning: &SpawnTuning) -> Self {
        let elite = difficulty >= tuning.elite_difficulty;
        let mut spawn = Self::new(archetype, scope, position)
            .team(MONSTER_TEAM)
            .difficulty(difficulty)
            .level(if elite { 2 } else { 1 })
            .hostile(true);
        spawn.eager = archetype == Archetype::Melee;
        spawn
    }

    /// Sets the display name. Defaults to `monster_<id>`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the team from a tag; blank tags mean no team.
    #[must_use]
    pub fn team(mut self, tag: &str) -> Self {
        self.team = TeamId::parse(tag);
        self
    }

    /// Sets the actor level.
    #[must_use]
    pub const fn level(mut self, level: u32) -> Self {
        self.level = if level == 0 { 1 } else { level };
        self
    }

    /// Sets the difficulty the actor is scaled for.
    #[must_use]
    pub const fn difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Sets initial hostility.
    #[must_use]
    pub const fn hostile(mut self, hostile: bool) -> Self {
        self.hostile = hostile;
        self
    }

    /// AI data with the difficulty multipliers applied.
    #[must_use]
    pub fn kind(&self, config: &CombatConfig) -> ActorKind {
        let scaling = &config.difficulty;
        let speed = scaling.speed_multiplier(self.difficulty);
        let damage = scaling.damage_multiplier(self.difficulty);

        match self.archetype {
            Archetype::Melee | Archetype::Tank => {
                let tuning = config.brawler(self.archetype).unwrap_or(&config.melee);
                let mut data = BrawlerData::new(tuning.move_speed * speed, tuning.damage * damage);
                if self.eager {
                    data.state = BrawlerState::Chase;
                }
                if self.archetype == Archetype::Tank {
                    ActorKind::Tank(data)
                } else {
                    ActorKind::Melee(data)
                }
            }
            Archetype::Ranged => {
                let tuning = &config.ranged;
                ActorKind::Ranged(RangedData::new(
                    tuning.run_speed * speed,
                    tuning.aim_speed * speed,
                    scaling.shot_cooldown(tuning.shot_cooldown, self.difficulty),
                    tuning.projectile_damage * damage,
                ))
            }
            Archetype::Neutral => ActorKind::Neutral,
        }
    }

    /// Adds the actor to `arena`.
    pub fn spawn(self, arena: &mut Arena, config: &CombatConfig) -> ActorId {
        let kind = self.kind(config);
        let name = self
            .name
            .unwrap_or_else(|| format!("monster_{}", arena.peek_next_id()));
        let id = arena.spawn(name, kind, self.scope, TransformState::at(self.position));

        if let Some(actor) = arena.get_mut(id) {
            actor.team = self.team;
            actor.level = self.level;
            actor.hp_scale = config.difficulty.health_multiplier(self.difficulty);
            actor.half_extents = config.collision.actor_half_extents;
            actor.set_hostile(self.hostile);
        }

        tracing::info!(
            actor = %id,
            archetype = %self.archetype,
            scope = %self.scope,
            difficulty = self.difficulty,
            level = self.level,
            "actor spawned"
        );
        id
    }
}

/// Picks a monster archetype for `scope`.
///
/// Overworld spawns are always melee. Dungeon spawns split between melee,
/// ranged and tank by the configured shares.
pub fn roll_archetype<R: Rng>(rng: &mut R, scope: Scope, tuning: &SpawnTuning) -> Archetype {
    match scope {
        Scope::Overworld => Archetype::Melee,
        Scope::Dungeon => {
            let roll: f32 = rng.gen();
            if roll < tuning.dungeon_melee_share {
                Archetype::Melee
            } else if roll < tuning.dungeon_melee_share + tuning.dungeon_ranged_share {
                Archetype::Ranged
            } else {
                Archetype::Tank
            }
        }
    }
}

/// Random ground position on the spawn ring around `center`.
pub fn ring_position<R: Rng>(rng: &mut R, center: Vec3, tuning: &SpawnTuning) -> Vec3 {
    let span = (tuning.ring_max - tuning.ring_min).max(0.0);
    let radius = tuning.ring_min + rng.gen::<f32>() * span;
    let angle = rng.gen::<f32>() * TAU;
    Vec3::new(
        center.x + angle.cos() * radius,
        Actor::DEFAULT_HALF_EXTENTS.y,
        center.z + angle.sin() * radius,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    mod builder_tests {
        use super::*;

        #[test]
        fn difficulty_scales_ranged_data() {
            let config = CombatConfig::default();
            let kind = ActorSpawn::new(Archetype::Ranged, Scope::Dungeon, Vec3::ZERO)
                .difficulty(3)
                .kind(&config);
            let data = kind.as_ranged().unwrap();

            assert!((data.run_speed - 5.0 * 1.3).abs() < 0.0001);
            assert!((data.aim_speed - 2.5 * 1.3).abs() < 0.0001);
            assert!((data.shot_cooldown - 2.5 / 1.2).abs() < 0.0001);
            assert!((data.projectile_damage - 8.0 * 1.4).abs() < 0.0001);
        }

        #[test]
        fn monster_defaults() {
            let config = CombatConfig::default();
            let mut arena = Arena::new();
            let id = ActorSpawn::monster(Archetype::Melee, Scope::Dungeon, Vec3::ZERO, 3, &config.spawn)
                .spawn(&mut arena, &config);

            let actor = arena.get(id).unwrap();
            assert_eq!(actor.name, "monster_0");
            assert_eq!(actor.team.as_ref().map(TeamId::as_str), Some(MONSTER_TEAM));
            assert_eq!(actor.level, 2);
            assert!(actor.is_hostile());
            assert!((actor.hp_scale - 1.2).abs() < 0.0001);
            assert_eq!(actor.kind.as_brawler().unwrap().state, BrawlerState::Chase);
        }

        #[test]
        fn monster_tank_starts_idle() {
            let config = CombatConfig::default();
            let kind = ActorSpawn::monster(Archetype::Tank, Scope::Dungeon, Vec3::ZERO, 1, &config.spawn)
                .kind(&config);
            assert_eq!(kind.as_brawler().unwrap().state, BrawlerState::Idle);
        }

        #[test]
        fn plain_spawn_keeps_name_and_calm() {
            let config = CombatConfig::default();
            let mut arena = Arena::new();
            let id = ActorSpawn::new(Archetype::Neutral, Scope::Overworld, Vec3::ZERO)
                .name("innkeeper")
                .team("  ")
                .spawn(&mut arena, &config);

            let actor = arena.get(id).unwrap();
            assert_eq!(actor.name, "innkeeper");
            assert!(actor.team.is_none());
            assert!(!actor.is_hostile());
        }
    }

    mod roll_tests {
        use super::*;

        #[test]
        fn overworld_is_always_melee() {
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            let tuning = SpawnTuning::default();
            assert!((0..50).all(|_| roll_archetype(&mut rng, Scope::Overworld, &tuning) == Archetype::Melee));
        }

        #[test]
        fn dungeon_mixes_archetypes() {
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            let tuning = SpawnTuning::default();
            let rolls: Vec<Archetype> = (0..300)
                .map(|_| roll_archetype(&mut rng, Scope::Dungeon, &tuning))
                .collect();
            for archetype in [Archetype::Melee, Archetype::Ranged, Archetype::Tank] {
                assert!(rolls.contains(&archetype));
            }
            assert!(!rolls.contains(&Archetype::Neutral));
        }

        #[test]
        fn ring_positions_stay_on_ring() {
            let mut rng = ChaCha8Rng::seed_from_u64(9);
            let tuning = SpawnTuning::default();
            let center = Vec3::new(5.0, 1.0, -3.0);
            for _ in 0..100 {
                let p = ring_position(&mut rng, center, &tuning);
                let r = Vec3::new(p.x - center.x, 0.0, p.z - center.z).length();
                assert!(r >= tuning.ring_min - 1e-4 && r <= tuning.ring_max + 1e-4);
                assert!((p.y - 1.0).abs() < 0.0001);
            }
        }
    }
}
