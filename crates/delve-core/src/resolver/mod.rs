//! Combat resolution: the only code that changes health, grants rewards or
//! decides death.
//!
//! # Architecture
//!
//! The resolver consumes [`CombatEvent`]s one at a time, in the order the tick
//! raised them, and writes the outcome to an [`EventLog`]:
//!
//! 1. Pick the target. A player attack outside a fight searches every hostile
//!    actor; inside a fight it tests only the current target. Actor attacks
//!    always target the player; range was already checked by the AI.
//! 2. Make sure the target (or attacker) is part of the [`Engagement`]. Joining
//!    creates the actor's health pool and spreads hostility to its team.
//! 3. Apply damage. Actor health lives on the actor; player health lives in
//!    the [`PlayerStats`] collaborator.
//! 4. On death: mark the actor dead, grant gold and score, count the kill,
//!    raise difficulty every few kills and request a replacement monster.
//!
//! Failures are returned as [`CombatError`]s and never abort the tick; the
//! caller logs them and moves on.
//!
//! # Invariants
//!
//! - Actor health is only created at engagement start and is never recomputed
//! - Dead actors stay in the roster until the end of the tick, flagged
//!   [`StatusFlags::DEAD`], so later events see them as dead rather than unknown
//! - Gold rolls come from a seeded `ChaCha8Rng`; the same seed and the same
//!   events give the same rewards

mod engagement;
mod hit;
mod rewards;

pub use engagement::Engagement;
pub use rewards::KillLedger;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::arena::Arena;
use crate::collision::Scope;
use crate::config::CombatConfig;
use crate::entity::{Actor, ActorId, Combatant, Health, Player, StatusFlags};
use crate::error::{CombatError, CombatResult};
use crate::output::{
    CombatEvent, Event, EventLog, HitTest, Intent, PlayerAction, SpawnRequest, TargetSet,
};
use crate::stats::{PlayerStats, Weapon};

/// Mutable state a combat event may touch.
pub struct Battlefield<'a> {
    /// Actor roster
    pub arena: &'a mut Arena,
    /// Player body (knockback, flash)
    pub player: &'a mut Player,
    /// Player health and economy
    pub stats: &'a mut dyn PlayerStats,
    /// Balance constants
    pub config: &'a CombatConfig,
}

/// Applies attack attempts and owns fight-wide state.
#[derive(Debug, Clone)]
pub struct CombatResolver {
    engagement: Engagement,
    ledger: KillLedger,
    rng: ChaCha8Rng,
}

impl CombatResolver {
    /// Creates a resolver with no fight, zero kills and difficulty 1.
    ///
    /// # Arguments
    ///
    /// * `seed` - Seed for gold rolls
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            engagement: Engagement::new(),
            ledger: KillLedger::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The current fight.
    #[must_use]
    pub const fn engagement(&self) -> &Engagement {
        &self.engagement
    }

    /// Kill counter and difficulty.
    #[must_use]
    pub const fn ledger(&self) -> &KillLedger {
        &self.ledger
    }

    /// Current global difficulty.
    #[must_use]
    pub const fn difficulty(&self) -> u32 {
        self.ledger.difficulty()
    }

    // =========================================================================
    // Building attack attempts
    // =========================================================================

    /// Turns a controller action into an attack attempt.
    ///
    /// Swings test only the current target while a fight is on, otherwise
    /// every hostile actor in `scope`. Shots always consider every hostile
    /// actor in `scope` and travel at most the player projectile range.
    #[must_use]
    pub fn player_event(
        &self,
        action: &PlayerAction,
        arena: &Arena,
        scope: Scope,
        config: &CombatConfig,
    ) -> CombatEvent {
        let hostiles = || {
            TargetSet::Actors(
                arena
                    .living_in(scope)
                    .filter(|actor| actor.is_hostile())
                    .map(Actor::id)
                    .collect(),
            )
        };

        match *action {
            PlayerAction::Melee {
                origin,
                range,
                damage,
                weapon,
            } => CombatEvent {
                attacker: Combatant::Player,
                targets: self
                    .engagement
                    .target()
                    .map_or_else(hostiles, TargetSet::Engaged),
                damage,
                hit_test: HitTest::Reach { origin, range },
                weapon: Some(weapon),
            },
            PlayerAction::Shoot {
                origin,
                direction,
                damage,
                weapon,
            } => CombatEvent {
                attacker: Combatant::Player,
                targets: hostiles(),
                damage,
                hit_test: HitTest::Ray {
                    origin,
                    direction: direction.normalize_or_zero(),
                    max_range: config.projectile.player_max_range(),
                    radius: config.projectile.hit_radius,
                },
                weapon: Some(weapon),
            },
        }
    }

    /// Turns an AI swing into an attack attempt on the player.
    ///
    /// Shots become projectiles instead and return `None`.
    #[must_use]
    pub fn intent_event(intent: &Intent) -> Option<CombatEvent> {
        match *intent {
            Intent::MeleeStrike {
                attacker,
                origin,
                damage,
            } => Some(Self::contact_event(attacker, origin, damage)),
            Intent::FireProjectile { .. } => None,
        }
    }

    /// An actor's attack that is already known to connect with the player.
    #[must_use]
    pub fn contact_event(attacker: ActorId, origin: Vec3, damage: f32) -> CombatEvent {
        CombatEvent {
            attacker: Combatant::Actor(attacker),
            targets: TargetSet::Player,
            damage,
            hit_test: HitTest::Contact { origin },
            weapon: None,
        }
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Applies one attack attempt.
    ///
    /// # Errors
    ///
    /// - [`CombatError::UnknownActor`] / [`CombatError::ActorDead`] when the
    ///   attacker or engaged target no longer exists
    /// - [`CombatError::NoTarget`] / [`CombatError::OutOfRange`] when nothing
    ///   was hit; an [`Event::AttackMissed`] is logged as well
    pub fn resolve(
        &mut self,
        event: &CombatEvent,
        field: &mut Battlefield<'_>,
        log: &mut EventLog,
    ) -> CombatResult<()> {
        if event.damage <= 0.0 {
            tracing::debug!(attacker = %event.attacker, "ignoring zero-damage attack");
            return Ok(());
        }

        match (event.attacker, &event.targets) {
            (Combatant::Actor(attacker), TargetSet::Player) => {
                self.hit_player(attacker, event.damage, event.hit_test.origin(), field, log)
            }
            (Combatant::Player, targets) => {
                let target = match hit::select_target(field.arena, targets, &event.hit_test) {
                    Ok(id) => id,
                    Err(err) => {
                        log.push(Event::AttackMissed {
                            attacker: event.attacker,
                        });
                        return Err(err);
                    }
                };
                if !self.engagement.contains(target) {
                    self.engage(target, field.arena, field.config, log)?;
                }
                self.hit_actor(target, event.damage, event.weapon, field, log)
            }
            (Combatant::Actor(_), _) => Err(CombatError::NoTarget),
        }
    }

    /// Pulls `id` into the fight, starting one if none is on.
    ///
    /// Creates the actor's health pool if it has none, flags it engaged and
    /// spreads hostility to its team.
    ///
    /// # Errors
    ///
    /// Missing-reference errors if `id` is unknown or dead.
    pub fn engage(
        &mut self,
        id: ActorId,
        arena: &mut Arena,
        config: &CombatConfig,
        log: &mut EventLog,
    ) -> CombatResult<()> {
        let actor = arena.living_mut(id)?;
        if actor.health.is_none() {
            let max = config.health.base_hp(actor.archetype())
                * config.health.level_multiplier(actor.level)
                * actor.hp_scale;
            actor.health = Some(Health::full(max));
        }
        actor.flags.insert(StatusFlags::ENGAGED);

        let changed = arena.set_hostile(id, true)?;
        if !changed.is_empty() {
            log.push(Event::HostilityChanged {
                actors: changed,
                hostile: true,
            });
        }

        if self.engagement.join(id) {
            tracing::info!(actor = %id, "engagement started");
            log.push(Event::EngagementStarted { target: id });
        }
        Ok(())
    }

    /// Takes `id` out of the fight without killing it.
    ///
    /// # Errors
    ///
    /// [`CombatError::NotEngaged`] if `id` was not part of the fight.
    pub fn disengage(
        &mut self,
        id: ActorId,
        arena: &mut Arena,
        from: Vec3,
        log: &mut EventLog,
    ) -> CombatResult<()> {
        if !self.engagement.contains(id) {
            return Err(CombatError::NotEngaged(id));
        }
        if let Some(actor) = arena.get_mut(id) {
            actor.flags.remove(StatusFlags::ENGAGED);
        }
        self.release(id, arena, from, log);
        Ok(())
    }

    /// Drops actors that left the roster (scope teardown) from the fight.
    pub fn forget(&mut self, ids: &[ActorId], arena: &mut Arena, from: Vec3, log: &mut EventLog) {
        for id in ids {
            if self.engagement.contains(*id) {
                self.release(*id, arena, from, log);
            }
        }
    }

    /// Ends the fight, clearing every participant's engaged flag.
    ///
    /// Does nothing if no fight is on.
    pub fn end_engagement(&mut self, arena: &mut Arena, log: &mut EventLog) {
        if self.engagement.is_active() {
            self.close(arena, log);
        }
    }

    fn close(&mut self, arena: &mut Arena, log: &mut EventLog) {
        for id in self.engagement.clear() {
            if let Some(actor) = arena.get_mut(id) {
                actor.flags.remove(StatusFlags::ENGAGED);
            }
        }
        tracing::info!(kills = self.ledger.kills(), "engagement ended");
        log.push(Event::EngagementEnded);
    }

    fn hit_player(
        &mut self,
        attacker: ActorId,
        damage: f32,
        origin: Vec3,
        field: &mut Battlefield<'_>,
        log: &mut EventLog,
    ) -> CombatResult<()> {
        field.arena.living(attacker)?;
        if !self.engagement.contains(attacker) {
            self.engage(attacker, field.arena, field.config, log)?;
        }

        let remaining = field.stats.damage(damage);
        tracing::debug!(attacker = %attacker, damage, remaining, "player hit");
        log.push(Event::PlayerDamaged {
            attacker,
            amount: damage,
            remaining,
        });

        if remaining <= 0.0 {
            tracing::info!(attacker = %attacker, "player defeated");
            log.push(Event::PlayerDefeated);
            self.end_engagement(field.arena, log);
            return Ok(());
        }

        let feedback = &field.config.feedback;
        let away = field.player.position() - origin;
        field.player.feedback.trigger(
            away,
            feedback.knockback_strength,
            feedback.knockback_duration,
            feedback.hit_flash_duration,
        );
        Ok(())
    }

    fn hit_actor(
        &mut self,
        id: ActorId,
        amount: f32,
        weapon: Option<Weapon>,
        field: &mut Battlefield<'_>,
        log: &mut EventLog,
    ) -> CombatResult<()> {
        let actor = field.arena.living_mut(id)?;
        let Some(health) = actor.health.as_mut() else {
            return Err(CombatError::NotEngaged(id));
        };
        let absorbed = health.apply_damage(amount);
        let remaining = health.current;
        let depleted = health.is_depleted();

        tracing::debug!(actor = %id, damage = absorbed, remaining, "actor hit");
        log.push(Event::ActorDamaged {
            actor: id,
            amount: absorbed,
            remaining,
        });

        if depleted {
            self.kill(id, weapon, field, log)?;
        }
        Ok(())
    }

    fn kill(
        &mut self,
        id: ActorId,
        weapon: Option<Weapon>,
        field: &mut Battlefield<'_>,
        log: &mut EventLog,
    ) -> CombatResult<()> {
        let config = field.config;
        let actor = field.arena.living_mut(id)?;
        let archetype = actor.archetype();
        let scope = actor.scope;
        actor.mark_dead();

        tracing::info!(actor = %id, %archetype, %scope, "actor killed");
        log.push(Event::ActorKilled {
            actor: id,
            archetype,
            scope,
            weapon,
        });

        let gold = rewards::roll_gold(
            &mut self.rng,
            config.economy.gold_range(archetype),
            config.difficulty.gold_multiplier(self.ledger.difficulty()),
        );
        field.stats.add_gold(gold);
        log.push(Event::GoldGranted { amount: gold });
        field.stats.add_score(config.economy.score_per_kill);
        log.push(Event::ScoreGranted {
            amount: config.economy.score_per_kill,
        });
        if let Some(weapon) = weapon {
            field.stats.record_kill_with(weapon);
        }

        if let Some(difficulty) = self.ledger.record_kill(config.economy.kills_per_difficulty) {
            tracing::info!(difficulty, kills = self.ledger.kills(), "difficulty raised");
            log.push(Event::DifficultyRaised { difficulty });
        }

        if scope == Scope::Dungeon && config.economy.respawn_on_kill {
            log.push(Event::SpawnRequested(SpawnRequest {
                difficulty: self.ledger.difficulty(),
                position: None,
            }));
        }

        let from = field.player.position();
        self.release(id, field.arena, from, log);
        Ok(())
    }

    /// Removes `id` from the fight and retargets to the nearest living
    /// participant, ending the fight when none is left.
    fn release(&mut self, id: ActorId, arena: &mut Arena, from: Vec3, log: &mut EventLog) {
        if !self.engagement.leave(id) {
            return;
        }

        let next = self
            .engagement
            .participants()
            .filter_map(|p| arena.get(p).filter(|actor| actor.is_alive()))
            .map(|actor| (actor.transform.position.distance_squared(from), actor.id()))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, next)| next);

        match next {
            Some(next) => {
                self.engagement.retarget(next);
                tracing::info!(actor = %next, "engagement retargeted");
                log.push(Event::EngagementStarted { target: next });
            }
            None => self.close(arena, log),
        }
    }
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new(0)
    }
}
