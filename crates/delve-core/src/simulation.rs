//! Simulation module with the fixed-order combat tick.
//!
//! The `Simulation` struct owns every piece of combat state and advances it
//! one `dt` at a time:
//!
//! 1. **AI**: hostile actors of the active scope pick velocity, facing and intents
//! 2. **INTEGRATE**: actors and the player move; knockback and hit flash count down
//! 3. **COLLIDE**: the player, then each actor in id order, is pushed out of
//!    static geometry and other bodies
//! 4. **PROJECTILES**: new shots are launched; every projectile ages, moves and
//!    is hit-tested
//! 5. **COMBAT**: player actions, AI swings and projectile hits are resolved
//! 6. **ROSTER**: dead actors are removed and their visuals dropped
//!
//! # Determinism
//!
//! - Actors, colliders and projectiles are visited in id order (`BTreeMap`)
//! - Deaths are applied at the end of the tick, never mid-phase
//! - Every random roll comes from a `ChaCha8Rng` seeded from the config
//!
//! # Example
//!
//! ```
//! use delve_core::config::CombatConfig;
//! use delve_core::entity::Archetype;
//! use delve_core::collision::Scope;
//! use delve_core::scene::NullScene;
//! use delve_core::simulation::Simulation;
//! use delve_core::spawn::ActorSpawn;
//! use delve_core::stats::BasicPlayerStats;
//! use glam::Vec3;
//!
//! let mut sim = Simulation::new(CombatConfig::default());
//! let mut stats = BasicPlayerStats::default();
//! let id = sim.spawn(
//!     ActorSpawn::new(Archetype::Melee, Scope::Overworld, Vec3::new(10.0, 1.0, 0.0)).hostile(true),
//!     &mut NullScene,
//! );
//!
//! for _ in 0..10 {
//!     sim.step(0.1, &[], &mut stats, &mut NullScene);
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert!(sim.arena().get(id).unwrap().transform.position.x < 10.0);
//! ```

use std::fmt;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::{self, AiContext};
use crate::arena::Arena;
use crate::collision::{Collider, ColliderOwner, CollisionWorld, Scope, StaticGeometry, StaticId};
use crate::config::CombatConfig;
use crate::entity::{ActorId, Archetype, Combatant, Player};
use crate::error::{CombatError, CombatResult};
use crate::output::{CombatEvent, Event, EventLog, Intent, PlayerAction, SpawnRequest, TickReport};
use crate::projectile::{HitVolumes, ImpactKind, Projectile, ProjectileTracker};
use crate::resolver::{Battlefield, CombatResolver};
use crate::scene::{SceneHooks, SceneObject};
use crate::spawn::{self, ActorSpawn};
use crate::stats::PlayerStats;
use crate::world_view::WorldView;

// =============================================================================
// Simulation
// =============================================================================

/// Owner of all combat state and the per-tick pipeline.
///
/// `Simulation` manages:
/// - The actor roster and the player body
/// - Static geometry per scope and the active scope
/// - Projectiles in flight
/// - The combat resolver (engagement, kills, difficulty)
/// - A drainable log of everything that happened
pub struct Simulation {
    config: CombatConfig,
    arena: Arena,
    player: Player,
    collision: CollisionWorld,
    projectiles: ProjectileTracker,
    resolver: CombatResolver,
    spawn_rng: ChaCha8Rng,
    log: EventLog,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.arena.current_tick())
            .field("actors", &self.arena.len())
            .field("projectiles", &self.projectiles.len())
            .field("scope", &self.collision.active_scope())
            .field("difficulty", &self.resolver.difficulty())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates an empty simulation at tick 0 in the overworld.
    ///
    /// The player stands at the origin with the configured half-extents.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        let mut player = Player::default();
        player.half_extents = config.collision.player_half_extents;
        Self {
            arena: Arena::new(),
            player,
            collision: CollisionWorld::new(config.collision),
            projectiles: ProjectileTracker::new(),
            resolver: CombatResolver::new(config.seed),
            spawn_rng: ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1)),
            log: EventLog::new(),
            config,
        }
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advances the simulation by `dt` seconds.
    ///
    /// # Arguments
    ///
    /// * `dt` - Elapsed seconds
    /// * `actions` - Player attacks raised since the last tick, in order
    /// * `stats` - Player health and economy
    /// * `scene` - Scene graph hooks for projectile and actor visuals
    ///
    /// # Returns
    ///
    /// Everything that happened this tick, in order. The same events are also
    /// appended to the simulation's [`EventLog`].
    pub fn step(
        &mut self,
        dt: f32,
        actions: &[PlayerAction],
        stats: &mut dyn PlayerStats,
        scene: &mut dyn SceneHooks,
    ) -> TickReport {
        self.arena.advance_tick();
        let tick = self.arena.current_tick();
        let scope = self.collision.active_scope();
        let mut log = EventLog::new();

        // PHASE 1: AI
        let intents = self.think(scope, dt);

        // PHASE 2: INTEGRATE
        self.integrate(scope, dt);

        // PHASE 3: COLLIDE
        if self.collision.is_enabled() {
            self.collide(scope);
        }

        // PHASE 4: PROJECTILES
        self.launch(scope, actions, &intents, scene, &mut log);
        let projectile_hits = self.advance_projectiles(scope, dt, scene, &mut log);

        // PHASE 5: COMBAT
        for action in actions {
            let event = self
                .resolver
                .player_event(action, &self.arena, scope, &self.config);
            self.apply(&event, stats, &mut log);
        }
        for event in intents.iter().filter_map(CombatResolver::intent_event) {
            self.apply(&event, stats, &mut log);
        }
        for event in &projectile_hits {
            self.apply(event, stats, &mut log);
        }

        // PHASE 6: ROSTER
        for actor in self.arena.remove_dead() {
            scene.remove_object(SceneObject::Actor(actor.id()));
        }

        tracing::trace!(tick, events = log.len(), "tick complete");
        let events = log.take();
        self.log.extend(events.iter().cloned());
        TickReport { tick, events }
    }

    fn think(&mut self, scope: Scope, dt: f32) -> Vec<Intent> {
        let target = self.player.position();
        let ids: Vec<(ActorId, Archetype)> = self
            .arena
            .living_in(scope)
            .map(|actor| (actor.id(), actor.archetype()))
            .collect();

        let mut intents = Vec::new();
        for (id, archetype) in ids {
            let tank = if archetype == Archetype::Ranged {
                self.arena.nearest_tank_teammate(id).map(|(_, position)| position)
            } else {
                None
            };
            let Some(actor) = self.arena.get_mut(id) else {
                tracing::warn!(actor = %id, "actor vanished before thinking");
                continue;
            };
            let ctx = AiContext { target, tank, dt };
            if let Some(intent) = ai::think(actor, &ctx, &self.config) {
                intents.push(intent);
            }
        }
        intents
    }

    fn integrate(&mut self, scope: Scope, dt: f32) {
        for actor in self.arena.actors_mut() {
            if actor.scope == scope && actor.is_alive() {
                actor.transform.position += actor.velocity * dt;
            }
        }
        let push = self.player.feedback.tick(dt);
        self.player.transform.position += self.player.velocity * dt + push;
    }

    fn actor_colliders(&self, scope: Scope) -> Vec<Collider> {
        self.arena
            .living_in(scope)
            .map(|actor| {
                self.collision.build_collider(
                    ColliderOwner::Actor(actor.id()),
                    &actor.transform,
                    actor.half_extents,
                )
            })
            .collect()
    }

    fn player_collider(&self) -> Collider {
        self.collision.build_collider(
            ColliderOwner::Player,
            &self.player.transform,
            self.player.half_extents,
        )
    }

    /// Sequential push-out: the player first, then actors in id order. Each
    /// mover sees the already-resolved positions of earlier movers.
    fn collide(&mut self, scope: Scope) {
        let mut bodies = self.actor_colliders(scope);

        if self.player.collision_enabled {
            self.collision.resolve_mover(
                ColliderOwner::Player,
                &mut self.player.transform,
                self.player.half_extents,
                &bodies,
            );
            bodies.push(self.player_collider());
        }

        for index in 0..bodies.len() {
            let ColliderOwner::Actor(id) = bodies[index].owner() else {
                continue;
            };
            let Some(actor) = self.arena.get_mut(id) else {
                tracing::warn!(actor = %id, "collider owner missing, skipped");
                continue;
            };
            self.collision.resolve_mover(
                ColliderOwner::Actor(id),
                &mut actor.transform,
                actor.half_extents,
                &bodies,
            );
            bodies[index].update(&actor.transform);
        }
    }

    fn launch(
        &mut self,
        scope: Scope,
        actions: &[PlayerAction],
        intents: &[Intent],
        scene: &mut dyn SceneHooks,
        log: &mut EventLog,
    ) {
        let tuning = &self.config.projectile;
        let mut launched = Vec::new();

        for action in actions {
            if let PlayerAction::Shoot {
                origin,
                direction,
                damage,
                ..
            } = *action
            {
                let direction = direction.normalize_or_zero();
                launched.push(Projectile::new(
                    Combatant::Player,
                    origin + direction * tuning.muzzle_offset,
                    direction,
                    tuning.player_speed,
                    damage,
                    tuning.player_lifetime,
                    scope,
                ));
            }
        }
        for intent in intents {
            if let Intent::FireProjectile {
                owner,
                origin,
                direction,
                damage,
            } = *intent
            {
                launched.push(Projectile::new(
                    Combatant::Actor(owner),
                    origin,
                    direction,
                    tuning.enemy_speed,
                    damage,
                    tuning.enemy_lifetime,
                    scope,
                ));
            }
        }

        for projectile in launched {
            let owner = projectile.owner;
            let id = self.projectiles.spawn(projectile);
            scene.add_object(SceneObject::Projectile(id), scope);
            tracing::debug!(projectile = %id, %owner, "projectile fired");
            log.push(Event::ProjectileFired { id, owner });
        }
    }

    /// Moves projectiles and returns the hits on the player as attack attempts.
    fn advance_projectiles(
        &mut self,
        scope: Scope,
        dt: f32,
        scene: &mut dyn SceneHooks,
        log: &mut EventLog,
    ) -> Vec<CombatEvent> {
        let actors = self.actor_colliders(scope);
        let player = self.player_collider();
        let volumes = HitVolumes {
            player: Some(&player),
            actors: &actors,
            world: &self.collision,
        };

        let mut hits = Vec::new();
        for impact in self.projectiles.advance(dt, &volumes) {
            scene.remove_object(SceneObject::Projectile(impact.id));
            match impact.kind {
                ImpactKind::Player => {
                    if let Some(attacker) = impact.player_hit_by() {
                        hits.push(CombatResolver::contact_event(attacker, impact.position, impact.damage));
                    }
                }
                ImpactKind::Blocked(by) => {
                    tracing::debug!(projectile = %impact.id, ?by, "projectile blocked");
                    log.push(Event::ProjectileBlocked { id: impact.id, by });
                }
                ImpactKind::Expired => {
                    tracing::debug!(projectile = %impact.id, "projectile expired");
                    log.push(Event::ProjectileExpired { id: impact.id });
                }
            }
        }
        hits
    }

    fn apply(&mut self, event: &CombatEvent, stats: &mut dyn PlayerStats, log: &mut EventLog) {
        let mut field = Battlefield {
            arena: &mut self.arena,
            player: &mut self.player,
            stats,
            config: &self.config,
        };
        if let Err(err) = self.resolver.resolve(event, &mut field, log) {
            report_skip(event.attacker, &err);
        }
    }

    // =========================================================================
    // Roster
    // =========================================================================

    /// Adds an actor and its visual.
    pub fn spawn(&mut self, spawn: ActorSpawn, scene: &mut dyn SceneHooks) -> ActorId {
        let id = spawn.spawn(&mut self.arena, &self.config);
        if let Some(actor) = self.arena.get(id) {
            scene.add_object(SceneObject::Actor(id), actor.scope);
        }
        id
    }

    /// Fulfils a spawn request in the active scope.
    ///
    /// The archetype is rolled for the scope; without an explicit position the
    /// monster appears on the spawn ring around the player.
    pub fn spawn_monster(&mut self, request: SpawnRequest, scene: &mut dyn SceneHooks) -> ActorId {
        let scope = self.collision.active_scope();
        let tuning = self.config.spawn;
        let archetype = spawn::roll_archetype(&mut self.spawn_rng, scope, &tuning);
        let position = request.position.unwrap_or_else(|| {
            spawn::ring_position(&mut self.spawn_rng, self.player.position(), &tuning)
        });
        self.spawn(
            ActorSpawn::monster(archetype, scope, position, request.difficulty, &tuning),
            scene,
        )
    }

    /// Starts a fight with `id` from outside combat, e.g. a hostile dialog
    /// choice. Hostility spreads to the actor's team.
    ///
    /// # Errors
    ///
    /// Missing-reference errors if `id` is unknown or dead.
    pub fn provoke(&mut self, id: ActorId) -> CombatResult<()> {
        self.resolver
            .engage(id, &mut self.arena, &self.config, &mut self.log)
    }

    /// Calms `id` down and takes it out of the fight if it was in one.
    ///
    /// Teammates keep their hostility.
    ///
    /// # Errors
    ///
    /// Missing-reference errors if `id` is unknown or dead.
    pub fn pacify(&mut self, id: ActorId) -> CombatResult<()> {
        let changed = self.arena.set_hostile(id, false)?;
        if !changed.is_empty() {
            self.log.push(Event::HostilityChanged {
                actors: changed,
                hostile: false,
            });
        }
        if self.resolver.engagement().contains(id) {
            let from = self.player.position();
            self.resolver
                .disengage(id, &mut self.arena, from, &mut self.log)?;
        }
        Ok(())
    }

    // =========================================================================
    // Scopes and geometry
    // =========================================================================

    /// Switches the active scope.
    ///
    /// Projectiles of the old scope are dropped and any fight ends.
    pub fn set_active_scope(&mut self, scope: Scope, scene: &mut dyn SceneHooks) {
        let previous = self.collision.active_scope();
        if previous == scope {
            return;
        }
        for id in self.projectiles.clear_scope(previous) {
            scene.remove_object(SceneObject::Projectile(id));
        }
        self.resolver.end_engagement(&mut self.arena, &mut self.log);
        self.collision.set_active_scope(scope);
    }

    /// Replaces a scope's static geometry, e.g. when a dungeon is regenerated.
    ///
    /// The scope's actors and projectiles are discarded with the old layout.
    pub fn replace_scope_geometry(
        &mut self,
        scope: Scope,
        geometry: impl IntoIterator<Item = StaticGeometry>,
        scene: &mut dyn SceneHooks,
    ) -> Vec<StaticId> {
        let removed = self.arena.remove_scope_actors(scope);
        let from = self.player.position();
        self.resolver
            .forget(&removed, &mut self.arena, from, &mut self.log);
        for id in removed {
            scene.remove_object(SceneObject::Actor(id));
        }
        for id in self.projectiles.clear_scope(scope) {
            scene.remove_object(SceneObject::Projectile(id));
        }
        self.collision.replace_statics(scope, geometry)
    }

    /// Enables or disables all body collision.
    pub fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision.set_enabled(enabled);
    }

    /// Enables or disables collision for the player only.
    pub fn set_player_collision(&mut self, enabled: bool) {
        self.player.collision_enabled = enabled;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the current tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    /// Balance constants.
    #[must_use]
    pub const fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Actor roster.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable roster, for setup between ticks.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Player body.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable player body; the controller writes position and velocity here.
    #[must_use]
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Static geometry and the active scope.
    #[must_use]
    pub const fn collision(&self) -> &CollisionWorld {
        &self.collision
    }

    /// Mutable collision world, for registering statics.
    #[must_use]
    pub fn collision_mut(&mut self) -> &mut CollisionWorld {
        &mut self.collision
    }

    /// Projectiles in flight.
    #[must_use]
    pub const fn projectiles(&self) -> &ProjectileTracker {
        &self.projectiles
    }

    /// Engagement, kill counter and difficulty.
    #[must_use]
    pub const fn resolver(&self) -> &CombatResolver {
        &self.resolver
    }

    /// Current global difficulty.
    #[must_use]
    pub const fn difficulty(&self) -> u32 {
        self.resolver.difficulty()
    }

    /// Read-only view for the renderer.
    #[must_use]
    pub fn view(&self) -> WorldView<'_> {
        WorldView::new(
            &self.arena,
            &self.player,
            &self.projectiles,
            self.collision.active_scope(),
        )
    }

    /// Every event recorded so far, oldest first.
    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.log
    }

    /// Drains the event log.
    pub fn take_events(&mut self) -> Vec<Event> {
        self.log.take()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

fn report_skip(attacker: Combatant, err: &CombatError) {
    if err.is_missing_reference() {
        tracing::warn!(%attacker, error = %err, "combat event skipped");
    } else {
        tracing::debug!(%attacker, error = %err, "attack missed");
    }
}

// =============================================================================
// Tests
// =============================================================================
