//! Batch tick driver.
//!
//! [`CompanionRuntime`] owns every companion together with its controller and
//! all host collaborators. Each [`CompanionRuntime::tick`] opens one
//! [`SchedulingBatch`], ticks every companion through it, then applies the
//! host-side consequences (arrivals, follow movement, despawns).
use std::collections::BTreeMap;

use companion_core::{
    AbilityId, Companion, CompanionController, CompanionEnv, ControllerConfig, EntityId,
    GroupId, MovementKind, Position, SchedulingBatch, TickOutcome, UnitInfo, WorldOracle,
};
use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::drivers::{CombatRecorder, MovementRecorder};
use crate::error::{Result, RuntimeError};
use crate::ledger::CompanionLedger;
use crate::oracle::{AbilityCatalogue, StdRngOracle, World};
use crate::outbox::PacketOutbox;

/// A companion and the controller driving it.
#[derive(Clone, Debug)]
pub struct CompanionSlot {
    pub companion: Companion,
    pub controller: CompanionController,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub elapsed_ms: u32,
    pub updated: usize,
    pub deferred: usize,
    pub dead: usize,
    pub dismissed: usize,
    /// Owners that drew a shared jitter in this batch.
    pub owners_drawn: usize,
    pub despawned: Vec<EntityId>,
}

impl TickReport {
    fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Updated => self.updated += 1,
            TickOutcome::Deferred => self.deferred += 1,
            TickOutcome::Dead => self.dead += 1,
            TickOutcome::Dismissed => self.dismissed += 1,
        }
    }
}

pub struct CompanionRuntime {
    config: RuntimeConfig,
    world: World,
    abilities: AbilityCatalogue,
    movement: MovementRecorder,
    combat: CombatRecorder,
    ledger: CompanionLedger,
    outbox: PacketOutbox,
    rng: StdRngOracle,
    companions: BTreeMap<EntityId, CompanionSlot>,
    clock_ms: u64,
}

impl CompanionRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn abilities(&self) -> &AbilityCatalogue {
        &self.abilities
    }

    pub fn movement(&self) -> &MovementRecorder {
        &self.movement
    }

    pub fn movement_mut(&mut self) -> &mut MovementRecorder {
        &mut self.movement
    }

    pub fn combat(&self) -> &CombatRecorder {
        &self.combat
    }

    pub fn ledger(&self) -> &CompanionLedger {
        &self.ledger
    }

    pub fn outbox(&self) -> &PacketOutbox {
        &self.outbox
    }

    pub fn outbox_mut(&mut self) -> &mut PacketOutbox {
        &mut self.outbox
    }

    pub fn companion(&self, id: EntityId) -> Option<&Companion> {
        self.companions.get(&id).map(|slot| &slot.companion)
    }

    pub fn companion_mut(&mut self, id: EntityId) -> Option<&mut Companion> {
        self.companions.get_mut(&id).map(|slot| &mut slot.companion)
    }

    pub fn controller(&self, id: EntityId) -> Option<&CompanionController> {
        self.companions.get(&id).map(|slot| &slot.controller)
    }

    pub fn companion_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.companions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.companions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companions.is_empty()
    }

    /// Adds a non-companion unit such as a player.
    pub fn spawn_unit(&mut self, unit: UnitInfo) -> Result<()> {
        self.world.add_unit(unit)
    }

    /// Adds a companion with a fresh controller. It starts autonomous.
    pub fn spawn_companion(&mut self, companion: Companion) -> Result<EntityId> {
        let id = companion.id;
        if companion.template.entry < ControllerConfig::MIN_COMPANION_ENTRY {
            return Err(RuntimeError::NotACompanion {
                id,
                entry: companion.template.entry,
            });
        }
        if self.companions.contains_key(&id) || self.world.unit(id).is_some() {
            return Err(RuntimeError::DuplicateEntity(id));
        }

        self.world.sync_companion(&companion);
        let controller = CompanionController::new(self.config.controller.clone());
        self.companions.insert(
            id,
            CompanionSlot {
                companion,
                controller,
            },
        );
        debug!(companion = %id, "companion spawned");
        Ok(id)
    }

    /// Binds `companion` to `owner` and starts following.
    ///
    /// The companion takes the owner's faction, becomes player-controlled and
    /// joins the owner's group if the owner has one.
    pub fn hire(&mut self, owner: EntityId, companion: EntityId) -> Result<()> {
        let owner_unit = self
            .world
            .unit(owner)
            .ok_or(RuntimeError::UnknownEntity(owner))?;
        if !self.companions.contains_key(&companion) {
            return Err(RuntimeError::UnknownCompanion(companion));
        }
        self.ledger.register(owner, companion)?;

        let result = self.with_slot(companion, |slot, env| {
            slot.companion.player_controlled = true;
            slot.controller.set_owner(Some(owner));
            slot.controller.start_follow(
                &mut slot.companion,
                owner,
                Some(owner_unit.faction),
                env,
            )
        })?;
        if let Err(err) = result {
            self.release(companion)?;
            return Err(err.into());
        }

        if let Some(group) = owner_unit.group {
            self.world.join_group(group, companion)?;
        }
        self.sync(companion);
        info!(%owner, %companion, "companion hired");
        Ok(())
    }

    /// Releases a companion through its controller. Returns false if it was
    /// already dismissed.
    pub fn dismiss(&mut self, companion: EntityId) -> Result<bool> {
        let dismissed = self.with_slot(companion, |slot, env| {
            slot.controller.dismiss(&mut slot.companion, env)
        })?;
        self.reap();
        Ok(dismissed)
    }

    /// Kills a companion and notifies its controller.
    pub fn kill(&mut self, companion: EntityId) -> Result<()> {
        self.with_slot(companion, |slot, env| {
            slot.companion.alive = false;
            slot.companion.health.current = 0;
            slot.controller.just_died(&mut slot.companion, env);
        })?;
        self.sync(companion);
        self.reap();
        Ok(())
    }

    pub fn respawn(&mut self, companion: EntityId) -> Result<()> {
        self.with_slot(companion, |slot, env| {
            slot.companion.alive = true;
            slot.companion.health.current = slot.companion.health.maximum;
            slot.controller.just_respawned(&mut slot.companion, env);
        })?;
        self.sync(companion);
        Ok(())
    }

    pub fn evade(&mut self, companion: EntityId) -> Result<()> {
        self.with_slot(companion, |slot, env| {
            slot.controller.evade(&mut slot.companion, env)
        })?;
        self.sync(companion);
        Ok(())
    }

    /// Shows unit `who` to the companion.
    pub fn reveal(&mut self, companion: EntityId, who: EntityId) -> Result<()> {
        let unit = self.world.unit(who).ok_or(RuntimeError::UnknownEntity(who))?;
        self.with_slot(companion, |slot, env| {
            slot.controller
                .move_in_line_of_sight(&mut slot.companion, &unit, env)
        })?;
        self.sync(companion);
        Ok(())
    }

    /// Teaches the highest rank of `base` the companion's level allows.
    pub fn learn(&mut self, companion: EntityId, base: AbilityId) -> Result<AbilityId> {
        self.with_slot(companion, |slot, env| {
            slot.controller
                .init_ability(&slot.companion, base, false, true, env);
            slot.controller.ability_id(base)
        })
    }

    /// Casts `base` if it is ready and starts its cooldown. Returns the rank
    /// cast, or `None` when not ready.
    pub fn cast(
        &mut self,
        companion: EntityId,
        base: AbilityId,
        cooldown_ms: u32,
    ) -> Result<Option<AbilityId>> {
        self.with_slot(companion, |slot, env| {
            if !slot.controller.is_ability_ready(base, 0) {
                return None;
            }
            let rank = slot.controller.ability_id(base);
            slot.controller
                .set_ability_cooldown(&slot.companion, base, cooldown_ms, env);
            slot.controller
                .on_ability_cast(&mut slot.companion, rank, true, env);
            Some(rank)
        })
    }

    /// Advances every companion by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u32) -> TickReport {
        self.clock_ms += u64::from(elapsed_ms);
        self.deliver_arrivals();

        let mut report = TickReport {
            elapsed_ms,
            ..TickReport::default()
        };
        let mut batch = SchedulingBatch::new(&mut self.rng);
        for slot in self.companions.values_mut() {
            let mut env = CompanionEnv::new(
                &self.world,
                &self.abilities,
                &mut self.movement,
                &mut self.combat,
                &mut self.ledger,
                &mut self.outbox,
            );
            let outcome = slot
                .controller
                .tick(&mut slot.companion, elapsed_ms, &mut env, &mut batch);
            report.record(outcome);
        }
        report.owners_drawn = batch.owners_drawn();
        drop(batch);

        self.advance_followers();
        let ids: Vec<EntityId> = self.companions.keys().copied().collect();
        for id in ids {
            self.sync(id);
        }
        report.despawned = self.reap();
        report
    }

    /// Ticks with the configured tick length.
    pub fn step(&mut self) -> TickReport {
        self.tick(self.config.tick_ms)
    }

    fn with_slot<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut CompanionSlot, &mut CompanionEnv<'_>) -> R,
    ) -> Result<R> {
        let slot = self
            .companions
            .get_mut(&id)
            .ok_or(RuntimeError::UnknownCompanion(id))?;
        let mut env = CompanionEnv::new(
            &self.world,
            &self.abilities,
            &mut self.movement,
            &mut self.combat,
            &mut self.ledger,
            &mut self.outbox,
        );
        Ok(f(slot, &mut env))
    }

    fn release(&mut self, companion: EntityId) -> Result<()> {
        self.with_slot(companion, |slot, env| {
            slot.controller.set_owner(None);
            env.registry().dismiss(&mut slot.companion);
        })?;
        // a failed hire must not despawn the companion
        self.ledger.take_despawns();
        Ok(())
    }

    /// Completes point moves queued during the previous tick.
    fn deliver_arrivals(&mut self) {
        for (id, point_id, destination) in self.movement.take_arrivals() {
            let delivered = self.with_slot(id, |slot, env| {
                slot.companion.position = destination;
                slot.controller.movement_inform(
                    &mut slot.companion,
                    MovementKind::Point,
                    point_id,
                    env,
                );
            });
            if delivered.is_ok() {
                self.sync(id);
            }
        }
    }

    /// Following companions keep pace with leaders on the same map.
    fn advance_followers(&mut self) {
        let distance = self.config.controller.follow_distance;
        for slot in self.companions.values_mut() {
            let Some(leader) = self.movement.follow_target(slot.companion.id) else {
                continue;
            };
            let Some(leader) = self.world.unit(leader) else {
                continue;
            };
            if leader.position.map != slot.companion.position.map {
                continue;
            }
            slot.companion.position = Position {
                x: leader.position.x - distance,
                ..leader.position
            };
        }
    }

    fn sync(&mut self, id: EntityId) {
        if let Some(slot) = self.companions.get(&id) {
            self.world.sync_companion(&slot.companion);
        }
    }

    /// Removes released companions from the simulation.
    fn reap(&mut self) -> Vec<EntityId> {
        let despawned = self.ledger.take_despawns();
        for &id in &despawned {
            self.companions.remove(&id);
            self.world.remove_unit(id);
            self.movement.forget(id);
            self.combat.forget(id);
            debug!(companion = %id, "companion despawned");
        }
        despawned
    }

    /// Group of the companion's owner, if both exist.
    pub fn owner_group(&self, companion: EntityId) -> Option<GroupId> {
        let owner = self.ledger.owner_of(companion)?;
        self.world.unit(owner)?.group
    }
}

pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<World>,
    abilities: Option<AbilityCatalogue>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
            abilities: None,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Start from an existing world instead of an empty one.
    pub fn world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    pub fn abilities(mut self, abilities: AbilityCatalogue) -> Self {
        self.abilities = Some(abilities);
        self
    }

    pub fn build(self) -> CompanionRuntime {
        CompanionRuntime {
            rng: StdRngOracle::new(self.config.seed),
            config: self.config,
            world: self.world.unwrap_or_default(),
            abilities: self.abilities.unwrap_or_default(),
            movement: MovementRecorder::new(),
            combat: CombatRecorder::new(),
            ledger: CompanionLedger::new(),
            outbox: PacketOutbox::new(),
            companions: BTreeMap::new(),
            clock_ms: 0,
        }
    }
}
