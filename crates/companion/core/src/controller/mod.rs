//! Per-companion controller.
//!
//! [`CompanionController::tick`] is the single per-tick entry point. Within a
//! tick the stages run in a fixed order and each may end the tick early:
//!
//! 1. cooldowns count down
//! 2. follower logic (may dismiss)
//! 3. group status broadcast
//! 4. death check
//! 5. full-update scheduling (may defer)
//! 6. regeneration over the time since the last full update
//! 7. combat decisions
//!
//! Event hooks (`movement_inform`, `just_died`, `evade`, ...) are called by
//! the host as the events happen.
mod combat;
mod follow;

use tracing::{debug, trace};

use crate::config::ControllerConfig;
use crate::cooldown::CooldownTable;
use crate::env::{AbilityId, CompanionEnv};
use crate::error::report;
use crate::regen::{RegenContext, Regenerator};
use crate::schedule::{Assignment, SchedulingBatch, UpdateScheduler};
use crate::state::{Companion, EntityId, FollowError, FollowState, Position};

/// How far a tick got.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum TickOutcome {
    /// The companion has been dismissed; nothing ran.
    Dismissed,
    /// Bookkeeping ran but the companion is dead.
    Dead,
    /// Bookkeeping ran; the full update is not due yet.
    Deferred,
    /// Full update ran.
    Updated,
}

#[derive(Clone, Debug)]
pub struct CompanionController {
    config: ControllerConfig,
    owner: Option<EntityId>,
    leader: Option<EntityId>,
    follow: FollowState,
    combat_start: Option<Position>,
    combat_movement: bool,
    dismissed: bool,
    follower_timer_ms: u32,
    group_update_elapsed_ms: u32,
    cooldowns: CooldownTable,
    regen: Regenerator,
    scheduler: UpdateScheduler,
}

impl CompanionController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            follower_timer_ms: config.initial_follower_check_ms,
            config,
            owner: None,
            leader: None,
            follow: FollowState::NONE,
            combat_start: None,
            combat_movement: true,
            dismissed: false,
            group_update_elapsed_ms: 0,
            cooldowns: CooldownTable::new(),
            regen: Regenerator::new(),
            scheduler: UpdateScheduler::new(),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Option<EntityId>) {
        self.owner = owner;
    }

    /// True when no owner controls the companion.
    pub fn is_autonomous(&self) -> bool {
        self.owner.is_none()
    }

    pub fn leader(&self) -> Option<EntityId> {
        self.leader
    }

    pub fn follow_state(&self) -> FollowState {
        self.follow
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    pub fn combat_movement(&self) -> bool {
        self.combat_movement
    }

    pub fn set_combat_movement(&mut self, allowed: bool) {
        self.combat_movement = allowed;
    }

    pub fn cooldowns(&self) -> &CooldownTable {
        &self.cooldowns
    }

    pub fn regenerator(&self) -> &Regenerator {
        &self.regen
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    pub fn tick(
        &mut self,
        companion: &mut Companion,
        elapsed_ms: u32,
        env: &mut CompanionEnv<'_>,
        batch: &mut SchedulingBatch<'_>,
    ) -> TickOutcome {
        if self.dismissed {
            return TickOutcome::Dismissed;
        }

        self.cooldowns.reduce_all(elapsed_ms);

        self.update_follower(companion, elapsed_ms, env);
        if self.dismissed {
            return TickOutcome::Dismissed;
        }

        self.group_update_elapsed_ms = self.group_update_elapsed_ms.saturating_add(elapsed_ms);
        let interval = self.config.group_update_interval_ms;
        if self.group_update_elapsed_ms >= interval {
            self.group_update_elapsed_ms %= interval.max(1);
            self.broadcast_status(companion, env);
        }

        if !companion.alive {
            return TickOutcome::Dead;
        }

        let assignment = self.assignment(companion, env);
        if let Assignment::Owned {
            owner,
            owner_in_world: false,
            ..
        } = assignment
        {
            report(companion.id, &FollowError::OwnerAway(owner));
        }
        if self
            .scheduler
            .should_defer(elapsed_ms, &assignment, batch, &self.config.scheduler)
        {
            trace!(
                companion = %companion.id,
                wait_ms = self.scheduler.wait_timer_ms(),
                "full update deferred"
            );
            return TickOutcome::Deferred;
        }

        let window = self.scheduler.take_window();
        let ctx = RegenContext {
            autonomous: self.is_autonomous(),
            engaged: env.combat().is_engaged(companion),
        };
        self.regen
            .regenerate(companion, window, ctx, &self.config.regen);

        if env.combat().select_victim(companion) {
            env.combat().attack_if_ready(companion);
        }
        TickOutcome::Updated
    }

    fn assignment(&self, companion: &Companion, env: &mut CompanionEnv<'_>) -> Assignment {
        match self.owner {
            None => Assignment::Autonomous {
                engaged: env.combat().is_engaged(companion),
            },
            Some(owner) => {
                let unit = env.world().unit(owner);
                Assignment::Owned {
                    owner,
                    owner_in_world: unit.as_ref().is_some_and(|unit| unit.in_world),
                    companion_count: env.registry().companion_count(owner),
                    mass_group: unit.is_some_and(|unit| unit.in_raid),
                }
            }
        }
    }

    // ===== ability bookkeeping =====

    /// Creates or refreshes the cooldown entry for `base`. Unknown ids are
    /// logged and ignored.
    pub fn init_ability(
        &mut self,
        companion: &Companion,
        base: AbilityId,
        force_add: bool,
        forward_rank: bool,
        env: &CompanionEnv<'_>,
    ) {
        if let Err(err) =
            self.cooldowns
                .init(base, force_add, forward_rank, companion.level, env.abilities())
        {
            report(companion.id, &err);
        }
    }

    pub fn set_ability_cooldown(
        &mut self,
        companion: &Companion,
        base: AbilityId,
        cooldown_ms: u32,
        env: &CompanionEnv<'_>,
    ) {
        if let Err(err) =
            self.cooldowns
                .set_cooldown(base, cooldown_ms, companion.level, env.abilities())
        {
            report(companion.id, &err);
        }
    }

    pub fn reduce_ability_cooldown(&mut self, base: AbilityId, elapsed_ms: u32) {
        self.cooldowns.reduce(base, elapsed_ms);
    }

    pub fn is_ability_ready(&self, base: AbilityId, elapsed_ms: u32) -> bool {
        self.cooldowns
            .is_ready(base, elapsed_ms, self.is_autonomous())
    }

    /// Rank to cast for `base`, or [`AbilityId::NONE`].
    pub fn ability_id(&self, base: AbilityId) -> AbilityId {
        self.cooldowns.resolved_id(base, self.is_autonomous())
    }

    pub fn set_ability_enabled(&mut self, base: AbilityId, enabled: bool) -> bool {
        self.cooldowns.set_enabled(base, enabled)
    }

    /// Maximum range of `ability` against a hostile or friendly target.
    pub fn ability_max_range(
        &self,
        ability: AbilityId,
        hostile: bool,
        env: &CompanionEnv<'_>,
    ) -> Option<f32> {
        env.abilities()
            .ability(ability)
            .map(|info| info.max_range(hostile))
    }

    /// Cast completion reported by the host.
    pub fn on_ability_cast(
        &mut self,
        companion: &mut Companion,
        ability: AbilityId,
        ok: bool,
        env: &mut CompanionEnv<'_>,
    ) {
        if ok && companion.can_attack_on_vehicle() {
            env.combat().on_ability_cast(companion, ability);
        } else {
            debug!(companion = %companion.id, %ability, ok, "cast not forwarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{PcgRng, UnitInfo};
    use crate::state::{CompanionTemplate, GroupId, PowerKind, ResourceMeter};
    use crate::testing::{FakeAbilities, Harness};

    const OWNER: EntityId = EntityId(1);
    const COMPANION: EntityId = EntityId(100);
    const PARTY: GroupId = GroupId(9);

    fn companion() -> Companion {
        Companion::new(COMPANION, "Tamsin", CompanionTemplate::default())
            .with_level(60)
            .with_health(ResourceMeter::new(1500, 2400))
            .with_power(PowerKind::Energy, ResourceMeter::new(0, 100))
    }

    /// Owner with a party containing the owner and the companion.
    fn grouped_harness() -> Harness {
        let mut harness = Harness::default();
        let mut owner = UnitInfo::player(OWNER, Position::default());
        owner.group = Some(PARTY);
        harness.world.add(owner);
        harness.world.groups.entry(PARTY).or_default().push(COMPANION);
        harness.registry.counts.insert(OWNER, 1);
        harness.registry.registered.insert(COMPANION);
        harness
    }

    fn owned_controller(harness: &mut Harness, companion: &mut Companion) -> CompanionController {
        let mut controller = CompanionController::new(ControllerConfig::default());
        controller.set_owner(Some(OWNER));
        controller
            .start_follow(companion, OWNER, None, &mut harness.env())
            .unwrap();
        controller
    }

    #[test]
    fn broadcasts_once_per_interval_with_current_health() {
        let mut harness = grouped_harness();
        let mut companion = companion();
        let mut controller = owned_controller(&mut harness, &mut companion);
        let mut rng = PcgRng::new(11);

        for _ in 0..5 {
            let mut batch = SchedulingBatch::new(&mut rng);
            controller.tick(&mut companion, 100, &mut harness.env(), &mut batch);
        }

        assert_eq!(harness.broadcast.stats.len(), 1);
        let (recipient, stats) = &harness.broadcast.stats[0];
        assert_eq!(*recipient, OWNER);
        assert_eq!(stats.health, companion.health.current);
        assert_eq!(stats.max_health, 2400);
    }

    #[test]
    fn broadcast_skips_sibling_companions() {
        let mut harness = grouped_harness();
        let mut sibling = UnitInfo::new(EntityId(101), Position::default());
        sibling.player_controlled = true;
        sibling.group = Some(PARTY);
        harness.world.add(sibling);
        let mut companion = companion();
        let mut controller = owned_controller(&mut harness, &mut companion);
        let mut rng = PcgRng::new(13);

        let mut batch = SchedulingBatch::new(&mut rng);
        controller.tick(&mut companion, 500, &mut harness.env(), &mut batch);

        let recipients: Vec<EntityId> = harness.broadcast.stats.iter().map(|(id, _)| *id).collect();
        assert_eq!(recipients, vec![OWNER]);
    }

    #[test]
    fn no_broadcast_when_companion_left_the_group() {
        let mut harness = grouped_harness();
        harness.world.groups.insert(PARTY, vec![OWNER]);
        let mut companion = companion();
        let mut controller = owned_controller(&mut harness, &mut companion);
        let mut rng = PcgRng::new(12);

        let mut batch = SchedulingBatch::new(&mut rng);
        controller.tick(&mut companion, 1000, &mut harness.env(), &mut batch);

        assert!(harness.broadcast.stats.is_empty());
    }

    #[test]
    fn dead_companion_skips_full_update() {
        let mut harness = grouped_harness();
        let mut companion = companion();
        companion.alive = false;
        let mut controller = CompanionController::new(ControllerConfig::default());
        let mut rng = PcgRng::new(13);

        let mut batch = SchedulingBatch::new(&mut rng);
        let outcome = controller.tick(&mut companion, 100, &mut harness.env(), &mut batch);

        assert_eq!(outcome, TickOutcome::Dead);
        assert_eq!(batch.owners_drawn(), 0);
        assert_eq!(companion.current_power().current, 0);
    }

    #[test]
    fn deferred_time_reaches_the_regenerator() {
        let mut harness = grouped_harness();
        let mut companion = companion();
        let mut controller = owned_controller(&mut harness, &mut companion);
        let mut rng = PcgRng::new(14);

        let mut updates = 0;
        for _ in 0..100 {
            let mut batch = SchedulingBatch::new(&mut rng);
            if controller.tick(&mut companion, 10, &mut harness.env(), &mut batch)
                == TickOutcome::Updated
            {
                updates += 1;
            }
        }

        assert!(updates < 100);
        // 1000 ms at 10 energy per second, minus whatever is still pending
        let pending = controller.scheduler().pending_ms();
        let gained = companion.current_power().current;
        assert!((i64::from(gained) - i64::from((1000 - pending) / 100)).abs() <= 1);
    }

    #[test]
    fn absent_owner_defers_everything() {
        let mut harness = grouped_harness();
        harness.world.unit_mut(OWNER).in_world = false;
        let mut companion = companion();
        let mut controller = owned_controller(&mut harness, &mut companion);
        let mut rng = PcgRng::new(15);

        let mut batch = SchedulingBatch::new(&mut rng);
        let outcome = controller.tick(&mut companion, 100, &mut harness.env(), &mut batch);

        assert_eq!(outcome, TickOutcome::Deferred);
    }

    #[test]
    fn full_update_attacks_when_a_victim_is_selected() {
        let mut harness = Harness::default();
        harness.combat.has_victim = true;
        let mut companion = companion();
        let mut controller = CompanionController::new(ControllerConfig::default());
        let mut rng = PcgRng::new(16);

        let mut batch = SchedulingBatch::new(&mut rng);
        let outcome = controller.tick(&mut companion, 100, &mut harness.env(), &mut batch);

        assert_eq!(outcome, TickOutcome::Updated);
        assert_eq!(harness.combat.attacks, 1);
    }

    #[test]
    fn disabled_ability_is_usable_only_without_owner() {
        let mut harness = Harness::default();
        harness.abilities = FakeAbilities::default().with_chain(&[(48, 1), (49, 40)]);
        let companion = companion();
        let mut controller = CompanionController::new(ControllerConfig::default());

        controller.init_ability(&companion, AbilityId(48), false, true, &harness.env());
        controller.set_ability_enabled(AbilityId(48), false);
        assert_eq!(controller.ability_id(AbilityId(48)), AbilityId(49));

        controller.set_owner(Some(OWNER));
        assert_eq!(controller.ability_id(AbilityId(48)), AbilityId::NONE);
        assert!(!controller.is_ability_ready(AbilityId(48), 0));
    }

    #[test]
    fn ability_range_comes_from_metadata() {
        let mut harness = Harness::default();
        harness.abilities = FakeAbilities::default().with_chain(&[(48, 1)]);
        let controller = CompanionController::new(ControllerConfig::default());

        let env = harness.env();
        assert_eq!(controller.ability_max_range(AbilityId(48), true, &env), Some(30.0));
        assert_eq!(controller.ability_max_range(AbilityId(48), false, &env), Some(40.0));
        assert_eq!(controller.ability_max_range(AbilityId(7), true, &env), None);
    }

    #[test]
    fn cast_is_forwarded_only_when_seat_allows_attacking() {
        let mut harness = Harness::default();
        let mut companion = companion();
        let mut controller = CompanionController::new(ControllerConfig::default());

        controller.on_ability_cast(&mut companion, AbilityId(5), false, &mut harness.env());
        controller.on_ability_cast(&mut companion, AbilityId(6), true, &mut harness.env());
        companion.vehicle = Some(crate::state::VehicleSeat {
            seat_id: 1,
            can_attack: false,
        });
        controller.on_ability_cast(&mut companion, AbilityId(7), true, &mut harness.env());

        assert_eq!(harness.combat.casts, vec![AbilityId(6)]);
    }
}
