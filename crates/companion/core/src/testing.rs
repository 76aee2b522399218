//! In-memory collaborators for unit tests.

use std::collections::{HashMap, HashSet};

use crate::env::{
    AbilityId, AbilityInfo, AbilityOracle, CombatDriver, CompanionEnv, CompanionRegistry,
    GroupBroadcast, MovementDriver, MovementKind, UnitInfo, WorldOracle,
};
use crate::packet::PartyMemberStats;
use crate::state::{Companion, EntityId, GroupId, Position};

#[derive(Default)]
pub(crate) struct FakeWorld {
    pub units: HashMap<EntityId, UnitInfo>,
    pub groups: HashMap<GroupId, Vec<EntityId>>,
    pub blocked_sight: bool,
}

impl FakeWorld {
    pub fn add(&mut self, unit: UnitInfo) {
        if let Some(group) = unit.group {
            self.groups.entry(group).or_default().push(unit.id);
        }
        self.units.insert(unit.id, unit);
    }

    pub fn unit_mut(&mut self, id: EntityId) -> &mut UnitInfo {
        self.units.get_mut(&id).expect("unit registered")
    }
}

impl WorldOracle for FakeWorld {
    fn unit(&self, id: EntityId) -> Option<UnitInfo> {
        self.units.get(&id).cloned()
    }

    fn group_members(&self, group: GroupId) -> Vec<EntityId> {
        self.groups.get(&group).cloned().unwrap_or_default()
    }

    fn in_line_of_sight(&self, _from: &Position, _to: &Position) -> bool {
        !self.blocked_sight
    }

    fn is_friendly(&self, faction: u32, other: u32) -> bool {
        faction == other
    }
}

#[derive(Default)]
pub(crate) struct FakeAbilities {
    abilities: HashMap<AbilityId, AbilityInfo>,
}

impl FakeAbilities {
    /// Registers a rank chain given as `(id, base_level)` pairs, lowest rank first.
    pub fn with_chain(mut self, ranks: &[(u32, u8)]) -> Self {
        for (i, &(id, base_level)) in ranks.iter().enumerate() {
            self.abilities.insert(
                AbilityId(id),
                AbilityInfo {
                    id: AbilityId(id),
                    base_level,
                    next_rank: ranks.get(i + 1).map(|&(next, _)| AbilityId(next)),
                    max_range_hostile: 30.0,
                    max_range_friendly: 40.0,
                },
            );
        }
        self
    }
}

impl AbilityOracle for FakeAbilities {
    fn ability(&self, id: AbilityId) -> Option<AbilityInfo> {
        self.abilities.get(&id).cloned()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum MoveCall {
    Follow(EntityId),
    Point(u32, Position),
    Home,
    Chase(EntityId),
    Clear,
    Stop,
}

#[derive(Default)]
pub(crate) struct FakeMovement {
    pub calls: Vec<MoveCall>,
    pub kind: MovementKind,
}

impl MovementDriver for FakeMovement {
    fn move_follow(&mut self, _companion: EntityId, leader: EntityId, _distance: f32, _angle: f32) {
        self.calls.push(MoveCall::Follow(leader));
        self.kind = MovementKind::Follow;
    }

    fn move_point(&mut self, _companion: EntityId, point_id: u32, destination: Position) {
        self.calls.push(MoveCall::Point(point_id, destination));
        self.kind = MovementKind::Point;
    }

    fn move_home(&mut self, _companion: EntityId) {
        self.calls.push(MoveCall::Home);
        self.kind = MovementKind::Home;
    }

    fn move_chase(&mut self, _companion: EntityId, target: EntityId) {
        self.calls.push(MoveCall::Chase(target));
        self.kind = MovementKind::Chase;
    }

    fn clear(&mut self, _companion: EntityId) {
        self.calls.push(MoveCall::Clear);
        self.kind = MovementKind::Idle;
    }

    fn stop(&mut self, _companion: EntityId) {
        self.calls.push(MoveCall::Stop);
    }

    fn current_kind(&self, _companion: EntityId) -> MovementKind {
        self.kind
    }
}

pub(crate) struct FakeCombat {
    pub engaged: bool,
    pub accept_engage: bool,
    pub can_start: bool,
    pub has_victim: bool,
    pub engaged_targets: Vec<EntityId>,
    pub disengages: usize,
    pub resets: usize,
    pub attacks: usize,
    pub casts: Vec<AbilityId>,
}

impl Default for FakeCombat {
    fn default() -> Self {
        Self {
            engaged: false,
            accept_engage: true,
            can_start: false,
            has_victim: false,
            engaged_targets: Vec::new(),
            disengages: 0,
            resets: 0,
            attacks: 0,
            casts: Vec::new(),
        }
    }
}

impl CombatDriver for FakeCombat {
    fn is_engaged(&self, _companion: &Companion) -> bool {
        self.engaged
    }

    fn engage(&mut self, companion: &mut Companion, target: EntityId) -> bool {
        if !self.accept_engage {
            return false;
        }
        self.engaged = true;
        self.engaged_targets.push(target);
        companion.victim = Some(target);
        true
    }

    fn disengage(&mut self, companion: &mut Companion) {
        self.engaged = false;
        self.disengages += 1;
        companion.victim = None;
    }

    fn can_start_attack(&self, _companion: &Companion, _target: &UnitInfo) -> bool {
        self.can_start
    }

    fn select_victim(&mut self, _companion: &mut Companion) -> bool {
        self.has_victim
    }

    fn attack_if_ready(&mut self, _companion: &mut Companion) {
        self.attacks += 1;
    }

    fn reset(&mut self, _companion: &mut Companion) {
        self.resets += 1;
    }

    fn on_ability_cast(&mut self, _companion: &mut Companion, ability: AbilityId) {
        self.casts.push(ability);
    }
}

#[derive(Default)]
pub(crate) struct FakeRegistry {
    pub counts: HashMap<EntityId, usize>,
    pub registered: HashSet<EntityId>,
    pub dismissals: Vec<EntityId>,
}

impl CompanionRegistry for FakeRegistry {
    fn companion_count(&self, owner: EntityId) -> usize {
        self.counts.get(&owner).copied().unwrap_or(0)
    }

    fn dismiss(&mut self, companion: &mut Companion) -> bool {
        self.dismissals.push(companion.id);
        companion.player_controlled = false;
        self.registered.remove(&companion.id)
    }
}

#[derive(Default)]
pub(crate) struct FakeBroadcast {
    pub stats: Vec<(EntityId, PartyMemberStats)>,
    pub group_updates: Vec<GroupId>,
}

impl GroupBroadcast for FakeBroadcast {
    fn send_member_stats(&mut self, recipient: EntityId, stats: &PartyMemberStats) {
        self.stats.push((recipient, stats.clone()));
    }

    fn send_group_update(&mut self, group: GroupId) {
        self.group_updates.push(group);
    }
}

/// One of each fake, borrowed together as a [`CompanionEnv`].
#[derive(Default)]
pub(crate) struct Harness {
    pub world: FakeWorld,
    pub abilities: FakeAbilities,
    pub movement: FakeMovement,
    pub combat: FakeCombat,
    pub registry: FakeRegistry,
    pub broadcast: FakeBroadcast,
}

impl Harness {
    pub fn env(&mut self) -> CompanionEnv<'_> {
        CompanionEnv::new(
            &self.world,
            &self.abilities,
            &mut self.movement,
            &mut self.combat,
            &mut self.registry,
            &mut self.broadcast,
        )
    }
}
