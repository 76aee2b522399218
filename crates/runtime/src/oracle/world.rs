use std::collections::{HashMap, HashSet};

use companion_core::{Companion, EntityId, GroupId, Position, UnitInfo, WorldOracle};
use tracing::debug;

use crate::error::{Result, RuntimeError};

/// A party or raid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    /// Members in join order.
    pub members: Vec<EntityId>,
    pub raid: bool,
}

/// Units and groups known to the host.
///
/// There is no terrain: line of sight only requires both points to be on the
/// same map.
#[derive(Clone, Debug, Default)]
pub struct World {
    units: HashMap<EntityId, UnitInfo>,
    groups: HashMap<GroupId, Group>,
    alliances: HashSet<(u32, u32)>,
    next_group: u32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, unit: UnitInfo) -> Result<()> {
        if self.units.contains_key(&unit.id) {
            return Err(RuntimeError::DuplicateEntity(unit.id));
        }
        self.units.insert(unit.id, unit);
        Ok(())
    }

    /// Removes a unit and its group membership.
    pub fn remove_unit(&mut self, id: EntityId) -> Option<UnitInfo> {
        self.leave_group(id);
        self.units.remove(&id)
    }

    pub fn unit_mut(&mut self, id: EntityId) -> Result<&mut UnitInfo> {
        self.units.get_mut(&id).ok_or(RuntimeError::UnknownEntity(id))
    }

    pub fn move_unit(&mut self, id: EntityId, position: Position) -> Result<()> {
        self.unit_mut(id)?.position = position;
        Ok(())
    }

    /// Mirrors a companion's current state into its unit record, creating it
    /// on first use. Group membership is kept.
    pub fn sync_companion(&mut self, companion: &Companion) {
        let unit = self
            .units
            .entry(companion.id)
            .or_insert_with(|| UnitInfo::new(companion.id, companion.position));
        unit.alive = companion.alive;
        unit.in_world = companion.in_world;
        unit.position = companion.position;
        unit.faction = companion.faction;
        unit.player_controlled = companion.player_controlled;
        unit.victim = companion.victim;
    }

    pub fn create_group(&mut self, raid: bool) -> GroupId {
        self.next_group += 1;
        let id = GroupId(self.next_group);
        self.groups.insert(
            id,
            Group {
                id,
                members: Vec::new(),
                raid,
            },
        );
        id
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    /// Adds `member` to `group`, leaving any previous group first.
    pub fn join_group(&mut self, group: GroupId, member: EntityId) -> Result<()> {
        if !self.units.contains_key(&member) {
            return Err(RuntimeError::UnknownEntity(member));
        }
        let raid = self
            .groups
            .get(&group)
            .map(|g| g.raid)
            .ok_or(RuntimeError::UnknownGroup(group))?;
        self.leave_group(member);

        if let Some(g) = self.groups.get_mut(&group) {
            g.members.push(member);
        }
        if let Some(unit) = self.units.get_mut(&member) {
            unit.group = Some(group);
            unit.in_raid = raid;
        }
        debug!(%member, %group, "joined group");
        Ok(())
    }

    pub fn leave_group(&mut self, member: EntityId) {
        let Some(unit) = self.units.get_mut(&member) else {
            return;
        };
        let Some(group) = unit.group.take() else {
            return;
        };
        unit.in_raid = false;
        if let Some(g) = self.groups.get_mut(&group) {
            g.members.retain(|&id| id != member);
        }
    }

    /// Makes two factions friendly to each other.
    pub fn ally(&mut self, faction: u32, other: u32) {
        self.alliances.insert((faction.min(other), faction.max(other)));
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl WorldOracle for World {
    fn unit(&self, id: EntityId) -> Option<UnitInfo> {
        self.units.get(&id).cloned()
    }

    fn group_members(&self, group: GroupId) -> Vec<EntityId> {
        self.groups
            .get(&group)
            .map(|g| g.members.clone())
            .unwrap_or_default()
    }

    fn in_line_of_sight(&self, from: &Position, to: &Position) -> bool {
        from.map == to.map
    }

    fn is_friendly(&self, faction: u32, other: u32) -> bool {
        faction == other
            || self
                .alliances
                .contains(&(faction.min(other), faction.max(other)))
    }
}
