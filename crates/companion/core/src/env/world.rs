use crate::state::{EntityId, GroupId, Position};

/// Snapshot of another unit as the host sees it at the time of the query.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitInfo {
    pub id: EntityId,
    pub alive: bool,
    /// False while the unit is between maps or logged out.
    pub in_world: bool,
    pub position: Position,
    pub group: Option<GroupId>,
    /// True when the unit's group is a raid rather than a small party.
    pub in_raid: bool,
    pub faction: u32,
    pub player_controlled: bool,
    /// True only for real players. Companions are never players, even while
    /// a player controls them.
    pub is_player: bool,
    pub victim: Option<EntityId>,
    /// False for units that cannot be selected as a target at all.
    pub targetable: bool,
    /// False while the unit stands where the querying companion cannot go
    /// (deep water, air).
    pub accessible: bool,
}

impl UnitInfo {
    /// A live, in-world, targetable non-player unit with no group and no
    /// victim.
    pub fn new(id: EntityId, position: Position) -> Self {
        Self {
            id,
            alive: true,
            in_world: true,
            position,
            group: None,
            in_raid: false,
            faction: 0,
            player_controlled: false,
            is_player: false,
            victim: None,
            targetable: true,
            accessible: true,
        }
    }

    /// A player unit.
    pub fn player(id: EntityId, position: Position) -> Self {
        Self {
            player_controlled: true,
            is_player: true,
            ..Self::new(id, position)
        }
    }

    pub fn is_within(&self, position: &Position, range: f32) -> bool {
        self.position.is_within(position, range)
    }
}

/// Read-only lookups into the host simulation.
pub trait WorldOracle {
    /// Resolves a unit by id. `None` once the unit has left the simulation.
    fn unit(&self, id: EntityId) -> Option<UnitInfo>;

    /// Members of a group in join order.
    fn group_members(&self, group: GroupId) -> Vec<EntityId>;

    fn in_line_of_sight(&self, from: &Position, to: &Position) -> bool;

    /// Faction reaction between two factions.
    fn is_friendly(&self, faction: u32, other: u32) -> bool;
}
