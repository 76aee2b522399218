use super::{AbilityId, UnitInfo};
use crate::state::{Companion, EntityId};

/// Combat resolution lives in the host; the controller only decides when to
/// engage, disengage and act.
pub trait CombatDriver {
    /// True while the companion is in combat.
    fn is_engaged(&self, companion: &Companion) -> bool;

    /// Starts attacking `target`. Returns false if the attack was refused.
    fn engage(&mut self, companion: &mut Companion, target: EntityId) -> bool;

    /// Drops threat and leaves combat.
    fn disengage(&mut self, companion: &mut Companion);

    /// True if the companion may open an attack on `target`.
    fn can_start_attack(&self, companion: &Companion, target: &UnitInfo) -> bool;

    /// Refreshes the current victim. Returns false when there is nothing to fight.
    fn select_victim(&mut self, companion: &mut Companion) -> bool;

    /// Performs a melee swing or cast if one is ready.
    fn attack_if_ready(&mut self, companion: &mut Companion);

    /// Per-class reset after evade or respawn.
    fn reset(&mut self, _companion: &mut Companion) {}

    /// Per-class reaction to a successful cast.
    fn on_ability_cast(&mut self, _companion: &mut Companion, _ability: AbilityId) {}
}
