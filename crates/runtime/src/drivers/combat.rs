use std::collections::HashMap;

use companion_core::{AbilityId, CombatDriver, Companion, EntityId, UnitInfo};

/// Minimal combat bookkeeping: who is fighting whom.
///
/// Damage and threat are out of scope; an engagement lasts until the
/// controller disengages.
#[derive(Clone, Debug, Default)]
pub struct CombatRecorder {
    engaged: HashMap<EntityId, EntityId>,
    attacks: u64,
    resets: u64,
    casts: Vec<(EntityId, AbilityId)>,
}

impl CombatRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_of(&self, companion: EntityId) -> Option<EntityId> {
        self.engaged.get(&companion).copied()
    }

    pub fn attacks(&self) -> u64 {
        self.attacks
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }

    pub fn casts(&self) -> &[(EntityId, AbilityId)] {
        &self.casts
    }

    pub fn forget(&mut self, companion: EntityId) {
        self.engaged.remove(&companion);
    }
}

impl CombatDriver for CombatRecorder {
    fn is_engaged(&self, companion: &Companion) -> bool {
        self.engaged.contains_key(&companion.id)
    }

    fn engage(&mut self, companion: &mut Companion, target: EntityId) -> bool {
        if !companion.alive || target == companion.id {
            return false;
        }
        self.engaged.insert(companion.id, target);
        companion.victim = Some(target);
        true
    }

    fn disengage(&mut self, companion: &mut Companion) {
        self.engaged.remove(&companion.id);
        companion.victim = None;
    }

    fn can_start_attack(&self, companion: &Companion, target: &UnitInfo) -> bool {
        companion.alive && target.alive && target.targetable && !target.player_controlled
    }

    fn select_victim(&mut self, companion: &mut Companion) -> bool {
        match self.engaged.get(&companion.id) {
            Some(&target) => {
                companion.victim = Some(target);
                true
            }
            None => {
                companion.victim = None;
                false
            }
        }
    }

    fn attack_if_ready(&mut self, _companion: &mut Companion) {
        self.attacks += 1;
    }

    fn reset(&mut self, companion: &mut Companion) {
        self.resets += 1;
        self.engaged.remove(&companion.id);
    }

    fn on_ability_cast(&mut self, companion: &mut Companion, ability: AbilityId) {
        self.casts.push((companion.id, ability));
    }
}
