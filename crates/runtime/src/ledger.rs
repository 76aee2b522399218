//! Ownership ledger: which owner hired which companion.
use std::collections::{BTreeSet, HashMap};

use companion_core::{Companion, CompanionRegistry, EntityId};
use tracing::debug;

use crate::error::{Result, RuntimeError};

#[derive(Clone, Debug, Default)]
pub struct CompanionLedger {
    owner_of: HashMap<EntityId, EntityId>,
    hired: HashMap<EntityId, BTreeSet<EntityId>>,
    despawns: Vec<EntityId>,
}

impl CompanionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, owner: EntityId, companion: EntityId) -> Result<()> {
        if let Some(&current) = self.owner_of.get(&companion) {
            return Err(RuntimeError::AlreadyHired {
                companion,
                owner: current,
            });
        }
        self.owner_of.insert(companion, owner);
        self.hired.entry(owner).or_default().insert(companion);
        Ok(())
    }

    pub fn owner_of(&self, companion: EntityId) -> Option<EntityId> {
        self.owner_of.get(&companion).copied()
    }

    /// Companions hired by `owner`, in id order.
    pub fn companions_of(&self, owner: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.hired.get(&owner).into_iter().flatten().copied()
    }

    /// Companions released since the last call, in release order.
    pub fn take_despawns(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.despawns)
    }

    fn unregister(&mut self, companion: EntityId) -> Option<EntityId> {
        let owner = self.owner_of.remove(&companion)?;
        if let Some(set) = self.hired.get_mut(&owner) {
            set.remove(&companion);
            if set.is_empty() {
                self.hired.remove(&owner);
            }
        }
        Some(owner)
    }
}

impl CompanionRegistry for CompanionLedger {
    fn companion_count(&self, owner: EntityId) -> usize {
        self.hired.get(&owner).map_or(0, BTreeSet::len)
    }

    fn dismiss(&mut self, companion: &mut Companion) -> bool {
        companion.vehicle = None;
        companion.faction = companion.template.faction;
        companion.player_controlled = false;

        let owner = self.unregister(companion.id);
        self.despawns.push(companion.id);
        debug!(companion = %companion.id, owner = ?owner, "companion released");
        owner.is_some()
    }
}
