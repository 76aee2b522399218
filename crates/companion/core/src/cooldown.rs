//! Per-companion ability cooldown table.
//!
//! Entries are keyed by the base ability id the class logic knows about and
//! carry the rank actually usable at the companion's level. Entries are
//! created lazily and live as long as the table.

use std::collections::HashMap;

use crate::env::{AbilityId, AbilityOracle};
use crate::error::{CompanionError, ErrorSeverity};

/// Cooldown bookkeeping for one base ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownEntry {
    /// Rank used when casting. [`AbilityId::NONE`] if no rank is usable yet.
    pub resolved: AbilityId,
    pub remaining_ms: u32,
    pub enabled: bool,
}

impl CooldownEntry {
    fn new(resolved: AbilityId) -> Self {
        Self {
            resolved,
            remaining_ms: 0,
            enabled: true,
        }
    }

    fn usable(&self, autonomous: bool) -> bool {
        (self.enabled || autonomous) && !self.resolved.is_none()
    }
}

#[derive(Clone, Debug, Default)]
pub struct CooldownTable {
    entries: HashMap<AbilityId, CooldownEntry>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, base: AbilityId) -> Option<&CooldownEntry> {
        self.entries.get(&base)
    }

    /// Creates or refreshes the entry for `base`.
    ///
    /// With `force_add` or without `forward_rank` the base id itself is
    /// stored. Otherwise the rank chain is walked and the highest rank whose
    /// minimum level the companion meets is stored, or [`AbilityId::NONE`]
    /// if not even the first rank qualifies. The remaining cooldown and the
    /// enabled flag of an existing entry are kept.
    pub fn init(
        &mut self,
        base: AbilityId,
        force_add: bool,
        forward_rank: bool,
        level: u8,
        abilities: &dyn AbilityOracle,
    ) -> Result<AbilityId, CooldownError> {
        let first = abilities
            .ability(base)
            .ok_or(CooldownError::UnknownAbility(base))?;

        let resolved = if force_add || !forward_rank {
            base
        } else {
            let mut resolved = AbilityId::NONE;
            let mut rank = Some(first);
            while let Some(info) = rank.filter(|info| level >= info.base_level) {
                resolved = info.id;
                rank = info.next_rank.and_then(|next| abilities.ability(next));
            }
            resolved
        };

        self.entries
            .entry(base)
            .and_modify(|entry| entry.resolved = resolved)
            .or_insert_with(|| CooldownEntry::new(resolved));
        Ok(resolved)
    }

    /// Sets the remaining cooldown of `base`.
    ///
    /// A missing entry is created first (forced, no rank walk) unless the
    /// cooldown is zero, in which case nothing happens.
    pub fn set_cooldown(
        &mut self,
        base: AbilityId,
        cooldown_ms: u32,
        level: u8,
        abilities: &dyn AbilityOracle,
    ) -> Result<(), CooldownError> {
        if !self.entries.contains_key(&base) {
            if cooldown_ms == 0 {
                return Ok(());
            }
            self.init(base, true, false, level, abilities)?;
        }
        if let Some(entry) = self.entries.get_mut(&base) {
            entry.remaining_ms = cooldown_ms;
        }
        Ok(())
    }

    pub fn reduce(&mut self, base: AbilityId, elapsed_ms: u32) {
        if let Some(entry) = self.entries.get_mut(&base) {
            entry.remaining_ms = entry.remaining_ms.saturating_sub(elapsed_ms);
        }
    }

    pub fn reduce_all(&mut self, elapsed_ms: u32) {
        for entry in self.entries.values_mut() {
            entry.remaining_ms = entry.remaining_ms.saturating_sub(elapsed_ms);
        }
    }

    /// True if `base` has a usable rank whose cooldown ends within `elapsed_ms`.
    ///
    /// Disabled entries are still ready for an autonomous companion.
    pub fn is_ready(&self, base: AbilityId, elapsed_ms: u32, autonomous: bool) -> bool {
        self.entries
            .get(&base)
            .is_some_and(|entry| entry.usable(autonomous) && entry.remaining_ms <= elapsed_ms)
    }

    /// Rank to cast for `base`, or [`AbilityId::NONE`] when missing or disabled.
    pub fn resolved_id(&self, base: AbilityId, autonomous: bool) -> AbilityId {
        self.entries
            .get(&base)
            .filter(|entry| entry.usable(autonomous))
            .map_or(AbilityId::NONE, |entry| entry.resolved)
    }

    /// Returns false if there is no entry for `base`.
    pub fn set_enabled(&mut self, base: AbilityId, enabled: bool) -> bool {
        match self.entries.get_mut(&base) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CooldownError {
    #[error("no ability metadata for base ability {0}")]
    UnknownAbility(AbilityId),
}

impl CompanionError for CooldownError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::InvalidInput
    }

    fn error_code(&self) -> &'static str {
        match self {
            CooldownError::UnknownAbility(_) => "COOLDOWN_UNKNOWN_ABILITY",
        }
    }
}
