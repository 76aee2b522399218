use std::collections::{HashMap, HashSet};

use anyhow::ensure;
use companion_core::{AbilityId, AbilityInfo, AbilityOracle};

/// Ability metadata keyed by rank id.
#[derive(Clone, Debug, Default)]
pub struct AbilityCatalogue {
    abilities: HashMap<AbilityId, AbilityInfo>,
}

impl AbilityCatalogue {
    /// Builds a catalogue, rejecting duplicate ids and rank links to unknown ids.
    pub fn new(abilities: Vec<AbilityInfo>) -> anyhow::Result<Self> {
        let mut map = HashMap::with_capacity(abilities.len());
        for info in abilities {
            ensure!(!info.id.is_none(), "ability id 0 is reserved");
            let id = info.id;
            ensure!(map.insert(id, info).is_none(), "duplicate ability {}", id);
        }
        for info in map.values() {
            if let Some(next) = info.next_rank {
                ensure!(
                    map.contains_key(&next),
                    "{} links to unknown next rank {}",
                    info.id,
                    next
                );
            }
        }
        Ok(Self { abilities: map })
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// First ranks: ids no other ability links to, in id order.
    pub fn base_ids(&self) -> Vec<AbilityId> {
        let linked: HashSet<AbilityId> = self
            .abilities
            .values()
            .filter_map(|info| info.next_rank)
            .collect();
        let mut ids: Vec<_> = self
            .abilities
            .keys()
            .copied()
            .filter(|id| !linked.contains(id))
            .collect();
        ids.sort();
        ids
    }
}

impl AbilityOracle for AbilityCatalogue {
    fn ability(&self, id: AbilityId) -> Option<AbilityInfo> {
        self.abilities.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(id: u32, next: Option<u32>) -> AbilityInfo {
        AbilityInfo {
            id: AbilityId(id),
            base_level: 1,
            next_rank: next.map(AbilityId),
            max_range_hostile: 30.0,
            max_range_friendly: 30.0,
        }
    }

    #[test]
    fn rejects_dangling_rank_link() {
        let err = AbilityCatalogue::new(vec![rank(10, Some(11))]).unwrap_err();
        assert!(err.to_string().contains("unknown next rank"));
    }

    #[test]
    fn rejects_duplicates() {
        assert!(AbilityCatalogue::new(vec![rank(10, None), rank(10, None)]).is_err());
    }

    #[test]
    fn resolves_known_ranks() {
        let catalogue = AbilityCatalogue::new(vec![rank(10, Some(11)), rank(11, None)]).unwrap();

        assert_eq!(catalogue.len(), 2);
        assert_eq!(
            catalogue.ability(AbilityId(10)).and_then(|info| info.next_rank),
            Some(AbilityId(11))
        );
        assert!(catalogue.ability(AbilityId(12)).is_none());
    }

    #[test]
    fn base_ids_skip_higher_ranks() {
        let catalogue =
            AbilityCatalogue::new(vec![rank(20, None), rank(10, Some(11)), rank(11, None)])
                .unwrap();

        assert_eq!(catalogue.base_ids(), vec![AbilityId(10), AbilityId(20)]);
    }
}
