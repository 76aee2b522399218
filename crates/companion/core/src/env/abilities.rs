use std::fmt;

/// Identifier of an ability rank. Zero means "no ability".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AbilityId(pub u32);

impl AbilityId {
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability:{}", self.0)
    }
}

/// Static metadata of one ability rank.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityInfo {
    pub id: AbilityId,
    /// Minimum companion level for this rank.
    pub base_level: u8,
    pub next_rank: Option<AbilityId>,
    pub max_range_hostile: f32,
    pub max_range_friendly: f32,
}

impl AbilityInfo {
    pub fn max_range(&self, hostile: bool) -> f32 {
        if hostile {
            self.max_range_hostile
        } else {
            self.max_range_friendly
        }
    }
}

/// Ability metadata lookup.
pub trait AbilityOracle {
    fn ability(&self, id: AbilityId) -> Option<AbilityInfo>;
}
