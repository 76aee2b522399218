use std::fmt;

/// Unique identifier for any entity in the host simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u64);

impl EntityId {
    /// The empty identifier. Never refers to a live entity.
    pub const EMPTY: Self = Self(0);

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a player group (party or raid).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// World position. Distances are only defined between positions on the same map.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub map: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(map: u32, x: f32, y: f32, z: f32) -> Self {
        Self { map, x, y, z }
    }

    /// Euclidean distance, or `None` when the positions are on different maps.
    pub fn distance(&self, other: &Position) -> Option<f32> {
        if self.map != other.map {
            return None;
        }
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }

    /// True if `other` is on the same map and no further than `range`.
    pub fn is_within(&self, other: &Position, range: f32) -> bool {
        self.distance(other).is_some_and(|d| d <= range)
    }
}

/// Integer resource meter (health, mana, energy).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub const fn new(current: u32, maximum: u32) -> Self {
        Self { current, maximum }
    }

    pub const fn full(maximum: u32) -> Self {
        Self::new(maximum, maximum)
    }

    pub const fn is_full(&self) -> bool {
        self.current >= self.maximum
    }

    /// Adds `amount`, clamping at the maximum. Returns the amount actually gained.
    pub fn gain(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.maximum);
        self.current - before
    }

    /// Sets the current value, clamped to the maximum.
    pub fn set(&mut self, value: u32) {
        self.current = value.min(self.maximum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_undefined_across_maps() {
        let a = Position::new(0, 0.0, 0.0, 0.0);
        let b = Position::new(1, 0.0, 0.0, 0.0);

        assert_eq!(a.distance(&b), None);
        assert!(!a.is_within(&b, 1000.0));
    }

    #[test]
    fn is_within_includes_the_boundary() {
        let a = Position::new(0, 0.0, 0.0, 0.0);
        let b = Position::new(0, 3.0, 4.0, 0.0);

        assert!(a.is_within(&b, 5.0));
        assert!(!a.is_within(&b, 4.9));
    }

    #[test]
    fn gain_clamps_at_maximum() {
        let mut meter = ResourceMeter::new(90, 100);

        assert_eq!(meter.gain(25), 10);
        assert!(meter.is_full());
    }
}
