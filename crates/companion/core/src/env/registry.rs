use crate::state::{Companion, EntityId};

/// Ownership ledger kept by the host.
pub trait CompanionRegistry {
    /// Number of companions currently hired by `owner`.
    fn companion_count(&self, owner: EntityId) -> usize;

    /// Releases the companion from its owner and schedules its despawn.
    ///
    /// Returns false if the companion was not registered.
    fn dismiss(&mut self, companion: &mut Companion) -> bool;
}
