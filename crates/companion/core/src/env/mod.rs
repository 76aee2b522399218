//! Collaborator seams the controller talks through.
//!
//! World lookup and ability metadata are read-only oracles; movement, combat,
//! the ownership registry and the group broadcast channel are drivers the
//! controller issues commands to. [`CompanionEnv`] bundles one of each so a
//! controller call receives everything it needs in a single borrow.
mod abilities;
mod broadcast;
mod combat;
mod movement;
mod registry;
mod rng;
mod world;

pub use abilities::{AbilityId, AbilityInfo, AbilityOracle};
pub use broadcast::GroupBroadcast;
pub use combat::CombatDriver;
pub use movement::{MovementDriver, MovementKind};
pub use registry::CompanionRegistry;
pub use rng::{PcgRng, RngOracle};
pub use world::{UnitInfo, WorldOracle};

/// Borrowed collaborators for a single controller call.
pub struct CompanionEnv<'a> {
    world: &'a dyn WorldOracle,
    abilities: &'a dyn AbilityOracle,
    movement: &'a mut dyn MovementDriver,
    combat: &'a mut dyn CombatDriver,
    registry: &'a mut dyn CompanionRegistry,
    broadcast: &'a mut dyn GroupBroadcast,
}

impl<'a> CompanionEnv<'a> {
    pub fn new(
        world: &'a dyn WorldOracle,
        abilities: &'a dyn AbilityOracle,
        movement: &'a mut dyn MovementDriver,
        combat: &'a mut dyn CombatDriver,
        registry: &'a mut dyn CompanionRegistry,
        broadcast: &'a mut dyn GroupBroadcast,
    ) -> Self {
        Self {
            world,
            abilities,
            movement,
            combat,
            registry,
            broadcast,
        }
    }

    pub fn world(&self) -> &'a dyn WorldOracle {
        self.world
    }

    pub fn abilities(&self) -> &'a dyn AbilityOracle {
        self.abilities
    }

    pub fn movement(&mut self) -> &mut (dyn MovementDriver + 'a) {
        &mut *self.movement
    }

    pub fn combat(&mut self) -> &mut (dyn CombatDriver + 'a) {
        &mut *self.combat
    }

    pub fn registry(&mut self) -> &mut (dyn CompanionRegistry + 'a) {
        &mut *self.registry
    }

    pub fn broadcast(&mut self) -> &mut (dyn GroupBroadcast + 'a) {
        &mut *self.broadcast
    }
}
