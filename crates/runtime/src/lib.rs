//! Reference host for companion controllers.
//!
//! `companion-core` only talks to its surroundings through traits. This crate
//! provides an in-memory implementation of every one of them and a batch tick
//! driver, [`CompanionRuntime`], that owns a population of companions.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the tick driver and builder
//! - [`oracle`] answers world, ability and randomness queries
//! - [`drivers`] records movement and combat commands
//! - [`ledger`] tracks which owner hired which companion
//! - [`outbox`] collects encoded packets for group members
//! - [`loaders`] reads configuration and ability data from disk
pub mod config;
pub mod drivers;
pub mod error;
pub mod ledger;
pub mod loaders;
pub mod oracle;
pub mod outbox;
pub mod runtime;

pub use config::{PopulationConfig, RuntimeConfig};
pub use drivers::{CombatRecorder, MovementCommand, MovementRecorder};
pub use error::{Result, RuntimeError};
pub use ledger::CompanionLedger;
pub use loaders::{AbilityLoader, ConfigLoader, LoadResult};
pub use oracle::{AbilityCatalogue, Group, StdRngOracle, World};
pub use outbox::{OutboundPacket, PacketOutbox};
pub use runtime::{CompanionRuntime, CompanionSlot, RuntimeBuilder, TickReport};
