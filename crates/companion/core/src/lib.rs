//! Per-companion behavioral controller for a host-driven simulation.
//!
//! `companion-core` decides what a companion does each tick: follow its
//! leader, assist players, evade, regenerate, and when to run its full update
//! at all. Everything it needs from the surrounding simulation comes in through
//! the collaborator traits in [`env`], and all per-tick work flows through
//! [`controller::CompanionController::tick`].
pub mod config;
pub mod controller;
pub mod cooldown;
pub mod env;
pub mod error;
pub mod packet;
pub mod regen;
pub mod schedule;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::{ControllerConfig, RegenConfig, SchedulerConfig};
pub use controller::{CompanionController, TickOutcome};
pub use cooldown::{CooldownEntry, CooldownError, CooldownTable};
pub use env::{
    AbilityId, AbilityInfo, AbilityOracle, CombatDriver, CompanionEnv, CompanionRegistry,
    GroupBroadcast, MovementDriver, MovementKind, PcgRng, RngOracle, UnitInfo, WorldOracle,
};
pub use error::{CompanionError, ErrorSeverity};
pub use packet::{GroupUpdateFlags, MemberStatus, PartyMemberStats, SMSG_PARTY_MEMBER_STATS};
pub use regen::{RegenContext, RegenTick, Regenerator};
pub use schedule::{Assignment, SchedulingBatch, UpdateScheduler};
pub use state::{
    Companion, CompanionTemplate, EntityId, FollowError, FollowFlags, FollowState, GroupId,
    ManaRegen, NpcFlags, PowerKind, PowerSync, Position, PvpFlags, RegenModifiers, ResourceMeter,
    TemplateFlags, UnitStateFlags, VehicleSeat,
};
