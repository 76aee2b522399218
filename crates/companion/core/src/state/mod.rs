//! Plain data the controller reads and mutates.
//!
//! [`Companion`] is owned by the host and borrowed per call; [`FollowState`]
//! is owned by the controller.
mod common;
mod companion;
mod follow;

pub use common::{EntityId, GroupId, Position, ResourceMeter};
pub use companion::{
    Companion, CompanionTemplate, ManaRegen, NpcFlags, PowerKind, PowerSync, PvpFlags,
    RegenModifiers, TemplateFlags, UnitStateFlags, VehicleSeat,
};
pub use follow::{FollowError, FollowFlags, FollowState};
