//! Host-side implementations of the command collaborators.
//!
//! Movement and combat are not simulated in depth: the drivers record what
//! the controller asked for and keep just enough state for the controller's
//! queries to be answered consistently.
mod combat;
mod movement;

pub use combat::CombatRecorder;
pub use movement::{MovementCommand, MovementRecorder};
