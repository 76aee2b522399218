//! Host-side implementations of the read-only collaborator traits.
//!
//! [`World`] is the host's own unit and group registry; the controller only
//! ever sees it through [`companion_core::WorldOracle`]. [`AbilityCatalogue`]
//! is immutable once loaded.
mod abilities;
mod rng;
mod world;

pub use abilities::AbilityCatalogue;
pub use rng::StdRngOracle;
pub use world::{Group, World};
