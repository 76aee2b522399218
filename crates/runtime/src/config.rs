//! Host configuration.
use std::env;

use companion_core::ControllerConfig;
use serde::{Deserialize, Serialize};

/// Settings for a [`CompanionRuntime`](crate::CompanionRuntime).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Seed for scheduling randomness. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Simulated milliseconds per tick.
    pub tick_ms: u32,
    pub population: PopulationConfig,
    pub controller: ControllerConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_ms: 50,
            population: PopulationConfig::default(),
            controller: ControllerConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `COMPANION_*` environment variables.
    ///
    /// - `COMPANION_SEED`
    /// - `COMPANION_TICK_MS` (minimum 1)
    /// - `COMPANION_OWNERS`
    /// - `COMPANION_PER_OWNER`
    /// - `COMPANION_AUTONOMOUS`
    /// - `COMPANION_RAID` (`true` puts every owner in one raid group)
    /// - `COMPANION_MAX_LEADER_DISTANCE`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(seed) = read_env::<u64>("COMPANION_SEED") {
            config.seed = Some(seed);
        }
        if let Some(tick_ms) = read_env::<u32>("COMPANION_TICK_MS") {
            config.tick_ms = tick_ms.max(1);
        }
        if let Some(owners) = read_env("COMPANION_OWNERS") {
            config.population.owners = owners;
        }
        if let Some(per_owner) = read_env("COMPANION_PER_OWNER") {
            config.population.companions_per_owner = per_owner;
        }
        if let Some(autonomous) = read_env("COMPANION_AUTONOMOUS") {
            config.population.autonomous = autonomous;
        }
        if let Some(raid) = read_env("COMPANION_RAID") {
            config.population.raid = raid;
        }
        if let Some(distance) = read_env::<f32>("COMPANION_MAX_LEADER_DISTANCE") {
            config.controller = config.controller.with_max_leader_distance(distance);
        }

        config
    }
}

/// How many owners and companions a driver should spawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub owners: usize,
    pub companions_per_owner: usize,
    /// Companions spawned without an owner.
    pub autonomous: usize,
    /// Put all owners into a single raid-sized group.
    pub raid: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            owners: 20,
            companions_per_owner: 4,
            autonomous: 200,
            raid: false,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
