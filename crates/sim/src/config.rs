//! Simulation driver configuration.
use std::env;
use std::path::PathBuf;

/// What to run and where to read data from.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub ticks: u32,
    /// TOML runtime configuration. Environment defaults apply when unset.
    pub config_path: Option<PathBuf>,
    /// RON ability catalogue. Companions learn nothing when unset.
    pub abilities_path: Option<PathBuf>,
    /// Cooldown started by every simulated cast.
    pub cast_cooldown_ms: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ticks: 200,
            config_path: None,
            abilities_path: None,
            cast_cooldown_ms: 1500,
        }
    }
}

impl SimConfig {
    /// Construct simulation configuration from environment variables.
    ///
    /// Environment variables:
    /// - `COMPANION_SIM_TICKS` - Number of ticks to run (default: 200)
    /// - `COMPANION_SIM_CONFIG` - Path to a TOML runtime configuration
    /// - `COMPANION_SIM_ABILITIES` - Path to a RON ability catalogue
    /// - `COMPANION_SIM_CAST_COOLDOWN_MS` - Cooldown per cast (default: 1500)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ticks) = read_env("COMPANION_SIM_TICKS") {
            config.ticks = ticks;
        }
        config.config_path = read_env("COMPANION_SIM_CONFIG");
        config.abilities_path = read_env("COMPANION_SIM_ABILITIES");
        if let Some(cooldown) = read_env("COMPANION_SIM_CAST_COOLDOWN_MS") {
            config.cast_cooldown_ms = cooldown;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
