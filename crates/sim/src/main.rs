//! Companion simulation binary.
//!
//! Spawns a population of owners and companions on the reference runtime,
//! ticks it for a fixed number of steps and reports how full updates spread
//! across ticks.
//!
//! ```bash
//! COMPANION_OWNERS=40 COMPANION_SIM_TICKS=600 RUST_LOG=companion_core=debug \
//!     cargo run -p companion-sim
//! ```
mod config;
mod population;

use anyhow::Result;
use companion_runtime::{AbilityLoader, CompanionRuntime, ConfigLoader, RuntimeConfig};
use tracing::info;

use crate::config::SimConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let sim = SimConfig::from_env();
    let runtime_config = match &sim.config_path {
        Some(path) => ConfigLoader::load(path)?,
        None => RuntimeConfig::from_env(),
    };
    info!(
        ticks = sim.ticks,
        tick_ms = runtime_config.tick_ms,
        seed = ?runtime_config.seed,
        "starting companion simulation"
    );

    let mut builder = CompanionRuntime::builder().config(runtime_config.clone());
    if let Some(path) = &sim.abilities_path {
        let catalogue = AbilityLoader::load(path)?;
        info!(abilities = catalogue.len(), path = %path.display(), "ability catalogue loaded");
        builder = builder.abilities(catalogue);
    }
    let mut runtime = builder.build();

    let population = population::spawn(&mut runtime, &runtime_config.population)?;
    let bases = population::teach(&mut runtime, &population)?;
    info!(
        owners = population.owners.len(),
        companions = population.companions.len(),
        abilities = bases.len(),
        "population ready"
    );

    let mut stats = RunStats::default();
    for _ in 0..sim.ticks {
        for id in runtime.companion_ids().collect::<Vec<_>>() {
            for &base in &bases {
                if runtime.cast(id, base, sim.cast_cooldown_ms)?.is_some() {
                    stats.casts += 1;
                }
            }
        }

        let report = runtime.step();
        stats.updates.push(report.updated);
        stats.despawned += report.despawned.len();
        stats.packets += runtime.outbox_mut().drain().len();
        stats.group_updates += runtime.outbox_mut().drain_group_updates().len();
    }

    stats.log(runtime.clock_ms(), runtime.len());
    Ok(())
}

#[derive(Debug, Default)]
struct RunStats {
    /// Full updates per tick.
    updates: Vec<usize>,
    despawned: usize,
    packets: usize,
    group_updates: usize,
    casts: usize,
}

impl RunStats {
    fn log(&self, clock_ms: u64, remaining: usize) {
        let total: usize = self.updates.iter().sum();
        let peak = self.updates.iter().copied().max().unwrap_or(0);
        let low = self.updates.iter().copied().min().unwrap_or(0);
        let mean = if self.updates.is_empty() {
            0.0
        } else {
            total as f64 / self.updates.len() as f64
        };

        info!(
            clock_ms,
            remaining,
            total_updates = total,
            peak_updates = peak,
            min_updates = low,
            mean_updates = mean,
            "simulation finished"
        );
        info!(
            packets = self.packets,
            group_updates = self.group_updates,
            despawned = self.despawned,
            casts = self.casts,
            "traffic"
        );
    }
}
