//! Spawns owners, hired companions and autonomous companions.
use companion_core::{
    AbilityId, Companion, CompanionTemplate, ControllerConfig, EntityId, PowerKind, Position,
    ResourceMeter, TemplateFlags, UnitInfo,
};
use companion_runtime::{CompanionRuntime, PopulationConfig};
use tracing::debug;

const PLAYER_FACTION: u32 = 1;
const COMPANION_FACTION: u32 = 35;
const FIRST_COMPANION_ID: u64 = 100_000;

/// Ids of everything [`spawn`] created.
#[derive(Debug, Default)]
pub struct Population {
    pub owners: Vec<EntityId>,
    pub companions: Vec<EntityId>,
}

pub fn spawn(runtime: &mut CompanionRuntime, config: &PopulationConfig) -> anyhow::Result<Population> {
    let mut population = Population::default();
    let raid = config.raid.then(|| runtime.world_mut().create_group(true));
    let mut next_id = FIRST_COMPANION_ID;

    for n in 0..config.owners {
        let owner = EntityId(n as u64 + 1);
        let mut unit = UnitInfo::player(owner, Position::new(0, 20.0 * n as f32, 0.0, 0.0));
        unit.faction = PLAYER_FACTION;
        runtime.spawn_unit(unit)?;

        let group = match raid {
            Some(group) => group,
            None => runtime.world_mut().create_group(false),
        };
        runtime.world_mut().join_group(group, owner)?;
        population.owners.push(owner);

        for _ in 0..config.companions_per_owner {
            let id = runtime.spawn_companion(template_companion(next_id, owner_spot(n)))?;
            runtime.hire(owner, id)?;
            population.companions.push(id);
            next_id += 1;
        }
    }

    for n in 0..config.autonomous {
        let spot = Position::new(0, 5.0 * (n % 50) as f32, 500.0 + 5.0 * (n / 50) as f32, 0.0);
        let id = runtime.spawn_companion(template_companion(next_id, spot))?;
        population.companions.push(id);
        next_id += 1;
    }

    debug!(
        owners = population.owners.len(),
        companions = population.companions.len(),
        "population spawned"
    );
    Ok(population)
}

/// Teaches every companion each first rank in the runtime's catalogue.
pub fn teach(runtime: &mut CompanionRuntime, population: &Population) -> anyhow::Result<Vec<AbilityId>> {
    let bases = runtime.abilities().base_ids();
    for &id in &population.companions {
        for &base in &bases {
            runtime.learn(id, base)?;
        }
    }
    Ok(bases)
}

fn owner_spot(owner: usize) -> Position {
    Position::new(0, 20.0 * owner as f32 - 2.0, 0.0, 0.0)
}

fn template_companion(id: u64, position: Position) -> Companion {
    let template = CompanionTemplate {
        entry: ControllerConfig::MIN_COMPANION_ENTRY + (id % 16) as u32,
        faction: COMPANION_FACTION,
        flags: TemplateFlags::CAN_ASSIST,
    };
    let mut companion = Companion::new(EntityId(id), format!("Companion {id}"), template)
        .with_level(10 + (id % 60) as u8)
        .with_position(position)
        .with_health(ResourceMeter::new(400, 1000))
        .with_power(PowerKind::Energy, ResourceMeter::new(0, 100));
    companion.regen_modifiers.mod_regen = 25;
    companion
}
