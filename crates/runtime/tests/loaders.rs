use std::io::Write;

use companion_core::{AbilityId, AbilityOracle};
use companion_runtime::{AbilityLoader, ConfigLoader};
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
fn config_loader_merges_with_defaults() {
    let file = write_temp(
        r#"
seed = 42
tick_ms = 100

[population]
owners = 3
raid = true

[controller]
max_leader_distance = 60.0

[controller.scheduler]
jitter_max = 40
"#,
    );

    let config = ConfigLoader::load(file.path()).expect("config should load");

    assert_eq!(config.seed, Some(42));
    assert_eq!(config.tick_ms, 100);
    assert_eq!(config.population.owners, 3);
    assert!(config.population.raid);
    assert_eq!(config.population.companions_per_owner, 4);
    assert_eq!(config.controller.max_leader_distance, 60.0);
    assert_eq!(config.controller.scheduler.jitter_max, 40);
    assert_eq!(config.controller.scheduler.combat_delay_ms, 500);
    assert_eq!(config.controller.group_update_interval_ms, 500);
}

#[test]
fn config_loader_reports_the_bad_file() {
    let err = ConfigLoader::load(std::path::Path::new("/nonexistent/companion.toml"))
        .expect_err("missing file must fail");
    assert!(err.to_string().contains("Failed to read file"));

    let err = ConfigLoader::parse("tick_ms = \"fast\"").expect_err("bad type must fail");
    assert!(err.to_string().contains("Failed to parse"));
}

#[test]
fn ability_loader_builds_rank_chains() {
    let file = write_temp(
        r#"(
    abilities: [
        (id: 100, base_level: 1, next_rank: Some(101), max_range_hostile: 30.0, max_range_friendly: 40.0),
        (id: 101, base_level: 10, next_rank: None, max_range_hostile: 35.0, max_range_friendly: 40.0),
    ],
)"#,
    );

    let catalogue = AbilityLoader::load(file.path()).expect("catalogue should load");

    assert_eq!(catalogue.len(), 2);
    let first = catalogue.ability(AbilityId(100)).expect("rank one");
    assert_eq!(first.next_rank, Some(AbilityId(101)));
    assert_eq!(
        catalogue.ability(AbilityId(101)).map(|info| info.max_range(true)),
        Some(35.0)
    );
}

#[test]
fn ability_loader_rejects_dangling_ranks() {
    let file = write_temp(
        r#"(
    abilities: [
        (id: 100, base_level: 1, next_rank: Some(999), max_range_hostile: 30.0, max_range_friendly: 40.0),
    ],
)"#,
    );

    assert!(AbilityLoader::load(file.path()).is_err());
}
