use std::path::Path;

use companion_core::AbilityInfo;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};
use crate::oracle::AbilityCatalogue;

/// Ability catalogue structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityFile {
    pub abilities: Vec<AbilityInfo>,
}

/// Loads an [`AbilityCatalogue`] from RON.
pub struct AbilityLoader;

impl AbilityLoader {
    pub fn load(path: &Path) -> LoadResult<AbilityCatalogue> {
        let content = read_file(path)?;
        let file: AbilityFile = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ability catalogue RON: {}", e))?;

        AbilityCatalogue::new(file.abilities)
    }
}
