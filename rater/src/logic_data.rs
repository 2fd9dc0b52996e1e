use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rater_game::{RawDefinition, RequirementTable, RequirementTableBuilder};
use serde::{Deserialize, Serialize};

use crate::settings::RaterSettings;

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct LogicData {
    pub definitions: Vec<RawDefinition>,
}

impl LogicData {
    pub fn load(path: &Path) -> Result<Self> {
        let logic_str = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read logic data at {}", path.display()))?;
        serde_json::from_str(&logic_str)
            .with_context(|| format!("Unable to parse logic data at {}", path.display()))
    }
}

/// Hand-written definitions which the exported game logic lacks: the final
/// boss, nail upgrades and short aliases for the main abilities.
pub fn supplementary_definitions() -> Result<Vec<RawDefinition>> {
    let logic: LogicData = serde_json::from_str(include_str!("../data/supplementary_logic.json"))
        .context("Unable to parse built-in supplementary logic")?;
    Ok(logic.definitions)
}

pub fn build_table(
    definitions: &[RawDefinition],
    supplementary: &[RawDefinition],
    settings: &RaterSettings,
) -> Result<RequirementTable> {
    let mut builder = RequirementTableBuilder::new(settings.clamp_negative_tiers);
    builder
        .import(definitions)
        .context("Unable to import logic definitions")?;
    builder
        .append(supplementary)
        .context("Unable to add supplementary logic")?;
    let table = builder.build();
    info!(
        "Built logic table: {} locations, {} macros, {} loadouts",
        table.locations.len(),
        table.macros.len(),
        table.num_alternatives()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplementary_logic_compiles() -> Result<()> {
        let supplementary = supplementary_definitions()?;
        let table = build_table(&[], &supplementary, &RaterSettings::default())?;

        // DREAMER3 + (CLAW | WINGS) + (SHADOWDASH | QUAKE)
        let radiance = table.get_location("Radiance").unwrap();
        assert_eq!(radiance.len(), 4);
        assert_eq!(radiance[0].clause, vec!["DREAMER3", "CLAW", "SHADOWDASH"]);

        // One loadout per choice of three of the six pale ore locations.
        assert_eq!(table.get_macro("NAIL3").unwrap().len(), 20);
        assert_eq!(table.get_macro("NAIL4").unwrap()[0].clause.len(), 7);
        assert_eq!(table.get_macro("DASH").unwrap()[0].clause, vec!["Mothwing_Cloak"]);
        Ok(())
    }
}
