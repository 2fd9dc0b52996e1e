use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use rater_game::{CostKind, Item, ItemCost, Symbol};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

use crate::settings::RaterSettings;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SeedItem {
    pub name: Symbol,
    // Omitted for an item at its own vanilla location.
    #[serde(default)]
    pub location: Option<Symbol>,
    // e.g. "10 Grubs" or "400 Essence"
    #[serde(default)]
    pub cost: Option<String>,
}

/// Item placement and settings of one randomized seed, as extracted from
/// its spoiler log.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SeedDescription {
    pub items: Vec<SeedItem>,
    #[serde(default)]
    pub start_location: Option<String>,
    #[serde(default)]
    pub starting_items: Vec<Symbol>,
    pub goal: Symbol,
    #[serde(default = "default_true")]
    pub randomized_grubs: bool,
    #[serde(default = "default_true")]
    pub randomized_roots: bool,
}

fn default_true() -> bool {
    true
}

pub fn parse_cost(cost: &str) -> Result<ItemCost> {
    let parts: Vec<&str> = cost.split_whitespace().collect();
    if parts.len() != 2 {
        bail!("Expecting cost of the form '<amount> <kind>': {cost}");
    }
    let amount: u32 = parts[0]
        .parse()
        .with_context(|| format!("Invalid cost amount in '{cost}'"))?;
    let kind = CostKind::from_str(parts[1]).with_context(|| {
        format!(
            "Unrecognized cost kind in '{cost}' (expected one of {:?})",
            CostKind::VARIANTS
        )
    })?;
    Ok(ItemCost { kind, amount })
}

impl SeedItem {
    pub fn to_item(&self) -> Result<Item> {
        let location = self.location.as_deref().unwrap_or(&self.name);
        let mut item = Item::new(&self.name, location);
        if let Some(cost) = &self.cost {
            item.cost = Some(parse_cost(cost).with_context(|| format!("Item {}", self.name))?);
        }
        Ok(item)
    }
}

impl SeedDescription {
    pub fn load(path: &Path) -> Result<Self> {
        let seed_str = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read seed at {}", path.display()))?;
        serde_json::from_str(&seed_str)
            .with_context(|| format!("Unable to parse seed at {}", path.display()))
    }

    /// Placed items, plus the vanilla items which this seed's settings leave
    /// unrandomized. Dream warriors are never randomized.
    pub fn get_items(&self, settings: &RaterSettings) -> Result<Vec<Item>> {
        let mut items: Vec<Item> = self
            .items
            .iter()
            .map(|x| x.to_item())
            .collect::<Result<_>>()?;
        let vanilla = &settings.vanilla_items;
        if !self.randomized_grubs {
            items.extend(vanilla.grubs.iter().map(|x| Item::vanilla(x)));
        }
        if !self.randomized_roots {
            items.extend(vanilla.whispering_roots.iter().map(|x| Item::vanilla(x)));
        }
        items.extend(vanilla.dream_warriors.iter().map(|x| Item::vanilla(x)));
        Ok(items)
    }

    pub fn get_starting_items(&self, settings: &RaterSettings) -> Result<Vec<Symbol>> {
        let mut out = self.starting_items.clone();
        if let Some(start) = &self.start_location {
            match settings.resolve_start_location(start) {
                Some(symbol) => out.push(symbol.clone()),
                None => bail!("Unknown start location: {start}"),
            }
        }
        Ok(out)
    }
}
