use std::path::Path;

use anyhow::{Context, Result};
use hashbrown::{HashMap, HashSet};
use rater_game::{CostKind, Symbol};
use serde::{Deserialize, Serialize};

/// Items which upgrade one another, listed in the order the game grants
/// them: picking up any member gives the first member not yet obtained.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EquivalenceGroup {
    pub members: Vec<Symbol>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Reward {
    pub kind: CostKind,
    pub amount: u32,
}

// Reward granted by every item whose name starts with `prefix`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CounterPrefix {
    pub prefix: String,
    pub kind: CostKind,
    pub amount: u32,
}

/// Items which are only randomized on some settings; when not randomized
/// they sit at their own vanilla locations.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct VanillaItems {
    #[serde(default)]
    pub grubs: Vec<Symbol>,
    #[serde(default)]
    pub whispering_roots: Vec<Symbol>,
    #[serde(default)]
    pub dream_warriors: Vec<Symbol>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RaterSettings {
    // Skip and annotation tags in the logic which are not real prerequisites.
    #[serde(default)]
    pub ignored_symbols: HashSet<Symbol>,
    #[serde(default)]
    pub equivalence_groups: Vec<EquivalenceGroup>,
    #[serde(default)]
    pub counter_prefixes: Vec<CounterPrefix>,
    #[serde(default)]
    pub named_rewards: HashMap<Symbol, Reward>,
    // Start location display name -> logic symbol
    #[serde(default)]
    pub start_locations: HashMap<String, Symbol>,
    #[serde(default)]
    pub vanilla_items: VanillaItems,
    #[serde(default)]
    pub clamp_negative_tiers: bool,
}

impl RaterSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let settings_str = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read settings at {}", path.display()))?;
        serde_json::from_str(&settings_str)
            .with_context(|| format!("Unable to parse settings at {}", path.display()))
    }

    pub fn hollow_knight() -> Result<Self> {
        serde_json::from_str(include_str!("../data/settings/hollow_knight.json"))
            .context("Unable to parse built-in Hollow Knight settings")
    }

    pub fn equivalence_group(&self, item_name: &str) -> Option<&EquivalenceGroup> {
        self.equivalence_groups
            .iter()
            .find(|g| g.members.iter().any(|m| m == item_name))
    }

    pub fn rewards_for(&self, item_name: &str) -> Vec<Reward> {
        let mut out: Vec<Reward> = self
            .counter_prefixes
            .iter()
            .filter(|p| item_name.starts_with(&p.prefix))
            .map(|p| Reward {
                kind: p.kind,
                amount: p.amount,
            })
            .collect();
        if let Some(&reward) = self.named_rewards.get(item_name) {
            out.push(reward);
        }
        out
    }

    pub fn resolve_start_location(&self, name: &str) -> Option<&Symbol> {
        self.start_locations.get(name)
    }
}
