pub mod error;
pub mod expression;

use hashbrown::HashMap;
use log::warn;
use serde::{Deserialize, Serialize};
use strum_macros::{EnumString, VariantNames};

use crate::error::{RaterError, Result};
use crate::expression::compile_expression;

pub type Symbol = String; // Name of an item, location or macro as used in logic strings
pub type Clause = Vec<Symbol>; // Symbols which must all be obtained together (one "loadout")

/// Difficulty bucket of a loadout. Tier 0 is trivial; higher tiers act as an
/// order-of-magnitude floor on the loadout's rating.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Tier(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alternative {
    pub clause: Clause,
    pub tier: Tier,
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    VariantNames,
    Serialize,
    Deserialize,
)]
pub enum CostKind {
    Grubs,
    Essence,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemCost {
    pub kind: CostKind,
    pub amount: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Item {
    pub name: Symbol,
    pub location: Symbol,
    #[serde(default)]
    pub cost: Option<ItemCost>,
}

impl Item {
    pub fn new(name: &str, location: &str) -> Self {
        Item {
            name: name.to_owned(),
            location: location.to_owned(),
            cost: None,
        }
    }

    /// An item left at its own vanilla location (which shares its name).
    pub fn vanilla(name: &str) -> Self {
        Item::new(name, name)
    }

    pub fn with_cost(mut self, kind: CostKind, amount: u32) -> Self {
        self.cost = Some(ItemCost { kind, amount });
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Location,
    Macro,
}

impl DefinitionKind {
    fn namespace_name(&self) -> &'static str {
        match self {
            DefinitionKind::Location => "locations",
            DefinitionKind::Macro => "macros",
        }
    }
}

/// A logic string as it comes from the game data, before compilation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDefinition {
    pub name: Symbol,
    pub kind: DefinitionKind,
    #[serde(default)]
    pub logic: String,
    #[serde(default)]
    pub difficulty: i64,
}

impl RawDefinition {
    pub fn new(kind: DefinitionKind, name: &str, logic: &str) -> Self {
        RawDefinition {
            name: name.to_owned(),
            kind,
            logic: logic.to_owned(),
            difficulty: 0,
        }
    }

    pub fn location(name: &str, logic: &str) -> Self {
        RawDefinition::new(DefinitionKind::Location, name, logic)
    }

    pub fn macro_def(name: &str, logic: &str) -> Self {
        RawDefinition::new(DefinitionKind::Macro, name, logic)
    }

    pub fn with_difficulty(mut self, difficulty: i64) -> Self {
        self.difficulty = difficulty;
        self
    }
}

// Locations and macros live in separate namespaces: a vanilla item sits at a
// location of the same name, and that location must never count as the item.
#[derive(Default, Clone, Debug)]
pub struct RequirementTable {
    pub locations: HashMap<Symbol, Vec<Alternative>>,
    pub macros: HashMap<Symbol, Vec<Alternative>>,
}

impl RequirementTable {
    pub fn get_location(&self, name: &str) -> Option<&[Alternative]> {
        self.locations.get(name).map(|x| x.as_slice())
    }

    pub fn get_macro(&self, name: &str) -> Option<&[Alternative]> {
        self.macros.get(name).map(|x| x.as_slice())
    }

    pub fn num_alternatives(&self) -> usize {
        self.locations
            .values()
            .chain(self.macros.values())
            .map(|x| x.len())
            .sum()
    }

    fn namespace_mut(&mut self, kind: DefinitionKind) -> &mut HashMap<Symbol, Vec<Alternative>> {
        match kind {
            DefinitionKind::Location => &mut self.locations,
            DefinitionKind::Macro => &mut self.macros,
        }
    }
}

pub struct RequirementTableBuilder {
    table: RequirementTable,
    clamp_negative_tiers: bool,
}

impl RequirementTableBuilder {
    pub fn new(clamp_negative_tiers: bool) -> Self {
        RequirementTableBuilder {
            table: RequirementTable::default(),
            clamp_negative_tiers,
        }
    }

    fn validate_tier(
        &self,
        kind: DefinitionKind,
        name: &str,
        logic: &str,
        difficulty: i64,
    ) -> Result<Tier> {
        if difficulty >= 0 {
            return Ok(Tier(u32::try_from(difficulty).unwrap_or(u32::MAX)));
        }
        let context = format!(
            "{} -> {} -> loadout \"{}\"",
            kind.namespace_name(),
            name,
            logic
        );
        if self.clamp_negative_tiers {
            warn!("Treating negative difficulty {difficulty} as 0: {context}");
            Ok(Tier(0))
        } else {
            Err(RaterError::NegativeTier { context })
        }
    }

    /// Compiles `logic` and appends one alternative per resulting clause to
    /// the definition of `name`. Earlier alternatives are never replaced.
    pub fn add(
        &mut self,
        kind: DefinitionKind,
        name: &str,
        logic: &str,
        difficulty: i64,
    ) -> Result<()> {
        let clauses = compile_expression(logic).map_err(|e| RaterError::InDefinition {
            name: name.to_owned(),
            source: Box::new(e),
        })?;
        let tier = self.validate_tier(kind, name, logic, difficulty)?;
        self.table
            .namespace_mut(kind)
            .entry(name.to_owned())
            .or_default()
            .extend(clauses.into_iter().map(|clause| Alternative { clause, tier }));
        Ok(())
    }

    pub fn add_definition(&mut self, def: &RawDefinition) -> Result<()> {
        self.add(def.kind, &def.name, &def.logic, def.difficulty)
    }

    /// Bulk pass over definitions extracted from the game data.
    pub fn import(&mut self, defs: &[RawDefinition]) -> Result<()> {
        for def in defs {
            self.add_definition(def)?;
        }
        Ok(())
    }

    /// Hand-authored definitions layered on top of an import.
    pub fn append(&mut self, defs: &[RawDefinition]) -> Result<()> {
        self.import(defs)
    }

    pub fn build(self) -> RequirementTable {
        self.table
    }
}
