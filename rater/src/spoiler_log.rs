use rater_game::Symbol;
use rater_logic::Cost;
use rater_logic::helpers::seed_score;
use serde::{Deserialize, Serialize};

use crate::progression::{Counters, Outcome};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProgressionStep {
    pub round: usize,
    pub item: Symbol,
    pub location: Symbol,
    pub rating: Cost,
    // None if the item gave nothing new, e.g. a third copy of a two-item group.
    pub granted: Option<Symbol>,
    pub counters: Counters,
}

/// Order in which the simulation collected items, for explaining a rating.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProgressionLog {
    pub goal: Symbol,
    pub starting_items: Vec<Symbol>,
    pub steps: Vec<ProgressionStep>,
    pub outcome: Option<Outcome>,
    pub remaining_locations: Vec<Symbol>,
}

impl ProgressionLog {
    pub fn new(goal: &str, starting_items: &[Symbol]) -> Self {
        ProgressionLog {
            goal: goal.to_owned(),
            starting_items: starting_items.to_vec(),
            steps: vec![],
            outcome: None,
            remaining_locations: vec![],
        }
    }

    /// The step which set the final rating: the most expensive collection.
    pub fn hardest_step(&self) -> Option<&ProgressionStep> {
        self.steps.iter().max_by_key(|s| s.rating)
    }

    pub fn summary(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .steps
            .iter()
            .map(|s| {
                let granted = match &s.granted {
                    Some(g) if g != &s.item => format!(" (as {g})"),
                    Some(_) => String::new(),
                    None => " (nothing new)".to_string(),
                };
                format!(
                    "{:>3}. {}{} at {} [{:.2}]",
                    s.round,
                    s.item,
                    granted,
                    s.location,
                    seed_score(s.rating)
                )
            })
            .collect();
        match self.outcome {
            Some(Outcome::Rated(cost)) => {
                out.push(format!("{} reached: {:.2}", self.goal, seed_score(cost)))
            }
            Some(Outcome::Unreachable) => out.push(format!(
                "{} not reached; {} locations left",
                self.goal,
                self.remaining_locations.len()
            )),
            None => {}
        }
        out
    }
}
