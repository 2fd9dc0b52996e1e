use log::{debug, info};
use rater_game::error::{RaterError, Result};
use rater_game::{CostKind, Item, ItemCost, RequirementTable, Symbol};
use rater_logic::evaluator::Evaluator;
use rater_logic::{AcquiredMemo, Cost, Rating, RoundMemo};
use serde_derive::{Deserialize, Serialize};

use crate::settings::RaterSettings;
use crate::spoiler_log::{ProgressionLog, ProgressionStep};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Rated(Cost),
    Unreachable,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub grubs: u32,
    pub essence: u32,
}

impl Counters {
    pub fn get(&self, kind: CostKind) -> u32 {
        match kind {
            CostKind::Grubs => self.grubs,
            CostKind::Essence => self.essence,
        }
    }

    pub fn add(&mut self, kind: CostKind, amount: u32) {
        match kind {
            CostKind::Grubs => self.grubs = self.grubs.saturating_add(amount),
            CostKind::Essence => self.essence = self.essence.saturating_add(amount),
        }
    }

    pub fn can_afford(&self, cost: Option<ItemCost>) -> bool {
        match cost {
            None => true,
            Some(c) => self.get(c.kind) >= c.amount,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Progression {
    pub outcome: Outcome,
    pub log: ProgressionLog,
}

struct ProgressionState {
    acquired: AcquiredMemo,
    round: RoundMemo,
    // Sorted by (location, item name), which fixes the tie-break between
    // equally rated candidates.
    remaining: Vec<Item>,
    counters: Counters,
}

impl ProgressionState {
    fn new(items: &[Item], starting_items: &[Symbol]) -> Self {
        let mut remaining = items.to_vec();
        remaining.sort_by(|a, b| (&a.location, &a.name).cmp(&(&b.location, &b.name)));
        remaining.dedup_by(|a, b| a.location == b.location && a.name == b.name);
        ProgressionState {
            acquired: AcquiredMemo::with_starting_items(starting_items),
            round: RoundMemo::new(),
            remaining,
            counters: Counters::default(),
        }
    }
}

/// Greedy progression: each round collects the cheapest item that can
/// currently be reached, until the goal can be reached.
pub struct Simulator<'a> {
    table: &'a RequirementTable,
    settings: &'a RaterSettings,
    evaluator: Evaluator<'a>,
}

impl<'a> Simulator<'a> {
    pub fn new(table: &'a RequirementTable, settings: &'a RaterSettings) -> Self {
        Simulator {
            table,
            settings,
            evaluator: Evaluator::new(table, &settings.ignored_symbols),
        }
    }

    fn validate(&self, items: &[Item], goal: &str) -> Result<()> {
        if self.table.get_location(goal).is_none() {
            return Err(RaterError::UnknownGoal(goal.to_owned()));
        }
        for item in items {
            if self.table.get_location(&item.location).is_none() {
                return Err(RaterError::UnknownLocation(item.location.clone()));
            }
        }
        Ok(())
    }

    fn check_goal(&self, goal: &str, state: &mut ProgressionState) -> Result<Rating> {
        state.round.clear();
        self.evaluator
            .evaluate_location(goal, &mut state.acquired, &mut state.round)
    }

    // Index and rating of the cheapest reachable remaining item. Items whose
    // grub/essence cost is not yet met are not considered.
    fn select_next(&self, state: &mut ProgressionState) -> Result<Option<(usize, Cost)>> {
        let mut best: Option<(usize, Cost)> = None;
        for (i, item) in state.remaining.iter().enumerate() {
            if !state.counters.can_afford(item.cost) {
                continue;
            }
            let rating = self.evaluator.evaluate_location(
                &item.location,
                &mut state.acquired,
                &mut state.round,
            )?;
            if let Some(cost) = rating.cost() {
                debug!("Candidate {} at {}: {}", item.name, item.location, cost);
                if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                    best = Some((i, cost));
                }
            }
        }
        Ok(best)
    }

    // Returns the symbol newly acquired, if any. Members of an equivalence
    // group are granted in the group's order regardless of which one was
    // found.
    fn collect(&self, item: &Item, cost: Cost, state: &mut ProgressionState) -> Option<Symbol> {
        for reward in self.settings.rewards_for(&item.name) {
            state.counters.add(reward.kind, reward.amount);
        }
        let symbol = match self.settings.equivalence_group(&item.name) {
            Some(group) => group
                .members
                .iter()
                .find(|m| !state.acquired.contains(m))?
                .clone(),
            None => item.name.clone(),
        };
        if state.acquired.acquire(&symbol, cost) {
            Some(symbol)
        } else {
            None
        }
    }

    pub fn rate(
        &self,
        items: &[Item],
        starting_items: &[Symbol],
        goal: &str,
    ) -> Result<Progression> {
        self.validate(items, goal)?;
        let mut state = ProgressionState::new(items, starting_items);
        let mut log = ProgressionLog::new(goal, starting_items);

        let outcome = self.run_rounds(goal, &mut state, &mut log)?;

        log.outcome = Some(outcome);
        log.remaining_locations = state.remaining.iter().map(|x| x.location.clone()).collect();
        Ok(Progression { outcome, log })
    }

    fn run_rounds(
        &self,
        goal: &str,
        state: &mut ProgressionState,
        log: &mut ProgressionLog,
    ) -> Result<Outcome> {
        let mut round_num = 0;
        while !state.remaining.is_empty() {
            round_num += 1;
            state.round.clear();
            let Some((idx, cost)) = self.select_next(state)? else {
                info!(
                    "Round {round_num}: no reachable locations among {} remaining",
                    state.remaining.len()
                );
                return Ok(Outcome::Unreachable);
            };
            let item = state.remaining.remove(idx);
            let granted = self.collect(&item, cost, state);
            info!(
                "Round {round_num}: {} at {} (rating {cost}, grubs={}, essence={})",
                item.name, item.location, state.counters.grubs, state.counters.essence
            );
            log.steps.push(ProgressionStep {
                round: round_num,
                item: item.name,
                location: item.location,
                rating: cost,
                granted,
                counters: state.counters,
            });

            if let Some(goal_cost) = self.check_goal(goal, state)?.cost() {
                info!(
                    "{goal} reachable after {round_num} rounds: {goal_cost} ({} symbols acquired)",
                    state.acquired.len()
                );
                return Ok(Outcome::Rated(goal_cost));
            }
        }
        info!("All locations exhausted without reaching {goal}");
        Ok(Outcome::Unreachable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{EquivalenceGroup, Reward};
    use rater_game::{RawDefinition, RequirementTableBuilder};

    fn build_table(defs: &[RawDefinition]) -> RequirementTable {
        let mut builder = RequirementTableBuilder::new(false);
        builder.import(defs).unwrap();
        builder.build()
    }

    #[test]
    fn test_two_location_world() {
        let table = build_table(&[
            RawDefinition::location("L1", ""),
            RawDefinition::location("Goal", "Key"),
        ]);
        let settings = RaterSettings::default();
        let simulator = Simulator::new(&table, &settings);
        let progression = simulator
            .rate(&[Item::new("Key", "L1")], &[], "Goal")
            .unwrap();
        assert_eq!(progression.outcome, Outcome::Rated(0));
        assert_eq!(progression.log.steps.len(), 1);
        assert_eq!(progression.log.steps[0].granted.as_deref(), Some("Key"));
    }

    #[test]
    fn test_resource_gate() {
        // Three grubs are free; the key behind the 3-grub cost is the only way
        // to the goal.
        let table = build_table(&[
            RawDefinition::location("G1", ""),
            RawDefinition::location("G2", ""),
            RawDefinition::location("G3", ""),
            RawDefinition::location("Father", ""),
            RawDefinition::location("Goal", "Key"),
        ]);
        let settings = RaterSettings {
            named_rewards: [(
                "Grub".to_string(),
                Reward {
                    kind: CostKind::Grubs,
                    amount: 1,
                },
            )]
            .into_iter()
            .collect(),
            ..RaterSettings::default()
        };
        let simulator = Simulator::new(&table, &settings);
        let items = [
            Item::new("Grub", "G1"),
            Item::new("Grub", "G2"),
            Item::new("Grub", "G3"),
            Item::new("Key", "Father").with_cost(CostKind::Grubs, 3),
        ];
        let progression = simulator.rate(&items, &[], "Goal").unwrap();
        assert_eq!(progression.outcome, Outcome::Rated(0));
        let steps = &progression.log.steps;
        assert_eq!(steps.len(), 4);
        // "Father" sorts first but stays gated until the third grub.
        assert_eq!(steps[2].location, "G3");
        assert_eq!(steps[2].counters.grubs, 3);
        assert_eq!(steps[3].location, "Father");
    }

    #[test]
    fn test_equivalence_group_grants_first_member() {
        let table = build_table(&[
            RawDefinition::location("Far_Shrine", ""),
            RawDefinition::location("Goal", "Y1 + Y2"),
        ]);
        let settings = RaterSettings {
            equivalence_groups: vec![EquivalenceGroup {
                members: vec!["Y1".to_string(), "Y2".to_string()],
            }],
            ..RaterSettings::default()
        };
        let simulator = Simulator::new(&table, &settings);
        let progression = simulator
            .rate(&[Item::new("Y2", "Far_Shrine")], &[], "Goal")
            .unwrap();
        assert_eq!(progression.outcome, Outcome::Unreachable);
        assert_eq!(progression.log.steps[0].granted.as_deref(), Some("Y1"));
    }

    #[test]
    fn test_undefined_requirement_exhausts_locations() {
        let table = build_table(&[
            RawDefinition::location("A", ""),
            RawDefinition::location("B", "Thing_A"),
            RawDefinition::location("Goal", "Missing_Item"),
        ]);
        let settings = RaterSettings::default();
        let simulator = Simulator::new(&table, &settings);
        let progression = simulator
            .rate(
                &[Item::new("Thing_A", "A"), Item::new("Thing_B", "B")],
                &[],
                "Goal",
            )
            .unwrap();
        assert_eq!(progression.outcome, Outcome::Unreachable);
        assert_eq!(progression.log.steps.len(), 2);
        assert!(progression.log.remaining_locations.is_empty());
    }

    #[test]
    fn test_stuck_when_nothing_reachable() {
        let table = build_table(&[
            RawDefinition::location("Locked", "Key"),
            RawDefinition::location("Goal", "Key"),
        ]);
        let settings = RaterSettings::default();
        let simulator = Simulator::new(&table, &settings);
        let progression = simulator
            .rate(&[Item::new("Lantern", "Locked")], &[], "Goal")
            .unwrap();
        assert_eq!(progression.outcome, Outcome::Unreachable);
        assert!(progression.log.steps.is_empty());
        assert_eq!(progression.log.remaining_locations, vec!["Locked"]);
    }

    #[test]
    fn test_unknown_goal_and_location() {
        let table = build_table(&[RawDefinition::location("Goal", "")]);
        let settings = RaterSettings::default();
        let simulator = Simulator::new(&table, &settings);
        assert_eq!(
            simulator.rate(&[], &[], "Elsewhere").unwrap_err(),
            RaterError::UnknownGoal("Elsewhere".to_string())
        );
        assert_eq!(
            simulator
                .rate(&[Item::new("Key", "Nowhere")], &[], "Goal")
                .unwrap_err(),
            RaterError::UnknownLocation("Nowhere".to_string())
        );
    }

    #[test]
    fn test_goal_rated_after_first_round() {
        // The starting items already satisfy the goal, but only through the
        // tier 3 loadout; the key found in the first round is cheaper.
        let table = build_table(&[
            RawDefinition::location("Goal", "Start").with_difficulty(3),
            RawDefinition::location("Goal", "Key"),
            RawDefinition::location("L1", ""),
        ]);
        let settings = RaterSettings::default();
        let simulator = Simulator::new(&table, &settings);
        let progression = simulator
            .rate(&[Item::new("Key", "L1")], &["Start".to_string()], "Goal")
            .unwrap();
        assert_eq!(progression.outcome, Outcome::Rated(0));
        assert_eq!(progression.log.steps.len(), 1);
    }

    #[test]
    fn test_goal_from_start_needs_a_reachable_location() {
        let table = build_table(&[
            RawDefinition::location("Goal", "Start"),
            RawDefinition::location("Locked", "Key"),
        ]);
        let settings = RaterSettings::default();
        let simulator = Simulator::new(&table, &settings);
        let progression = simulator
            .rate(&[Item::new("Lantern", "Locked")], &["Start".to_string()], "Goal")
            .unwrap();
        assert_eq!(progression.outcome, Outcome::Unreachable);
        assert!(progression.log.steps.is_empty());
    }
}
