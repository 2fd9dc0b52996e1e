use hashbrown::HashSet;
use log::debug;
use rater_game::error::{RaterError, Result};
use rater_game::{Alternative, RequirementTable, Symbol};

use crate::helpers::tier_baseline;
use crate::{AcquiredMemo, Cost, Rating, RoundMemo};

fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.trim().is_empty() && !symbol.contains(['+', '|', '(', ')'])
}

/// Rates requirements against a world state. Holds no state of its own: all
/// memoization lives in the memos passed to each call.
pub struct Evaluator<'a> {
    table: &'a RequirementTable,
    ignored: &'a HashSet<Symbol>,
}

impl<'a> Evaluator<'a> {
    pub fn new(table: &'a RequirementTable, ignored: &'a HashSet<Symbol>) -> Self {
        Evaluator { table, ignored }
    }

    /// Rates a macro or item symbol. A finite rating is committed to
    /// `acquired` for good; an unreachable one is only remembered for the
    /// current round, and not at all if it depended on a cycle still being
    /// evaluated.
    pub fn evaluate(
        &self,
        symbol: &str,
        acquired: &mut AcquiredMemo,
        round: &mut RoundMemo,
    ) -> Result<Rating> {
        if self.ignored.contains(symbol) {
            return Ok(Rating::Cost(0));
        }
        if let Some(cost) = acquired.get(symbol) {
            return Ok(Rating::Cost(cost));
        }
        if let Some(rating) = round.get(symbol) {
            return Ok(rating);
        }
        let Some(alternatives) = self.table.get_macro(symbol) else {
            // Item not yet obtained (or a typo in the logic).
            return Ok(Rating::Unreachable);
        };

        round.set(symbol, Rating::Cyclic);
        let (rating, uncertain) =
            self.rate_alternatives(symbol, alternatives, acquired, round, false)?;
        match rating {
            Rating::Cost(cost) => {
                round.forget(symbol);
                acquired.acquire(symbol, cost);
            }
            _ if uncertain => round.forget(symbol),
            _ => round.set(symbol, Rating::Unreachable),
        }
        Ok(rating)
    }

    /// Rates a location. Location ratings are never memoized, since the
    /// location name may coincide with the name of the item found there.
    pub fn evaluate_location(
        &self,
        location: &str,
        acquired: &mut AcquiredMemo,
        round: &mut RoundMemo,
    ) -> Result<Rating> {
        let Some(alternatives) = self.table.get_location(location) else {
            return Err(RaterError::UnknownLocation(location.to_owned()));
        };
        let (rating, _) = self.rate_alternatives(location, alternatives, acquired, round, true)?;
        debug!("Location {location}: {rating:?}");
        Ok(rating)
    }

    // Returns the cheapest alternative, and whether any alternative was cut
    // short by a symbol still being evaluated.
    fn rate_alternatives(
        &self,
        name: &str,
        alternatives: &[Alternative],
        acquired: &mut AcquiredMemo,
        round: &mut RoundMemo,
        cache_unreachable_members: bool,
    ) -> Result<(Rating, bool)> {
        let mut best: Option<Cost> = None;
        let mut uncertain = false;
        for alternative in alternatives {
            let mut clause_cost: Option<Cost> = Some(0);
            for member in &alternative.clause {
                if !is_valid_symbol(member) {
                    return Err(RaterError::InvalidRequirement {
                        symbol: name.to_owned(),
                        chain: vec![],
                    });
                }
                match self
                    .evaluate(member, acquired, round)
                    .map_err(|e| e.within(name))?
                {
                    Rating::Cost(cost) => {
                        clause_cost = clause_cost.map(|c| c.saturating_add(cost));
                    }
                    Rating::Cyclic => {
                        uncertain = true;
                        clause_cost = None;
                        break;
                    }
                    Rating::Unreachable => {
                        if cache_unreachable_members {
                            round.set_if_absent(member, Rating::Unreachable);
                        }
                        clause_cost = None;
                        break;
                    }
                }
            }
            if let Some(clause_cost) = clause_cost {
                let contribution = Cost::max(clause_cost, tier_baseline(alternative.tier));
                best = Some(best.map_or(contribution, |b| b.min(contribution)));
            }
        }
        let rating = match best {
            Some(cost) => Rating::Cost(cost),
            None => Rating::Unreachable,
        };
        Ok((rating, uncertain))
    }
}
