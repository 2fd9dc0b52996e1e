pub mod evaluator;
pub mod helpers;

use hashbrown::HashMap;
use rater_game::Symbol;
use serde::{Deserialize, Serialize};

pub type Cost = u64; // Estimated acquisition cost of a symbol under the current world state

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Unreachable,
    // Evaluation of this symbol is still in progress further up the stack.
    Cyclic,
    Cost(Cost),
}

impl Rating {
    pub fn cost(&self) -> Option<Cost> {
        match self {
            Rating::Cost(c) => Some(*c),
            _ => None,
        }
    }
}

/// Symbols obtained so far, with the cost at which each was obtained. Entries
/// are facts about the world and are never removed or overwritten.
#[derive(Clone, Debug, Default)]
pub struct AcquiredMemo {
    costs: HashMap<Symbol, Cost>,
}

impl AcquiredMemo {
    pub fn new() -> Self {
        AcquiredMemo::default()
    }

    pub fn with_starting_items<S: AsRef<str>>(items: &[S]) -> Self {
        let mut memo = AcquiredMemo::new();
        for item in items {
            memo.acquire(item.as_ref(), 0);
        }
        memo
    }

    pub fn get(&self, symbol: &str) -> Option<Cost> {
        self.costs.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.costs.contains_key(symbol)
    }

    /// Returns false, leaving the existing cost in place, if `symbol` was
    /// already acquired.
    pub fn acquire(&mut self, symbol: &str, cost: Cost) -> bool {
        if self.costs.contains_key(symbol) {
            return false;
        }
        self.costs.insert(symbol.to_owned(), cost);
        true
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

/// Scratch ratings for a single reachability pass; cleared every round.
#[derive(Clone, Debug, Default)]
pub struct RoundMemo {
    ratings: HashMap<Symbol, Rating>,
}

impl RoundMemo {
    pub fn new() -> Self {
        RoundMemo::default()
    }

    pub fn clear(&mut self) {
        self.ratings.clear();
    }

    pub fn get(&self, symbol: &str) -> Option<Rating> {
        self.ratings.get(symbol).copied()
    }

    pub fn set(&mut self, symbol: &str, rating: Rating) {
        self.ratings.insert(symbol.to_owned(), rating);
    }

    pub fn set_if_absent(&mut self, symbol: &str, rating: Rating) {
        if !self.ratings.contains_key(symbol) {
            self.ratings.insert(symbol.to_owned(), rating);
        }
    }

    pub fn forget(&mut self, symbol: &str) {
        self.ratings.remove(symbol);
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}
