use rater_game::Tier;

use crate::Cost;

/// Minimum rating of a loadout in the given tier: 0 for tier 0, otherwise
/// 10^tier.
pub fn tier_baseline(tier: Tier) -> Cost {
    if tier.0 == 0 {
        0
    } else {
        (10 as Cost).saturating_pow(tier.0)
    }
}

/// Display score for a raw progression rating.
pub fn seed_score(cost: Cost) -> f64 {
    if cost == 0 {
        0.0
    } else {
        (cost as f64).log10()
    }
}
