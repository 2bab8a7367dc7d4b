//! Ruleset selection for a reference date.

use chrono::NaiveDate;
use tracing::debug;

use crate::{PricingError, ResultEngine, ruleset::Ruleset};

/// Picks the ruleset that applies on `date` (usually the event start date).
///
/// Candidates are the active rulesets whose inclusive validity window
/// contains the date. With several candidates the most recently starting
/// window wins (latest `valid_from`); a tie on `valid_from` is refused with
/// [`PricingError::AmbiguousRuleset`] rather than guessed at.
pub fn select_ruleset(rulesets: &[Ruleset], date: NaiveDate) -> ResultEngine<&Ruleset> {
    let candidates: Vec<&Ruleset> = rulesets
        .iter()
        .filter(|ruleset| ruleset.active && ruleset.is_valid_on(date))
        .collect();

    let Some(latest_from) = candidates.iter().map(|r| r.valid_from).max() else {
        return Err(PricingError::NoApplicableRuleset(date));
    };

    let mut latest: Vec<&Ruleset> = candidates
        .into_iter()
        .filter(|ruleset| ruleset.valid_from == latest_from)
        .collect();

    if latest.len() > 1 {
        return Err(PricingError::AmbiguousRuleset {
            date,
            names: latest.iter().map(|r| r.name.clone()).collect(),
        });
    }

    // Exactly one element left.
    let selected = latest.swap_remove(0);
    debug!(ruleset = %selected.name, %date, "selected ruleset");
    Ok(selected)
}
