//! The price calculator.
//!
//! Pure per-participant computation: it never fails and never touches
//! shared state. All the rules that are easy to get wrong live here:
//!
//! - brackets match in declared order, uncovered ages price at 0;
//! - role and family discounts are both computed against the **same** base
//!   price and then subtracted, never compounded multiplicatively;
//! - the result is not floored at 0: combined percentages above 100 drive
//!   the final price negative, and that is returned as data for the caller
//!   to flag;
//! - a manual override replaces the final price but leaves the computed
//!   fields in place for audit display.

use serde::Serialize;

use crate::{
    money::{MoneyCents, Percent},
    ruleset::Ruleset,
};

/// Itemized result of one price computation.
///
/// Unless `manual_override` is set, `final_price = base_price -
/// role_discount - family_discount`. With an override the computed fields
/// are retained for display only and are not summed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub base_price: MoneyCents,
    pub role_discount: MoneyCents,
    pub family_discount: MoneyCents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_override: Option<MoneyCents>,
    pub final_price: MoneyCents,
    /// 1-based birth-order rank used for the family tier, when one was
    /// supplied (directly or by the family aggregator).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_ordinal: Option<u32>,
}

/// Computes the price for one participant under `ruleset`.
///
/// `family_ordinal` is the participant's 1-based rank among the family's
/// members ordered by birth date; pass `None` for participants without a
/// family grouping (no family tier applies). `manual_override`, when set,
/// fully determines the final price.
///
/// Deterministic: identical inputs yield identical breakdowns.
#[must_use]
pub fn compute_price(
    age_years: u32,
    role: &str,
    ruleset: &Ruleset,
    family_ordinal: Option<u32>,
    manual_override: Option<MoneyCents>,
) -> PriceBreakdown {
    let base_price = ruleset.base_price_for_age(age_years);

    let role_percent = ruleset
        .role_discount(role)
        .map(|discount| discount.discount_percent)
        .unwrap_or(Percent::ZERO);
    let role_discount = base_price.apply_percent(role_percent);

    let family_percent = family_ordinal
        .map(|ordinal| ruleset.family_discount.percent_for_ordinal(ordinal))
        .unwrap_or(Percent::ZERO);
    let family_discount = base_price.apply_percent(family_percent);

    let computed = base_price - role_discount - family_discount;
    let final_price = manual_override.unwrap_or(computed);

    PriceBreakdown {
        base_price,
        role_discount,
        family_discount,
        manual_override,
        final_price,
        family_ordinal,
    }
}
