//! Family price aggregation.
//!
//! Family ordinals are derived, never stored: members are ranked by birth
//! date ascending (the oldest sibling is ordinal 1), ties keep the input
//! order, and each member is then priced with its rank. Re-ordering the
//! input never changes anyone's ordinal or price.

use chrono::NaiveDate;

use crate::{
    pricing::{PriceBreakdown, compute_price},
    ruleset::Ruleset,
};

/// Input row for the family aggregator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FamilyMember {
    pub age_years: u32,
    pub role: String,
    pub birth_date: NaiveDate,
}

/// Prices every member of one family under `ruleset`.
///
/// Returns one breakdown per member, aligned with the **input** order; the
/// assigned ordinal travels in [`PriceBreakdown::family_ordinal`] for
/// display and audit.
#[must_use]
pub fn compute_family_prices(members: &[FamilyMember], ruleset: &Ruleset) -> Vec<PriceBreakdown> {
    // Stable sort of indices: equal birth dates keep first-seen order.
    let mut order: Vec<usize> = (0..members.len()).collect();
    order.sort_by_key(|&index| members[index].birth_date);

    let mut ordinals = vec![0u32; members.len()];
    for (rank, &index) in order.iter().enumerate() {
        ordinals[index] = rank as u32 + 1;
    }

    members
        .iter()
        .zip(&ordinals)
        .map(|(member, &ordinal)| {
            compute_price(
                member.age_years,
                &member.role,
                ruleset,
                Some(ordinal),
                None,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        money::{MoneyCents, Percent},
        ruleset::{AgeGroup, FamilyDiscount},
    };
    use std::collections::BTreeMap;

    fn percent(value: f64) -> Percent {
        Percent::from_value_f64(value).unwrap()
    }

    fn family_ruleset() -> Ruleset {
        Ruleset {
            age_groups: vec![AgeGroup {
                min_age: 0,
                max_age: 17,
                price: MoneyCents::new(150_00),
            }],
            role_discounts: BTreeMap::new(),
            family_discount: FamilyDiscount {
                enabled: true,
                first_child_percent: Percent::ZERO,
                second_child_percent: percent(10.0),
                third_plus_child_percent: percent(20.0),
            },
            ..Ruleset::example()
        }
    }

    fn member(age: u32, birth: (i32, u32, u32)) -> FamilyMember {
        FamilyMember {
            age_years: age,
            role: "teilnehmer".to_string(),
            birth_date: NaiveDate::from_ymd_opt(birth.0, birth.1, birth.2).unwrap(),
        }
    }

    #[test]
    fn three_children_get_tiered_prices() {
        let members = vec![
            member(12, (2012, 3, 1)),
            member(10, (2014, 6, 15)),
            member(8, (2016, 9, 30)),
        ];
        let breakdowns = compute_family_prices(&members, &family_ruleset());
        let finals: Vec<i64> = breakdowns.iter().map(|b| b.final_price.cents()).collect();
        assert_eq!(finals, vec![150_00, 135_00, 120_00]);
        assert_eq!(finals.iter().sum::<i64>(), 405_00);
        let ordinals: Vec<Option<u32>> =
            breakdowns.iter().map(|b| b.family_ordinal).collect();
        assert_eq!(ordinals, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn earliest_birth_date_is_ordinal_one_regardless_of_input_order() {
        let oldest = member(12, (2012, 3, 1));
        let middle = member(10, (2014, 6, 15));
        let youngest = member(8, (2016, 9, 30));

        let shuffled = vec![youngest.clone(), oldest.clone(), middle.clone()];
        let breakdowns = compute_family_prices(&shuffled, &family_ruleset());

        // Output is aligned with input order, ordinals follow birth dates.
        assert_eq!(breakdowns[0].family_ordinal, Some(3));
        assert_eq!(breakdowns[1].family_ordinal, Some(1));
        assert_eq!(breakdowns[2].family_ordinal, Some(2));
        assert_eq!(breakdowns[0].final_price, MoneyCents::new(120_00));
        assert_eq!(breakdowns[1].final_price, MoneyCents::new(150_00));
        assert_eq!(breakdowns[2].final_price, MoneyCents::new(135_00));
    }

    #[test]
    fn reordering_input_does_not_change_prices() {
        let a = member(12, (2012, 3, 1));
        let b = member(10, (2014, 6, 15));
        let c = member(8, (2016, 9, 30));

        let forward = compute_family_prices(&[a.clone(), b.clone(), c.clone()], &family_ruleset());
        let backward = compute_family_prices(&[c.clone(), b.clone(), a.clone()], &family_ruleset());

        assert_eq!(forward[0], backward[2]);
        assert_eq!(forward[1], backward[1]);
        assert_eq!(forward[2], backward[0]);
    }

    #[test]
    fn birth_date_ties_keep_input_order() {
        // Twins: the first-seen twin gets the lower ordinal.
        let twin_a = member(10, (2014, 6, 15));
        let twin_b = member(10, (2014, 6, 15));
        let breakdowns = compute_family_prices(&[twin_a, twin_b], &family_ruleset());
        assert_eq!(breakdowns[0].family_ordinal, Some(1));
        assert_eq!(breakdowns[1].family_ordinal, Some(2));
    }

    #[test]
    fn single_member_family_gets_first_child_tier() {
        let breakdowns =
            compute_family_prices(&[member(10, (2014, 6, 15))], &family_ruleset());
        assert_eq!(breakdowns[0].family_ordinal, Some(1));
        assert_eq!(breakdowns[0].final_price, MoneyCents::new(150_00));
    }

    #[test]
    fn empty_family_yields_empty_result() {
        let breakdowns = compute_family_prices(&[], &family_ruleset());
        assert!(breakdowns.is_empty());
    }
}
