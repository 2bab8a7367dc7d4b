//! In-memory representation of a parsed pricing ruleset.
//!
//! A `Ruleset` is a date-bounded pricing policy: age brackets map an age to
//! a base price, role discounts and the family discount reduce it. The
//! struct is a read-only value once built by the parser; nothing in the
//! engine mutates it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::money::{MoneyCents, Percent};

/// One `[min_age, max_age] -> price` rule.
///
/// Brackets are matched in declared order and may overlap; the first match
/// wins. Gaps are legal and price at 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AgeGroup {
    pub min_age: u32,
    pub max_age: u32,
    pub price: MoneyCents,
}

impl AgeGroup {
    #[must_use]
    pub fn contains(&self, age_years: u32) -> bool {
        self.min_age <= age_years && age_years <= self.max_age
    }
}

/// Percentage reduction tied to a participant's functional role.
///
/// `max_count` caps how many participants may hold the discounted role. It
/// is carried for display and import tooling but **not** enforced by the
/// calculator: enforcement would need a running count across a whole batch,
/// which the per-participant computation deliberately does not keep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoleDiscount {
    pub discount_percent: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,
}

/// Sibling discount tiers keyed by birth-order rank within a family.
///
/// `first_child_percent` was added after the format shipped; rulesets
/// authored without it keep parsing and behave as before (0%).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FamilyDiscount {
    pub enabled: bool,
    #[serde(skip_serializing_if = "percent_is_zero")]
    pub first_child_percent: Percent,
    pub second_child_percent: Percent,
    pub third_plus_child_percent: Percent,
}

impl FamilyDiscount {
    /// Discount tier for a 1-based family ordinal.
    #[must_use]
    pub fn percent_for_ordinal(&self, ordinal: u32) -> Percent {
        if !self.enabled {
            return Percent::ZERO;
        }
        match ordinal {
            0 => Percent::ZERO,
            1 => self.first_child_percent,
            2 => self.second_child_percent,
            _ => self.third_plus_child_percent,
        }
    }

    pub(crate) fn is_default(value: &FamilyDiscount) -> bool {
        *value == FamilyDiscount::default()
    }
}

fn is_true(value: &bool) -> bool {
    *value
}

fn percent_is_zero(value: &Percent) -> bool {
    value.is_zero()
}

/// A versioned, date-bounded pricing policy.
///
/// Field names mirror the YAML wire format (`type` maps to [`kind`]); see
/// the parser module for the validation rules.
///
/// [`kind`]: Ruleset::kind
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ruleset {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    /// Inactive rulesets parse fine but are skipped by the selector.
    #[serde(skip_serializing_if = "is_true")]
    pub active: bool,
    pub age_groups: Vec<AgeGroup>,
    /// Keys are normalized to lowercase at parse time; look up with
    /// [`role_discount`](Ruleset::role_discount).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub role_discounts: BTreeMap<String, RoleDiscount>,
    #[serde(skip_serializing_if = "FamilyDiscount::is_default")]
    pub family_discount: FamilyDiscount,
}

impl Ruleset {
    /// Base price for an age: first declared bracket containing the age
    /// wins, an uncovered age prices at 0.
    #[must_use]
    pub fn base_price_for_age(&self, age_years: u32) -> MoneyCents {
        self.age_groups
            .iter()
            .find(|group| group.contains(age_years))
            .map(|group| group.price)
            .unwrap_or(MoneyCents::ZERO)
    }

    /// Case-insensitive role discount lookup.
    #[must_use]
    pub fn role_discount(&self, role: &str) -> Option<&RoleDiscount> {
        self.role_discounts.get(&role.trim().to_lowercase())
    }

    /// Returns `true` if `date` falls inside the inclusive validity window.
    #[must_use]
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_until
    }

    /// Serializes the ruleset back into its YAML wire format.
    ///
    /// Optional blocks are omitted when empty, so re-parsing the output
    /// yields an equal model.
    pub fn to_yaml(&self) -> Result<String, crate::PricingError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The documented sample ruleset, used by operator tooling as a
    /// starting point for new files.
    #[must_use]
    pub fn example() -> Self {
        let mut role_discounts = BTreeMap::new();
        role_discounts.insert(
            "betreuer".to_string(),
            RoleDiscount {
                discount_percent: Percent::from_basis_points(5_000).unwrap_or(Percent::ZERO),
                max_count: Some(10),
            },
        );
        role_discounts.insert(
            "kueche".to_string(),
            RoleDiscount {
                discount_percent: Percent::FULL,
                max_count: Some(2),
            },
        );
        Self {
            name: "Kinderfreizeit 2024".to_string(),
            kind: "kinder".to_string(),
            description: None,
            valid_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            valid_until: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            active: true,
            age_groups: vec![
                AgeGroup {
                    min_age: 6,
                    max_age: 9,
                    price: MoneyCents::new(140_00),
                },
                AgeGroup {
                    min_age: 10,
                    max_age: 12,
                    price: MoneyCents::new(150_00),
                },
            ],
            role_discounts,
            family_discount: FamilyDiscount {
                enabled: true,
                first_child_percent: Percent::ZERO,
                second_child_percent: Percent::from_basis_points(1_000)
                    .unwrap_or(Percent::ZERO),
                third_plus_child_percent: Percent::from_basis_points(2_000)
                    .unwrap_or(Percent::ZERO),
            },
        }
    }
}
