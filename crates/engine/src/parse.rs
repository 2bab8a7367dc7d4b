//! Ruleset parser and validator.
//!
//! Turns a YAML document into a [`Ruleset`]. Malformed YAML fails
//! immediately with [`PricingError::Yaml`]; a well-formed document is then
//! checked field by field and **every** violation is collected into a
//! [`ValidationErrors`], so an author can correct a file in one pass.
//!
//! The wire format is the historical one:
//!
//! ```yaml
//! name: Kinderfreizeit 2024
//! type: kinder
//! valid_from: 2024-01-01
//! valid_until: 2024-12-31
//! age_groups:
//!   - min_age: 6
//!     max_age: 9
//!     price: 140.00
//! role_discounts:
//!   betreuer:
//!     discount_percent: 50
//!     max_count: 10
//! family_discount:
//!   enabled: true
//!   second_child_percent: 10
//!   third_plus_child_percent: 20
//! ```
//!
//! `first_child_percent` and `active` were added later and default to `0`
//! and `true`, so older files keep parsing unchanged. Age brackets are not
//! required to be contiguous or non-overlapping; coverage gaps price at 0
//! and the first declared match wins.

use std::{collections::BTreeMap, fs, path::Path};

use chrono::NaiveDate;
use serde::Deserialize;
use serde_yaml::Value;

use crate::{
    ResultEngine,
    error::ValidationErrors,
    money::{MoneyCents, Percent},
    ruleset::{AgeGroup, FamilyDiscount, RoleDiscount, Ruleset},
};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw document shape: everything optional, numbers kept as YAML values so
/// validation (not deserialization) decides what is acceptable and can keep
/// going after the first defect.
#[derive(Debug, Deserialize)]
struct RawRuleset {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
    valid_from: Option<Value>,
    valid_until: Option<Value>,
    active: Option<bool>,
    age_groups: Option<Vec<RawAgeGroup>>,
    role_discounts: Option<BTreeMap<String, RawRoleDiscount>>,
    family_discount: Option<RawFamilyDiscount>,
}

#[derive(Debug, Deserialize)]
struct RawAgeGroup {
    min_age: Option<Value>,
    max_age: Option<Value>,
    price: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawRoleDiscount {
    discount_percent: Option<Value>,
    max_count: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawFamilyDiscount {
    enabled: Option<bool>,
    first_child_percent: Option<Value>,
    second_child_percent: Option<Value>,
    third_plus_child_percent: Option<Value>,
}

/// Parses and validates a ruleset document.
pub fn parse_ruleset(text: &str) -> ResultEngine<Ruleset> {
    let raw: RawRuleset = serde_yaml::from_str(text)?;
    let mut errors = ValidationErrors::new();

    let name = required_text(raw.name, "name", &mut errors);
    let kind = required_text(raw.kind, "type", &mut errors);
    let valid_from = required_date(raw.valid_from.as_ref(), "valid_from", &mut errors);
    let valid_until = required_date(raw.valid_until.as_ref(), "valid_until", &mut errors);
    if let (Some(from), Some(until)) = (valid_from, valid_until)
        && from > until
    {
        errors.push("valid_from", "must not be after valid_until");
    }

    let age_groups = validate_age_groups(raw.age_groups, &mut errors);
    let role_discounts = validate_role_discounts(raw.role_discounts, &mut errors);
    let family_discount = validate_family_discount(raw.family_discount, &mut errors);

    // With a clean accumulator every `Option` is `Some`; the fallbacks are
    // only reached on the error path, where the value is discarded.
    let ruleset = Ruleset {
        name: name.unwrap_or_default(),
        kind: kind.unwrap_or_default(),
        description: raw.description,
        valid_from: valid_from.unwrap_or_default(),
        valid_until: valid_until.unwrap_or_default(),
        active: raw.active.unwrap_or(true),
        age_groups,
        role_discounts,
        family_discount,
    };
    errors.into_result(ruleset)
}

/// Reads and parses a ruleset file.
pub fn parse_ruleset_file(path: &Path) -> ResultEngine<Ruleset> {
    let text = fs::read_to_string(path)?;
    parse_ruleset(&text)
}

fn required_text(
    value: Option<String>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Some(_) => {
            errors.push(field, "must not be empty");
            None
        }
        None => {
            errors.push(field, "is required");
            None
        }
    }
}

fn required_date(
    value: Option<&Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    let Some(value) = value else {
        errors.push(field, "is required");
        return None;
    };
    let Some(text) = value.as_str() else {
        errors.push(field, "must be a date in YYYY-MM-DD format");
        return None;
    };
    match NaiveDate::parse_from_str(text.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(field, format!("invalid date {text:?}, expected YYYY-MM-DD"));
            None
        }
    }
}

fn validate_age_groups(
    raw: Option<Vec<RawAgeGroup>>,
    errors: &mut ValidationErrors,
) -> Vec<AgeGroup> {
    let Some(raw_groups) = raw else {
        errors.push("age_groups", "is required");
        return Vec::new();
    };
    if raw_groups.is_empty() {
        errors.push("age_groups", "must define at least one age group");
        return Vec::new();
    }

    let mut groups = Vec::with_capacity(raw_groups.len());
    for (index, group) in raw_groups.iter().enumerate() {
        let prefix = format!("age_groups[{index}]");
        let min_age = required_age(
            group.min_age.as_ref(),
            &format!("{prefix}.min_age"),
            errors,
        );
        let max_age = required_age(
            group.max_age.as_ref(),
            &format!("{prefix}.max_age"),
            errors,
        );
        let price = required_money(group.price.as_ref(), &format!("{prefix}.price"), errors);

        if let (Some(min), Some(max)) = (min_age, max_age)
            && min > max
        {
            errors.push(&prefix, "min_age must not exceed max_age");
        }
        if let Some(amount) = price
            && amount.is_negative()
        {
            errors.push(format!("{prefix}.price"), "must be >= 0");
        }

        if let (Some(min_age), Some(max_age), Some(price)) = (min_age, max_age, price) {
            groups.push(AgeGroup {
                min_age,
                max_age,
                price,
            });
        }
    }
    groups
}

fn validate_role_discounts(
    raw: Option<BTreeMap<String, RawRoleDiscount>>,
    errors: &mut ValidationErrors,
) -> BTreeMap<String, RoleDiscount> {
    let mut discounts = BTreeMap::new();
    let Some(raw_discounts) = raw else {
        return discounts;
    };

    for (role, raw_discount) in raw_discounts {
        let prefix = format!("role_discounts.{role}");
        // Missing percent keeps the historical meaning: 0%.
        let percent = optional_percent(
            raw_discount.discount_percent.as_ref(),
            &format!("{prefix}.discount_percent"),
            errors,
        );
        let max_count = optional_count(
            raw_discount.max_count.as_ref(),
            &format!("{prefix}.max_count"),
            errors,
        );
        discounts.insert(
            role.trim().to_lowercase(),
            RoleDiscount {
                discount_percent: percent,
                max_count,
            },
        );
    }
    discounts
}

fn validate_family_discount(
    raw: Option<RawFamilyDiscount>,
    errors: &mut ValidationErrors,
) -> FamilyDiscount {
    let Some(raw_discount) = raw else {
        return FamilyDiscount::default();
    };

    let enabled = raw_discount.enabled.unwrap_or(false);
    let first = optional_percent(
        raw_discount.first_child_percent.as_ref(),
        "family_discount.first_child_percent",
        errors,
    );
    let second = family_tier_percent(
        raw_discount.second_child_percent.as_ref(),
        "family_discount.second_child_percent",
        enabled,
        errors,
    );
    let third = family_tier_percent(
        raw_discount.third_plus_child_percent.as_ref(),
        "family_discount.third_plus_child_percent",
        enabled,
        errors,
    );

    FamilyDiscount {
        enabled,
        first_child_percent: first,
        second_child_percent: second,
        third_plus_child_percent: third,
    }
}

/// Tier percent that is mandatory when the family discount is enabled.
fn family_tier_percent(
    value: Option<&Value>,
    field: &str,
    enabled: bool,
    errors: &mut ValidationErrors,
) -> Percent {
    if value.is_none() && enabled {
        errors.push(field, "is required when family_discount is enabled");
        return Percent::ZERO;
    }
    optional_percent(value, field, errors)
}

fn required_age(value: Option<&Value>, field: &str, errors: &mut ValidationErrors) -> Option<u32> {
    let Some(value) = value else {
        errors.push(field, "is required");
        return None;
    };
    match value.as_u64().and_then(|age| u32::try_from(age).ok()) {
        Some(age) => Some(age),
        None => {
            errors.push(field, "must be a non-negative integer");
            None
        }
    }
}

fn required_money(
    value: Option<&Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<MoneyCents> {
    let Some(value) = value else {
        errors.push(field, "is required");
        return None;
    };
    let parsed = match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| "must be an amount".to_string())
            .and_then(|v| MoneyCents::from_major_f64(v).map_err(|e| e.to_string())),
        Value::String(text) => text.parse::<MoneyCents>().map_err(|e| e.to_string()),
        _ => Err("must be an amount".to_string()),
    };
    match parsed {
        Ok(amount) => Some(amount),
        Err(message) => {
            errors.push(field, message);
            None
        }
    }
}

fn optional_percent(value: Option<&Value>, field: &str, errors: &mut ValidationErrors) -> Percent {
    let Some(value) = value else {
        return Percent::ZERO;
    };
    let parsed = match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| "must be a percentage".to_string())
            .and_then(|v| Percent::from_value_f64(v).map_err(|e| e.to_string())),
        _ => Err("must be a percentage in [0, 100]".to_string()),
    };
    match parsed {
        Ok(percent) => percent,
        Err(message) => {
            errors.push(field, message);
            Percent::ZERO
        }
    }
}

fn optional_count(
    value: Option<&Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<u32> {
    let value = value?;
    match value
        .as_u64()
        .filter(|count| *count >= 1)
        .and_then(|count| u32::try_from(count).ok())
    {
        Some(count) => Some(count),
        None => {
            errors.push(field, "must be a positive integer");
            None
        }
    }
}
