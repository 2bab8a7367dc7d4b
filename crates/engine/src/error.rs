//! The module contains the errors the engine can throw.
//!
//! Parsing and selection are the only fallible operations:
//!
//! - [`InvalidRuleset`] carries every field violation found in one pass, so
//!   a ruleset author can fix a file in a single round trip.
//! - [`NoApplicableRuleset`] / [`AmbiguousRuleset`] are selection failures.
//!
//! Price computation itself never fails: uncovered ages and negative final
//! prices are valid results, not errors.
//!
//! [`InvalidRuleset`]: PricingError::InvalidRuleset
//! [`NoApplicableRuleset`]: PricingError::NoApplicableRuleset
//! [`AmbiguousRuleset`]: PricingError::AmbiguousRuleset

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// A single validation failure, qualified by the field path it refers to
/// (e.g. `age_groups[2].min_age`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Accumulator for validation failures.
///
/// The parser pushes into this instead of bailing on the first problem, so
/// every defect of a ruleset file is reported at once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldViolation> {
        self.0.iter()
    }

    /// Wraps the collected violations into an error, or returns `value` if
    /// nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, PricingError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(PricingError::InvalidRuleset(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum PricingError {
    #[error("invalid ruleset: {0}")]
    InvalidRuleset(ValidationErrors),
    #[error("no ruleset applies on {0}")]
    NoApplicableRuleset(NaiveDate),
    #[error("multiple rulesets apply on {date}: {}", .names.join(", "))]
    AmbiguousRuleset { date: NaiveDate, names: Vec<String> },
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PartialEq for PricingError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidRuleset(a), Self::InvalidRuleset(b)) => a == b,
            (Self::NoApplicableRuleset(a), Self::NoApplicableRuleset(b)) => a == b,
            (
                Self::AmbiguousRuleset { date: a, names: an },
                Self::AmbiguousRuleset { date: b, names: bn },
            ) => a == b && an == bn,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Yaml(a), Self::Yaml(b)) => a.to_string() == b.to_string(),
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
