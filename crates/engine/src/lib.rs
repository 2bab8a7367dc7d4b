//! Pricing engine for Lagerkasse, the camp cash-management system.
//!
//! The engine turns a YAML-authored, date-bounded pricing policy (a
//! [`Ruleset`]) into per-participant prices through a layered discount
//! model: an age-bracket base price, a role discount, a family (sibling)
//! discount and an optional manual override. Everything is a pure,
//! synchronous computation over immutable inputs; the surrounding web
//! application owns persistence, sessions and rendering.
//!
//! Typical flow:
//!
//! 1. [`parse_ruleset`] validates a YAML document into a [`Ruleset`],
//!    reporting every field violation at once;
//! 2. [`select_ruleset`] picks the policy active on the event date;
//! 3. [`compute_price`] produces a [`PriceBreakdown`] per participant, or
//!    [`compute_family_prices`] prices a whole family with birth-order
//!    discount tiers.
//!
//! All monetary arithmetic uses integer cents ([`MoneyCents`]); percentages
//! are basis points ([`Percent`]) applied with half-up rounding.

pub use error::{FieldViolation, PricingError, ValidationErrors};
pub use family::{FamilyMember, compute_family_prices};
pub use money::{MoneyCents, Percent};
pub use parse::{parse_ruleset, parse_ruleset_file};
pub use pricing::{PriceBreakdown, compute_price};
pub use ruleset::{AgeGroup, FamilyDiscount, RoleDiscount, Ruleset};
pub use scan::{ScannedRuleset, filter_valid, scan_directory};
pub use select::select_ruleset;

mod error;
mod family;
mod money;
mod parse;
mod pricing;
mod ruleset;
mod scan;
mod select;

type ResultEngine<T> = Result<T, PricingError>;
