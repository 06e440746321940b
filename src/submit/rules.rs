//! Server-side validation rules.
//!
//! These deliberately do not share semantics with the in-page checks: a page
//! control that is hidden or disabled is simply skipped client-side, while the
//! rules here see the posted value map and nothing else. Format checks
//! ([`RuleCheck::Email`] and friends) therefore fail on a missing value
//! instead of passing it through, and a rule marked optional is skipped
//! entirely when the field is blank.

use std::collections::BTreeMap;

use crate::restore::ServerError;
use crate::schema::catalog::{
    FINANCING_OPTIONS, STRATEGY_OPTIONS, TIMELINE_OPTIONS, TRIPLE_DEAL_OPTIONS, YES_NO,
};
use crate::schema::{Constraint, FieldValue};
use crate::wizard::range::parse_composite;

/// One check in a rule chain.
#[derive(Debug, Clone)]
pub enum RuleCheck {
    /// Present and non-blank.
    Required,
    Email,
    Phone,
    Url,
    /// Integer with a floor, `IntMin(0)` for the various count fields.
    IntMin(i64),
    IntRange(i64, i64),
    /// Single value drawn from a fixed list.
    OneOf(&'static [&'static str]),
    /// Non-empty selection where every entry is drawn from a fixed list.
    SubsetOf(&'static [&'static str]),
}

/// A chain of checks over one posted field, with the message reported when
/// any of them fails. One rule yields at most one error.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: &'static str,
    pub message: &'static str,
    pub optional: bool,
    pub checks: Vec<RuleCheck>,
}

impl FieldRule {
    pub fn required(field: &'static str, message: &'static str) -> Self {
        FieldRule {
            field,
            message,
            optional: false,
            checks: vec![RuleCheck::Required],
        }
    }

    /// Rule that is skipped while the field is blank but still gates the
    /// value once something is entered.
    pub fn optional(field: &'static str, message: &'static str) -> Self {
        FieldRule {
            field,
            message,
            optional: true,
            checks: Vec::new(),
        }
    }

    pub fn check(mut self, check: RuleCheck) -> Self {
        self.checks.push(check);
        self
    }
}

/// Runs every rule against the posted values. No short-circuit: the caller
/// gets the full error list so the page can mark all offending fields at
/// once.
pub fn evaluate(rules: &[FieldRule], values: &BTreeMap<String, FieldValue>) -> Vec<ServerError> {
    let mut errors = Vec::new();
    for rule in rules {
        let value = values.get(rule.field);
        if rule.optional && blank(value) {
            continue;
        }
        if !rule.checks.iter().all(|check| passes(check, value)) {
            errors.push(ServerError::for_field(rule.field, rule.message));
        }
    }
    errors
}

fn blank(value: Option<&FieldValue>) -> bool {
    value.map_or(true, FieldValue::is_blank)
}

fn passes(check: &RuleCheck, value: Option<&FieldValue>) -> bool {
    let text = value
        .and_then(FieldValue::as_text)
        .map(str::trim)
        .unwrap_or("");
    match check {
        RuleCheck::Required => !blank(value),
        RuleCheck::Email => !text.is_empty() && Constraint::Email.check(text),
        RuleCheck::Phone => !text.is_empty() && Constraint::Phone.check(text),
        RuleCheck::Url => !text.is_empty() && Constraint::Url.check(text),
        RuleCheck::IntMin(min) => !text.is_empty() && Constraint::IntMin(*min).check(text),
        RuleCheck::IntRange(lo, hi) => {
            !text.is_empty() && Constraint::IntRange(*lo, *hi).check(text)
        }
        RuleCheck::OneOf(allowed) => allowed.iter().any(|option| *option == text),
        RuleCheck::SubsetOf(allowed) => match value {
            Some(FieldValue::Multi(items)) => {
                !items.is_empty()
                    && items
                        .iter()
                        .all(|item| allowed.iter().any(|option| *option == item.as_str()))
            }
            // A single checked box posts as plain text.
            Some(FieldValue::Text(single)) if !single.trim().is_empty() => {
                allowed.iter().any(|option| *option == single.trim())
            }
            _ => false,
        },
    }
}

/// Rule set for the cash-buyer intake.
pub fn cash_buyer_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::required("FullName", "Full name is required."),
        FieldRule::required("CellPhone", "Valid phone number is required.")
            .check(RuleCheck::Phone),
        FieldRule::required("Email", "Valid email address is required.").check(RuleCheck::Email),
        FieldRule::required("Address", "Address is required."),
        FieldRule::optional("Website", "Invalid website URL.").check(RuleCheck::Url),
        FieldRule::required(
            "YearsInBusiness",
            "Years in business is required and must be a non-negative number.",
        )
        .check(RuleCheck::IntMin(0)),
        FieldRule::required(
            "CompletedProjects",
            "Completed projects is required and must be a non-negative number.",
        )
        .check(RuleCheck::IntMin(0)),
        FieldRule::required("CurrentProjects", "Current projects is required."),
        FieldRule::required(
            "PropertiesNext6Months",
            "Properties in the next 6 months is required and must be a non-negative number.",
        )
        .check(RuleCheck::IntMin(0)),
        FieldRule::required(
            "PropertiesPerYear",
            "Properties per year is required and must be a non-negative number.",
        )
        .check(RuleCheck::IntMin(0)),
        FieldRule::required("SourceFinancing", "Valid financing source is required.")
            .check(RuleCheck::SubsetOf(&FINANCING_OPTIONS)),
        FieldRule::required("FundingInPlace", "Funding in place status is required.")
            .check(RuleCheck::OneOf(&YES_NO)),
        FieldRule::required("ProofOfFunds", "Proof of funds status is required.")
            .check(RuleCheck::OneOf(&YES_NO)),
        FieldRule::required("TripleDeals", "Triple deals preference is required.")
            .check(RuleCheck::OneOf(&TRIPLE_DEAL_OPTIONS)),
        FieldRule::required("Quickly", "Quick sale preference is required.")
            .check(RuleCheck::OneOf(&TIMELINE_OPTIONS)),
        FieldRule::required("PriceRanges", "Price ranges are required."),
        FieldRule::required("MinimumProfit", "Minimum profit is required."),
        FieldRule::required("GoodDealCriteria", "Good deal criteria are required."),
        FieldRule::required("PreferredAreas", "Preferred areas are required."),
        FieldRule::required("AvoidedAreas", "Avoided areas are required."),
        FieldRule::required(
            "MaxPropertyAge",
            "Maximum property age is required and must be a non-negative number.",
        )
        .check(RuleCheck::IntMin(0)),
        FieldRule::required("IdealProperty", "Ideal property details are required."),
        FieldRule::required("InvestmentStrategy", "Valid investment strategy is required.")
            .check(RuleCheck::OneOf(&STRATEGY_OPTIONS)),
        FieldRule::optional(
            "PurchaseReadiness",
            "Purchase readiness must be between 1 and 10.",
        )
        .check(RuleCheck::IntRange(1, 10)),
    ]
}

pub fn fast_sell_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::required("FullName", "Full name is required."),
        FieldRule::required("ContactPhone", "Valid phone number is required.")
            .check(RuleCheck::Phone),
        FieldRule::required("ContactEmail", "Valid email address is required.")
            .check(RuleCheck::Email),
        FieldRule::required("PropertyAddress", "Property address is required."),
        FieldRule::required("City", "City is required."),
        FieldRule::required("State", "State is required."),
        FieldRule::required("ZipCode", "ZIP code is required."),
        FieldRule::optional("AskingPrice", "Asking price must be a non-negative number.")
            .check(RuleCheck::IntMin(0)),
        FieldRule::optional("Bedrooms", "Bedrooms must be a non-negative number.")
            .check(RuleCheck::IntMin(0)),
        FieldRule::optional("Bathrooms", "Bathrooms must be a non-negative number.")
            .check(RuleCheck::IntMin(0)),
        FieldRule::optional("SquareFootage", "Square footage must be a non-negative number.")
            .check(RuleCheck::IntMin(0)),
        FieldRule::optional("YearBuilt", "Year built must be a plausible year.")
            .check(RuleCheck::IntRange(1800, 2100)),
    ]
}

pub fn listing_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::required("FullName", "Full name is required."),
        FieldRule::required("Email", "Valid email address is required.").check(RuleCheck::Email),
        FieldRule::required("Phone", "Valid phone number is required.").check(RuleCheck::Phone),
        FieldRule::required("PropertyAddress", "Property address is required."),
        FieldRule::optional("AskingPrice", "Asking price must be a non-negative number.")
            .check(RuleCheck::IntMin(0)),
    ]
}

pub fn bird_dog_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::required("FullName", "Full name is required."),
        FieldRule::required("Email", "Valid email address is required.").check(RuleCheck::Email),
        FieldRule::required("Phone", "Valid phone number is required.").check(RuleCheck::Phone),
        FieldRule::required("AreasCovered", "Areas covered is required."),
    ]
}

/// Rule set for a catalog form id, `None` for ids the server does not accept.
pub fn rules_for(form_id: &str) -> Option<Vec<FieldRule>> {
    match form_id {
        "cash-buyer-form" => Some(cash_buyer_rules()),
        "fast-sell-form" => Some(fast_sell_rules()),
        "listing-form" => Some(listing_rules()),
        "bird-dog-form" => Some(bird_dog_rules()),
        _ => None,
    }
}

/// Rewrites the price fields into their canonical shape before validation.
///
/// A posted `PriceRanges` composite wins: its first two digit runs become the
/// min/max fields and the composite itself is rewritten as `"min - max"`.
/// Without a usable composite the separately posted min and max are stripped
/// to digits and combined, so older pages that never wrote the hidden
/// composite still pass the required-composite rule.
pub fn normalize_price_range(values: &mut BTreeMap<String, FieldValue>) {
    let composite = values
        .get("PriceRanges")
        .and_then(FieldValue::as_text)
        .and_then(parse_composite);
    if let Some(range) = composite {
        values.insert(
            "PriceRangesMin".to_string(),
            FieldValue::text(range.min.to_string()),
        );
        values.insert(
            "PriceRangesMax".to_string(),
            FieldValue::text(range.max.to_string()),
        );
        values.insert(
            "PriceRanges".to_string(),
            FieldValue::text(format!("{} - {}", range.min, range.max)),
        );
        return;
    }

    let min = digits_only(values.get("PriceRangesMin"));
    let max = digits_only(values.get("PriceRangesMax"));
    if let (Some(min), Some(max)) = (min, max) {
        values.insert(
            "PriceRanges".to_string(),
            FieldValue::text(format!("{min} - {max}")),
        );
        values.insert("PriceRangesMin".to_string(), FieldValue::text(min));
        values.insert("PriceRangesMax".to_string(), FieldValue::text(max));
    }
}

fn digits_only(value: Option<&FieldValue>) -> Option<String> {
    let text = value.and_then(FieldValue::as_text)?;
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}
