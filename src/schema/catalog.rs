//! The built-in intake forms. The cash buyer questionnaire is the flagship
//! multi-step wizard; the remaining forms are single-step leads.

use crate::schema::field::{Constraint, FieldKind, FieldSpec};
use crate::schema::form::{
    FormSpec, MergeSpec, RangeSpec, ReadinessSpec, SectionSpec, ToggleSpec,
};

/// Form id submission falls back to when no explicit id is given.
pub const DEFAULT_FORM_ID: &str = "cash-buyer-form";
/// Older markup revision of the same questionnaire, still honored by the
/// fallback cascade.
pub const PREVIEW_FORM_ID: &str = "Preview-form";

pub const FINANCING_OPTIONS: [&str; 8] = [
    "Cash on Hand",
    "Hard Money",
    "Private Money",
    "Traditional",
    "JV Partner",
    "Seller Financing",
    "Subject To",
    "Other",
];

pub const TIMELINE_OPTIONS: [&str; 6] = [
    "One Day",
    "Within a Week",
    "Within Two Weeks",
    "Within a Month",
    "Over a Month",
    "Other Timeline",
];

pub const TRIPLE_DEAL_OPTIONS: [&str; 3] = ["Yes", "No", "Maybe"];

pub const YES_NO: [&str; 2] = ["Yes", "No"];

pub const STRATEGY_OPTIONS: [&str; 2] = ["Rehab and Resell", "Buy and Hold"];

pub const PROPERTY_TYPE_OPTIONS: [&str; 7] = [
    "Single Family",
    "Multi Family",
    "Condo",
    "Townhouse",
    "Land",
    "Commercial",
    "Other",
];

pub const WORK_TYPE_OPTIONS: [&str; 5] = [
    "Cosmetic",
    "Full Rehab",
    "Teardown",
    "New Construction",
    "Other",
];

/// Inclusive bounds of the purchase price sliders, in whole dollars.
pub const PRICE_RANGE_BOUNDS: (i64, i64) = (0, 1_000_000);

/// Maps a 1-10 purchase readiness score to its display label.
pub fn readiness_label(value: i64) -> Option<&'static str> {
    match value {
        1 => Some("Just browsing"),
        2 => Some("Thinking about it"),
        3 => Some("Researching options"),
        4 => Some("Getting prepared"),
        5 => Some("Somewhat ready"),
        6 => Some("Fairly ready"),
        7 => Some("Very ready"),
        8 => Some("Extremely ready"),
        9 => Some("Almost closing"),
        10 => Some("Ready to close today"),
        _ => None,
    }
}

/// The four-step cash buyer questionnaire.
pub fn cash_buyer() -> FormSpec {
    let (lo, hi) = PRICE_RANGE_BOUNDS;

    let contact = SectionSpec::new(
        1,
        "Contact Information",
        vec![
            FieldSpec::new("FullName", "Full Name", FieldKind::Text),
            FieldSpec::new("CompanyName", "Company Name", FieldKind::Text).optional(),
            FieldSpec::new("CellPhone", "Cell Phone", FieldKind::Text)
                .with_constraint(Constraint::Phone),
            FieldSpec::new("Email", "Email Address", FieldKind::Text)
                .with_constraint(Constraint::Email),
            FieldSpec::new("Address", "Mailing Address", FieldKind::Text),
            FieldSpec::new("Website", "Website", FieldKind::Text)
                .optional()
                .with_constraint(Constraint::Url),
        ],
    );

    let experience = SectionSpec::new(
        2,
        "Buying Experience",
        vec![
            FieldSpec::new("YearsInBusiness", "Years in Business", FieldKind::Number)
                .with_constraint(Constraint::IntMin(0)),
            FieldSpec::new(
                "CompletedProjects",
                "Completed Projects",
                FieldKind::Number,
            )
            .with_constraint(Constraint::IntMin(0)),
            FieldSpec::new("CurrentProjects", "Current Projects", FieldKind::Text),
            FieldSpec::new(
                "PropertiesNext6Months",
                "Properties Wanted in the Next 6 Months",
                FieldKind::Number,
            )
            .with_constraint(Constraint::IntMin(0)),
            FieldSpec::new(
                "PropertiesPerYear",
                "Properties Bought per Year",
                FieldKind::Number,
            )
            .with_constraint(Constraint::IntMin(0)),
        ],
    );

    let financing = SectionSpec::new(
        3,
        "Financing",
        vec![
            FieldSpec::new(
                "SourceFinancing",
                "Source of Financing",
                FieldKind::CheckboxGroup,
            )
            .with_options(&FINANCING_OPTIONS)
            .with_group_key("SourceFinancing"),
            FieldSpec::new(
                "SourceFinancingOther",
                "Other Financing Source",
                FieldKind::Text,
            )
            .optional()
            .hidden_until_toggled(),
            FieldSpec::new("FundingInPlace", "Is Funding in Place?", FieldKind::RadioGroup)
                .with_options(&YES_NO),
            FieldSpec::new(
                "ProofOfFunds",
                "Can You Provide Proof of Funds?",
                FieldKind::RadioGroup,
            )
            .with_options(&YES_NO),
            FieldSpec::new("ProofOfFundsFile", "Proof of Funds File", FieldKind::Text)
                .optional()
                .hidden_until_toggled(),
            FieldSpec::new(
                "TripleDeals",
                "Interested in Tripling Your Deals?",
                FieldKind::RadioGroup,
            )
            .with_options(&TRIPLE_DEAL_OPTIONS),
            FieldSpec::new(
                "Quickly",
                "How Quickly Can You Close?",
                FieldKind::RadioGroup,
            )
            .with_options(&TIMELINE_OPTIONS),
            FieldSpec::new("QuicklyOther", "Other Closing Timeline", FieldKind::Text)
                .optional()
                .hidden_until_toggled(),
        ],
    );

    let buy_box = SectionSpec::new(
        4,
        "Buy Box",
        vec![
            FieldSpec::new("PriceRangesMin", "Minimum Purchase Price", FieldKind::Number)
                .optional()
                .with_initial(lo.to_string()),
            FieldSpec::new("PriceRangesMax", "Maximum Purchase Price", FieldKind::Number)
                .optional()
                .with_initial(hi.to_string()),
            FieldSpec::new("priceRangeMinSlider", "Minimum Price", FieldKind::Slider)
                .optional()
                .with_bounds(lo, hi)
                .with_initial(lo.to_string()),
            FieldSpec::new("priceRangeMaxSlider", "Maximum Price", FieldKind::Slider)
                .optional()
                .with_bounds(lo, hi)
                .with_initial(hi.to_string()),
            FieldSpec::new("MinimumProfit", "Minimum Profit per Deal", FieldKind::Text),
            FieldSpec::new(
                "GoodDealCriteria",
                "What Makes a Deal Good for You?",
                FieldKind::TextArea,
            ),
            FieldSpec::new("PreferredAreas", "Preferred Areas", FieldKind::Text),
            FieldSpec::new("AvoidedAreas", "Areas to Avoid", FieldKind::Text),
            FieldSpec::new("PropertyType", "Property Types", FieldKind::CheckboxGroup)
                .optional()
                .with_options(&PROPERTY_TYPE_OPTIONS),
            FieldSpec::new("PropertyTypeOther", "Other Property Type", FieldKind::Text)
                .optional()
                .hidden_until_toggled(),
            FieldSpec::new("WorkType", "Acceptable Work Types", FieldKind::CheckboxGroup)
                .optional()
                .with_options(&WORK_TYPE_OPTIONS),
            FieldSpec::new("WorkTypeOther", "Other Work Type", FieldKind::Text)
                .optional()
                .hidden_until_toggled(),
            FieldSpec::new("MaxPropertyAge", "Maximum Property Age", FieldKind::Number)
                .with_constraint(Constraint::IntMin(0)),
            FieldSpec::new(
                "IdealProperty",
                "Describe Your Ideal Property",
                FieldKind::TextArea,
            ),
            FieldSpec::new(
                "InvestmentStrategy",
                "Investment Strategy",
                FieldKind::RadioGroup,
            )
            .with_options(&STRATEGY_OPTIONS),
            FieldSpec::new(
                "PurchaseReadiness",
                "How Ready Are You to Purchase?",
                FieldKind::Slider,
            )
            .optional()
            .with_constraint(Constraint::IntRange(1, 10))
            .with_bounds(1, 10)
            .with_initial("5"),
            FieldSpec::new(
                "AdditionalComments",
                "Additional Comments",
                FieldKind::TextArea,
            )
            .optional(),
            FieldSpec::new("submit", "Submit My Information", FieldKind::Submit).optional(),
        ],
    );

    let mut form = FormSpec::new(DEFAULT_FORM_ID, "Cash Buyer Questionnaire", "/forms/Cash-Buyer");
    form.sections = vec![contact, experience, financing, buy_box];
    form.range = Some(RangeSpec {
        min_input: "PriceRangesMin".to_string(),
        max_input: "PriceRangesMax".to_string(),
        min_slider: "priceRangeMinSlider".to_string(),
        max_slider: "priceRangeMaxSlider".to_string(),
        composite: "PriceRanges".to_string(),
        summary: "priceRangeSummary".to_string(),
    });
    form.toggles = vec![
        ToggleSpec {
            watch: "SourceFinancing".to_string(),
            when_value: "Other".to_string(),
            target: "SourceFinancingOther".to_string(),
            require_when_visible: true,
            clear_on_hide: true,
        },
        ToggleSpec {
            watch: "Quickly".to_string(),
            when_value: "Other Timeline".to_string(),
            target: "QuicklyOther".to_string(),
            require_when_visible: true,
            clear_on_hide: true,
        },
        ToggleSpec {
            watch: "ProofOfFunds".to_string(),
            when_value: "Yes".to_string(),
            target: "ProofOfFundsFile".to_string(),
            require_when_visible: false,
            clear_on_hide: false,
        },
        ToggleSpec {
            watch: "PropertyType".to_string(),
            when_value: "Other".to_string(),
            target: "PropertyTypeOther".to_string(),
            require_when_visible: false,
            clear_on_hide: false,
        },
        ToggleSpec {
            watch: "WorkType".to_string(),
            when_value: "Other".to_string(),
            target: "WorkTypeOther".to_string(),
            require_when_visible: false,
            clear_on_hide: false,
        },
    ];
    form.merges = vec![
        MergeSpec {
            watch: "SourceFinancing".to_string(),
            when_value: "Other".to_string(),
            text_field: "SourceFinancingOther".to_string(),
            label: "Other financing".to_string(),
        },
        MergeSpec {
            watch: "Quickly".to_string(),
            when_value: "Other Timeline".to_string(),
            text_field: "QuicklyOther".to_string(),
            label: "Other timeline".to_string(),
        },
        MergeSpec {
            watch: "PropertyType".to_string(),
            when_value: "Other".to_string(),
            text_field: "PropertyTypeOther".to_string(),
            label: "Other property type".to_string(),
        },
        MergeSpec {
            watch: "WorkType".to_string(),
            when_value: "Other".to_string(),
            text_field: "WorkTypeOther".to_string(),
            label: "Other work type".to_string(),
        },
    ];
    form.comments_field = Some("AdditionalComments".to_string());
    form.readiness = Some(ReadinessSpec {
        field: "PurchaseReadiness".to_string(),
    });
    form.restore_path = Some("/api/cbForm/restore".to_string());
    form
}

/// Single-step fast home sale lead.
pub fn fast_sell() -> FormSpec {
    let fields = vec![
        FieldSpec::new("FullName", "Full Name", FieldKind::Text),
        FieldSpec::new("ContactPhone", "Phone", FieldKind::Text)
            .with_constraint(Constraint::Phone),
        FieldSpec::new("ContactEmail", "Email Address", FieldKind::Text)
            .with_constraint(Constraint::Email),
        FieldSpec::new("PropertyAddress", "Property Address", FieldKind::Text),
        FieldSpec::new("City", "City", FieldKind::Text),
        FieldSpec::new("State", "State", FieldKind::Text),
        FieldSpec::new("ZipCode", "ZIP Code", FieldKind::Text),
        FieldSpec::new("AskingPrice", "Asking Price", FieldKind::Number)
            .optional()
            .with_constraint(Constraint::IntMin(0)),
        FieldSpec::new("Bedrooms", "Bedrooms", FieldKind::Number)
            .optional()
            .with_constraint(Constraint::IntMin(0)),
        FieldSpec::new("Bathrooms", "Bathrooms", FieldKind::Number)
            .optional()
            .with_constraint(Constraint::IntMin(0)),
        FieldSpec::new("SquareFootage", "Square Footage", FieldKind::Number)
            .optional()
            .with_constraint(Constraint::IntMin(0)),
        FieldSpec::new("YearBuilt", "Year Built", FieldKind::Number)
            .optional()
            .with_constraint(Constraint::IntRange(1800, 2100)),
        FieldSpec::new("Timeline", "How Soon Do You Need to Sell?", FieldKind::Select)
            .optional()
            .with_options(&TIMELINE_OPTIONS),
        FieldSpec::new("ReasonForSelling", "Reason for Selling", FieldKind::TextArea).optional(),
        FieldSpec::new("AdditionalComments", "Additional Comments", FieldKind::TextArea)
            .optional(),
        FieldSpec::new("submit", "Request My Offer", FieldKind::Submit).optional(),
    ];

    let mut form = FormSpec::new("fast-sell-form", "Sell Your House Fast", "/forms/Fast-Sell");
    form.sections = vec![SectionSpec::new(1, "Property Details", fields)];
    form.comments_field = Some("AdditionalComments".to_string());
    form.restore_path = Some("/api/fastSell/restore".to_string());
    form
}

/// Single-step property listing lead.
pub fn property_listing() -> FormSpec {
    let fields = vec![
        FieldSpec::new("FullName", "Full Name", FieldKind::Text),
        FieldSpec::new("Email", "Email Address", FieldKind::Text)
            .with_constraint(Constraint::Email),
        FieldSpec::new("Phone", "Phone", FieldKind::Text).with_constraint(Constraint::Phone),
        FieldSpec::new("PropertyAddress", "Property Address", FieldKind::Text),
        FieldSpec::new("AskingPrice", "Asking Price", FieldKind::Number)
            .optional()
            .with_constraint(Constraint::IntMin(0)),
        FieldSpec::new("Description", "Property Description", FieldKind::TextArea).optional(),
        FieldSpec::new("submit", "List My Property", FieldKind::Submit).optional(),
    ];

    let mut form = FormSpec::new("listing-form", "List Your Property", "/forms/Listing");
    form.sections = vec![SectionSpec::new(1, "Listing Details", fields)];
    form
}

/// Single-step lead for people who scout properties.
pub fn bird_dog() -> FormSpec {
    let fields = vec![
        FieldSpec::new("FullName", "Full Name", FieldKind::Text),
        FieldSpec::new("Email", "Email Address", FieldKind::Text)
            .with_constraint(Constraint::Email),
        FieldSpec::new("Phone", "Phone", FieldKind::Text).with_constraint(Constraint::Phone),
        FieldSpec::new("AreasCovered", "Areas You Cover", FieldKind::Text),
        FieldSpec::new("Experience", "Scouting Experience", FieldKind::TextArea).optional(),
        FieldSpec::new("Availability", "Availability", FieldKind::Select)
            .optional()
            .with_options(&["Weekdays", "Weekends", "Anytime"]),
        FieldSpec::new("submit", "Join the Network", FieldKind::Submit).optional(),
    ];

    let mut form = FormSpec::new("bird-dog-form", "Property Finder Network", "/forms/Property-Finder");
    form.sections = vec![SectionSpec::new(1, "About You", fields)];
    form
}

pub fn all_forms() -> Vec<FormSpec> {
    vec![cash_buyer(), fast_sell(), property_listing(), bird_dog()]
}

pub fn form_by_id(id: &str) -> Option<FormSpec> {
    all_forms().into_iter().find(|form| form.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_buyer_has_four_steps() {
        let form = cash_buyer();
        assert_eq!(form.total_steps(), 4);
        for (index, section) in form.sections.iter().enumerate() {
            assert_eq!(section.step, index as u32 + 1);
        }
    }

    #[test]
    fn toggle_rules_reference_declared_fields() {
        for form in all_forms() {
            for toggle in &form.toggles {
                assert!(
                    form.field(&toggle.watch).is_some(),
                    "{}: unknown watch {}",
                    form.id,
                    toggle.watch
                );
                assert!(
                    form.field(&toggle.target).is_some(),
                    "{}: unknown target {}",
                    form.id,
                    toggle.target
                );
            }
            for merge in &form.merges {
                assert!(form.field(&merge.text_field).is_some());
            }
            if let Some(comments) = &form.comments_field {
                assert!(form.field(comments).is_some());
            }
        }
    }

    #[test]
    fn composite_price_field_is_not_declared() {
        // The hidden combined field is created on demand, never rendered.
        assert!(cash_buyer().field("PriceRanges").is_none());
    }

    #[test]
    fn readiness_labels_cover_the_scale() {
        assert_eq!(readiness_label(1), Some("Just browsing"));
        assert_eq!(readiness_label(10), Some("Ready to close today"));
        assert_eq!(readiness_label(0), None);
        assert_eq!(readiness_label(11), None);
        for score in 1..=10 {
            assert!(readiness_label(score).is_some());
        }
    }

    #[test]
    fn form_lookup_by_id() {
        assert!(form_by_id(DEFAULT_FORM_ID).is_some());
        assert!(form_by_id("fast-sell-form").is_some());
        assert!(form_by_id("no-such-form").is_none());
    }
}
