//! Submission orchestration: recompute derived values, fold "Other"
//! elaborations into the comments, validate every section, run the native
//! whole-form check, and only then hand the values off for delivery.

use std::collections::BTreeMap;

use tracing::warn;

use crate::schema::FieldValue;
use crate::wizard::effects::PageEffects;
use crate::wizard::navigator::REQUIRED_FIELDS_TITLE;
use crate::wizard::page::{Page, WizardForm};
use crate::wizard::range::{self, RangeTrigger};
use crate::wizard::validator;

/// Modal copy for the native whole-form check failing after every section
/// individually passed.
pub const INCOMPLETE_TITLE: &str = "Please complete the required fields";
pub const INCOMPLETE_BODY: &str =
    "Some required fields are missing or invalid. Please check and try again.";

/// Boundary that performs the actual delivery once the wizard signs off.
/// The orchestrator never talks to the network or disk itself.
pub trait SubmitHandoff {
    fn deliver(&mut self, form_id: &str, values: &BTreeMap<String, FieldValue>);
}

/// Handoff that drops the values. Useful when only the gating behavior is
/// under observation.
#[derive(Debug, Default)]
pub struct DiscardHandoff;

impl SubmitHandoff for DiscardHandoff {
    fn deliver(&mut self, _form_id: &str, _values: &BTreeMap<String, FieldValue>) {}
}

/// Runs the whole submission path for the resolved form. Returns whether the
/// values were handed off.
pub fn submit(
    page: &mut Page,
    form_id: Option<&str>,
    effects: &mut dyn PageEffects,
    handoff: &mut dyn SubmitHandoff,
) -> bool {
    let Some(index) = page.resolve_form(form_id) else {
        warn!(form_id, "submit requested but no form resolved");
        return false;
    };
    let form = &mut page.forms[index];

    // Derived values first, whether or not the user ever touched the range.
    if let Some(spec) = form.range.clone() {
        range::sync(&mut form.tree, &spec, RangeTrigger::None);
    }
    merge_other_answers(form);

    let steps: Vec<u32> = form.tree.sections().iter().map(|s| s.step).collect();
    for step in steps {
        let outcome = validator::validate_section(&mut form.tree, step);
        if outcome.ok() {
            continue;
        }
        if form.nav.current() != step {
            form.nav.jump_to(&mut form.tree, effects, step);
        }
        if let Some(id) = outcome.first_failing_control() {
            form.tree.focus(id);
        }
        effects.alert_error(REQUIRED_FIELDS_TITLE, "");
        return false;
    }

    if !form.tree.native_valid() {
        effects.alert_error(INCOMPLETE_TITLE, INCOMPLETE_BODY);
        return false;
    }

    // Locked from here: no double submits while delivery is in flight.
    form.tree.disable_submit_triggers();
    let values = form.tree.collect_values();
    handoff.deliver(&form.id, &values);
    true
}

/// Folds each selected "Other" option's free-text elaboration into the
/// comments field as a labelled line. Running twice adds nothing: a line
/// already present is left alone.
fn merge_other_answers(form: &mut WizardForm) {
    let Some(comments_name) = form.comments_field.clone() else {
        return;
    };
    for merge in form.merges.clone() {
        if !form
            .tree
            .checked_values(&merge.watch)
            .iter()
            .any(|v| v == &merge.when_value)
        {
            continue;
        }
        let Some(text_id) = form.tree.first_named(&merge.text_field) else {
            continue;
        };
        let text = form.tree.control(text_id).value.trim().to_string();
        if text.is_empty() {
            continue;
        }
        let Some(comments_id) = form.tree.first_named(&comments_name) else {
            continue;
        };
        let line = format!("{}: {}", merge.label, text);
        let existing = form.tree.control(comments_id).value.clone();
        if existing.contains(&line) {
            continue;
        }
        let updated = if existing.trim().is_empty() {
            line
        } else {
            format!("{existing}\n{line}")
        };
        form.tree.set_value(comments_id, updated);
    }
}
