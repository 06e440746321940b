//! Page-load side of the restore protocol: fetch the stashed draft once,
//! replay its values into the control tree, surface its errors, and handle
//! the transient query parameters left behind by a redirect.

use std::collections::BTreeMap;

use strsim::jaro_winkler;
use tracing::debug;

use crate::schema::FieldValue;
use crate::wizard::dispatch;
use crate::wizard::effects::PageEffects;
use crate::wizard::page::{PageUrl, WizardForm};
use crate::wizard::tree::{ControlId, ControlTree};

use super::payload::{RestorePayload, ServerError};
use super::source::RestoreSource;

/// Modal title shown over restored validation errors.
pub const CORRECTION_TITLE: &str = "Please try again!";
/// Modal title for the post-redirect success confirmation.
pub const SUCCESS_TITLE: &str = "Thank you for your submission. Our team will get back to you shortly!";
const DEFAULT_SUCCESS_BODY: &str = "Form submitted successfully!";
const RECHECK_BANNER: &str = "Please recheck the highlighted fields before resubmitting.";

/// Similarity floor for suggesting what an unknown payload field probably
/// meant.
const NEAR_MISS_THRESHOLD: f64 = 0.85;

/// Query parameters that belong to one redirect only and never survive the
/// page load.
const TRANSIENT_PARAMS: [&str; 3] = ["errors", "success", "message"];

/// What a page load ended up doing, for logging and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestoreReport {
    pub applied_values: usize,
    pub field_errors: usize,
    pub general_errors: usize,
    /// Whether a blocking correction alert was raised.
    pub alerted: bool,
    /// Whether the success confirmation ran.
    pub success_confirmed: bool,
}

/// Runs the full page-load sequence for one mounted form: initial render,
/// one-time draft fetch, inline payload, legacy query fallback, success
/// confirmation, and the history cleanup. Fetch failures degrade to a blank
/// form; they are logged and otherwise invisible.
pub fn handle_page_load(
    form: &mut WizardForm,
    url: &mut PageUrl,
    source: Option<&dyn RestoreSource>,
    inline: Option<&RestorePayload>,
    effects: &mut dyn PageEffects,
) -> RestoreReport {
    let mut report = RestoreReport::default();
    form.init();

    let fetched = source.and_then(|source| match source.fetch() {
        Ok(payload) if !payload.is_empty() => Some(payload),
        Ok(_) => None,
        Err(err) => {
            debug!("draft fetch failed, starting blank: {err}");
            None
        }
    });
    if let Some(payload) = fetched.as_ref() {
        apply_restore(form, payload, effects, &mut report);
    }

    // An inline payload rides on the page itself and is applied after the
    // fetched one, so its values win where both speak.
    if let Some(payload) = inline {
        if !payload.is_empty() {
            apply_restore(form, payload, effects, &mut report);
        }
    }

    if !report.alerted {
        apply_query_errors(form, url, effects, &mut report);
    }

    if url.query_get("success").is_some() {
        let body = url
            .query_get("message")
            .unwrap_or(DEFAULT_SUCCESS_BODY)
            .to_string();
        report.success_confirmed = true;
        if effects.confirm_success(SUCCESS_TITLE, &body) {
            effects.navigate(&form.canonical_path);
        }
    }

    url.strip(&TRANSIENT_PARAMS);
    report
}

/// Replays one payload into the form: values first, then the errors.
pub fn apply_restore(
    form: &mut WizardForm,
    payload: &RestorePayload,
    effects: &mut dyn PageEffects,
    report: &mut RestoreReport,
) {
    replay_values(form, &payload.values, report);
    form.refresh_derived();
    if !payload.errors.is_empty() {
        apply_errors(form, &payload.errors, effects, report);
    }
}

/// Writes restored values into their controls, firing each field's change
/// reactions right after it lands, the way live edits would. The immediate
/// dispatch matters for the range pair: a restored price must win over the
/// still-untouched slider beside it. Choice controls are only ever checked,
/// never unchecked: restoring adds to what the visitor has already
/// re-entered rather than erasing it.
fn replay_values(
    form: &mut WizardForm,
    values: &BTreeMap<String, FieldValue>,
    report: &mut RestoreReport,
) {
    for (name, value) in values {
        let ids = form.tree.named(name);
        if ids.is_empty() {
            note_unknown_field(&form.tree, name);
            continue;
        }
        apply_value(&mut form.tree, name, &ids, value);
        report.applied_values += 1;
        dispatch::control_changed(form, ids[0]);
    }
}

fn apply_value(tree: &mut ControlTree, name: &str, ids: &[ControlId], value: &FieldValue) {
    match value {
        FieldValue::Multi(items) => {
            for item in items {
                tree.check_matching(name, item);
            }
        }
        FieldValue::Text(text) => {
            for id in ids {
                if tree.control(*id).kind.is_checkable() {
                    if tree.control(*id).value == *text {
                        tree.set_checked(*id, true);
                    }
                } else {
                    tree.set_value(*id, text.clone());
                }
            }
        }
        FieldValue::Flag(flag) => {
            for id in ids {
                if tree.control(*id).kind.is_checkable() {
                    if *flag {
                        tree.set_checked(*id, true);
                    }
                } else {
                    tree.set_value(*id, flag.to_string());
                }
            }
        }
    }
}

/// Marks erroneous controls, collects field-less messages into the page
/// banner, brings the first broken section on screen, and raises one summary
/// alert.
fn apply_errors(
    form: &mut WizardForm,
    errors: &[ServerError],
    effects: &mut dyn PageEffects,
    report: &mut RestoreReport,
) {
    let mut general: Vec<String> = Vec::new();
    let mut summary: Vec<String> = Vec::new();

    for error in errors {
        let message = error.message.trim();
        if message.is_empty() {
            continue;
        }
        summary.push(message.to_string());
        match error.field.as_deref() {
            Some(field) => {
                let ids = form.tree.named(field);
                if ids.is_empty() {
                    note_unknown_field(&form.tree, field);
                    general.push(message.to_string());
                    report.general_errors += 1;
                    continue;
                }
                for id in ids {
                    form.tree.mark_invalid(id);
                    form.tree.set_feedback(id, message);
                }
                report.field_errors += 1;
            }
            None => {
                general.push(message.to_string());
                report.general_errors += 1;
            }
        }
    }

    if !general.is_empty() {
        form.tree.append_banner(&general.join("\n"));
    }

    if let Some(step) = form.tree.first_invalid_step() {
        form.nav.jump_to(&mut form.tree, effects, step);
        if let Some(id) = form.tree.first_invalid() {
            form.tree.focus(id);
        }
    }

    if !summary.is_empty() {
        effects.alert_error(CORRECTION_TITLE, &summary.join("\n"));
        report.alerted = true;
    }
}

/// Legacy fallback: redirects from before the stash carried the messages as
/// a JSON array in the query string. Only consulted when no payload raised
/// an alert of its own.
fn apply_query_errors(
    form: &mut WizardForm,
    url: &PageUrl,
    effects: &mut dyn PageEffects,
    report: &mut RestoreReport,
) {
    let Some(raw) = url.query_get("errors") else {
        return;
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(messages) if !messages.is_empty() => {
            form.tree.append_banner(RECHECK_BANNER);
            effects.alert_error(CORRECTION_TITLE, &messages.join("\n"));
            report.general_errors += messages.len();
            report.alerted = true;
        }
        Ok(_) => {}
        Err(err) => debug!("unparseable errors parameter ignored: {err}"),
    }
}

/// Logs an unknown payload field, naming the closest control when one is
/// similar enough to look like a rename.
fn note_unknown_field(tree: &ControlTree, name: &str) {
    let best = tree
        .names()
        .into_iter()
        .map(|candidate| (jaro_winkler(name, candidate), candidate))
        .max_by(|a, b| a.0.total_cmp(&b.0));
    match best {
        Some((score, candidate)) if score >= NEAR_MISS_THRESHOLD => {
            debug!("payload field {name} has no control; closest is {candidate}");
        }
        _ => debug!("payload field {name} has no control"),
    }
}
