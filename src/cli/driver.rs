//! Interactive wizard session over one form, following the same lifecycle a
//! page visit does: load (restoring any stashed draft), render the active
//! step, collect answers, navigate, submit, follow the redirect, and repeat
//! until the submission is accepted or the visitor leaves.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use crate::cli::{output, prompts, range_widget, CliError};
use crate::config::ConfigManager;
use crate::errors::IntakeError;
use crate::restore::{
    handle_page_load, FileStore, HttpRestoreSource, RestoreSource, SessionKey, StoreRestoreSource,
};
use crate::schema::catalog;
use crate::schema::{FieldKind, FieldSpec, FieldValue, FormSpec, RangeSpec};
use crate::submit::{JsonFileSink, LogNotifier, SubmissionGateway, SubmissionOutcome};
use crate::wizard::orchestrator::{self, SubmitHandoff};
use crate::wizard::range::RangeState;
use crate::wizard::{dispatch, ChipState, ControlId, Page, PageEffects, PageUrl, WizardForm};

/// Effects rendered straight to the terminal. Alerts print as error blocks;
/// the success dialog asks for an acknowledgement like its modal counterpart.
pub struct TerminalEffects;

impl PageEffects for TerminalEffects {
    fn alert_error(&mut self, title: &str, body: &str) {
        output::error(title);
        for line in body.lines().filter(|line| !line.trim().is_empty()) {
            output::detail(line);
        }
    }

    fn confirm_success(&mut self, title: &str, body: &str) -> bool {
        output::success(title);
        if !body.trim().is_empty() {
            output::info(body);
        }
        matches!(prompts::confirm("Done", true), Ok(Some(true)))
    }

    fn scroll_to_top(&mut self) {
        output::blank_line();
    }

    fn navigate(&mut self, path: &str) {
        debug!(path, "navigation requested");
    }
}

enum SessionOutcome {
    Redirect(PageUrl),
    Cancelled,
}

#[derive(Clone, Copy)]
enum NavAction {
    Next,
    Back,
    Submit,
    Quit,
}

/// Hands a completed submission to the gateway and keeps its outcome so the
/// session loop can follow the redirect.
struct GatewayHandoff<'a> {
    gateway: SubmissionGateway<'a>,
    session: &'a SessionKey,
    referrer: String,
    outcome: Option<Result<SubmissionOutcome, IntakeError>>,
}

impl SubmitHandoff for GatewayHandoff<'_> {
    fn deliver(&mut self, form_id: &str, values: &BTreeMap<String, FieldValue>) {
        let Some(spec) = catalog::form_by_id(form_id) else {
            self.outcome = Some(Err(IntakeError::UnknownForm(form_id.to_string())));
            return;
        };
        self.outcome = Some(self.gateway.handle(
            &spec,
            self.session,
            values.clone(),
            Some(&self.referrer),
            None,
        ));
    }
}

pub fn run_wizard(form_id: Option<&str>) -> Result<(), CliError> {
    let config = ConfigManager::new()?.load_or_create()?;
    let spec = match form_id {
        Some(id) => catalog::form_by_id(id).ok_or_else(|| CliError::UnknownForm(id.to_string()))?,
        None => catalog::all_forms()
            .into_iter()
            .find(|form| form.canonical_path == config.canonical_form_path)
            .unwrap_or_else(catalog::cash_buyer),
    };

    let store = FileStore::new();
    let sink = JsonFileSink::new();
    let session = SessionKey::from_uuid(config.session_key);
    let mut effects = TerminalEffects;
    let mut url = PageUrl::new(&spec.canonical_path);

    loop {
        let mut page = Page::single(WizardForm::from_spec(&spec), url.clone());

        let http_source;
        let store_source;
        let source: Option<&dyn RestoreSource> = match (&config.restore_url, &spec.restore_path) {
            (Some(base), Some(path)) => {
                let mut fetch = HttpRestoreSource::new(
                    format!("{}{}", base.trim_end_matches('/'), path),
                    Duration::from_secs(config.fetch_timeout_secs),
                );
                if let Some(cookie) = &config.session_cookie {
                    fetch = fetch.with_cookie(cookie.clone());
                }
                http_source = fetch;
                Some(&http_source)
            }
            _ => {
                store_source = StoreRestoreSource::new(&store, session);
                Some(&store_source)
            }
        };

        let report =
            handle_page_load(&mut page.forms[0], &mut page.url, source, None, &mut effects);
        if report.applied_values > 0 {
            output::info(format!(
                "Restored {} saved answer(s).",
                report.applied_values
            ));
        }
        if report.success_confirmed {
            debug!("submission confirmed, session over");
            break;
        }

        match run_form_session(&mut page, &spec, &store, &sink, &session, &mut effects)? {
            SessionOutcome::Redirect(next) => {
                url = next;
            }
            SessionOutcome::Cancelled => {
                output::info("Wizard dismissed.");
                break;
            }
        }
    }
    Ok(())
}

fn run_form_session(
    page: &mut Page,
    spec: &FormSpec,
    store: &FileStore,
    sink: &JsonFileSink,
    session: &SessionKey,
    effects: &mut TerminalEffects,
) -> Result<SessionOutcome, CliError> {
    loop {
        let step = page.forms[0].nav.current();
        render_step(&page.forms[0], step);
        if !collect_step_answers(&mut page.forms[0], spec, step)? {
            return Ok(SessionOutcome::Cancelled);
        }

        let form = &page.forms[0];
        let total = form.tree.total_steps();
        let first = form.tree.first_step().unwrap_or(1);

        let mut labels: Vec<String> = Vec::new();
        let mut actions: Vec<NavAction> = Vec::new();
        if step < total {
            labels.push("Continue".to_string());
            actions.push(NavAction::Next);
        } else {
            labels.push("Submit".to_string());
            actions.push(NavAction::Submit);
        }
        if step > first {
            labels.push("Go back".to_string());
            actions.push(NavAction::Back);
        }
        labels.push("Leave the wizard".to_string());
        actions.push(NavAction::Quit);

        let choice = match prompts::select_one("Next", &labels, Some(0))? {
            Some(index) => actions[index],
            None => NavAction::Quit,
        };

        match choice {
            NavAction::Next => {
                let form = &mut page.forms[0];
                let target = form.nav.current() + 1;
                form.nav.go_to(&mut form.tree, effects, target);
            }
            NavAction::Back => {
                let form = &mut page.forms[0];
                let target = form.nav.current() - 1;
                form.nav.go_to(&mut form.tree, effects, target);
            }
            NavAction::Submit => {
                let notifier = LogNotifier;
                let mut handoff = GatewayHandoff {
                    gateway: SubmissionGateway::new(store, sink, &notifier),
                    session,
                    referrer: page.url.path.clone(),
                    outcome: None,
                };
                if orchestrator::submit(page, Some(&spec.id), effects, &mut handoff) {
                    match handoff.outcome {
                        Some(Ok(outcome)) => {
                            return Ok(SessionOutcome::Redirect(outcome.redirect().clone()));
                        }
                        Some(Err(error)) => return Err(error.into()),
                        None => return Ok(SessionOutcome::Cancelled),
                    }
                }
                // Gate failed; the orchestrator already jumped to the first
                // failing step and raised the alert.
            }
            NavAction::Quit => return Ok(SessionOutcome::Cancelled),
        }
    }
}

fn render_step(form: &WizardForm, step: u32) {
    let title = form
        .tree
        .section(step)
        .map(|section| section.title.clone())
        .unwrap_or_default();
    output::section(format!("{title} ({step} of {})", form.tree.total_steps()));
    output::info(format!("{}  {}%", chip_line(form), form.tree.progress()));
    if let Some(banner) = form.tree.banner() {
        output::warning(banner);
    }
    for id in form.tree.section_controls(step) {
        let control = form.tree.control(id);
        if control.invalid {
            if let Some(feedback) = &control.feedback {
                output::warning(format!("{}: {feedback}", control.label));
            }
        }
    }
}

fn chip_line(form: &WizardForm) -> String {
    let plain = output::current_preferences().plain_mode;
    form.tree
        .sections()
        .iter()
        .zip(form.tree.chips())
        .map(|(section, chip)| {
            let marker = match chip {
                ChipState::Complete => {
                    if plain {
                        "x"
                    } else {
                        "✔"
                    }
                }
                ChipState::Active => ">",
                ChipState::Pending => " ",
            };
            format!("[{marker} {}]", section.title)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prompts every usable control of the section, in declaration order. The
/// dispatch hook runs after each answer, so toggled fields revealed by an
/// earlier answer get prompted in the same pass. Returns `false` when the
/// visitor cancelled.
fn collect_step_answers(
    form: &mut WizardForm,
    spec: &FormSpec,
    step: u32,
) -> Result<bool, CliError> {
    let Some(section) = spec.section(step) else {
        return Ok(true);
    };
    let range_spec = form.range.clone();
    let fields: Vec<FieldSpec> = section.fields.clone();

    for field in &fields {
        if matches!(field.kind, FieldKind::Hidden | FieldKind::Submit) {
            continue;
        }

        if let Some(range) = &range_spec {
            if field.name == range.min_input {
                prompt_range(form, range)?;
                continue;
            }
            if field.name == range.max_input
                || field.name == range.min_slider
                || field.name == range.max_slider
            {
                continue;
            }
        }

        let ids = form.tree.named(&field.name);
        if ids.is_empty() {
            continue;
        }
        let usable = ids.iter().any(|id| {
            let control = form.tree.control(*id);
            control.visible && !control.disabled
        });
        if !usable {
            continue;
        }

        let proceed = match field.kind {
            FieldKind::RadioGroup => prompt_radio(form, field, &ids)?,
            FieldKind::CheckboxGroup => prompt_checkbox_group(form, field, &ids)?,
            FieldKind::Select => prompt_select(form, field, ids[0])?,
            FieldKind::Slider => prompt_slider(form, field, ids[0])?,
            _ => prompt_text(form, field, ids[0])?,
        };
        if !proceed {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Runs the dual-handle widget over the paired inputs. Dismissing the widget
/// keeps the current values; it never cancels the session.
fn prompt_range(form: &mut WizardForm, range: &RangeSpec) -> Result<(), CliError> {
    let Some(min_id) = form.tree.first_named(&range.min_input) else {
        return Ok(());
    };
    let Some(max_id) = form.tree.first_named(&range.max_input) else {
        return Ok(());
    };
    let bounds = form
        .tree
        .first_named(&range.min_slider)
        .and_then(|id| form.tree.control(id).bounds);
    let Some((lo, hi)) = bounds else {
        return Ok(());
    };

    let current = RangeState {
        min: control_amount(form, min_id).unwrap_or(lo),
        max: control_amount(form, max_id).unwrap_or(hi),
    };

    if let Some(picked) = range_widget::pick_range("Price range", lo, hi, current)? {
        form.tree.set_value(min_id, picked.min.to_string());
        dispatch::control_changed(form, min_id);
        form.tree.set_value(max_id, picked.max.to_string());
        dispatch::control_changed(form, max_id);
    }
    Ok(())
}

fn control_amount(form: &WizardForm, id: ControlId) -> Option<i64> {
    form.tree.control(id).value.trim().parse::<i64>().ok()
}

fn prompt_text(form: &mut WizardForm, field: &FieldSpec, id: ControlId) -> Result<bool, CliError> {
    let current = form.tree.control(id).value.clone();
    let default = if current.trim().is_empty() {
        None
    } else {
        Some(current.as_str())
    };
    let label = if field.required {
        field.label.clone()
    } else {
        format!("{} (optional)", field.label)
    };
    match prompts::text_input(&label, default)? {
        Some(value) => {
            form.tree.set_value(id, value);
            dispatch::control_changed(form, id);
            Ok(true)
        }
        None => Ok(false),
    }
}

fn prompt_radio(
    form: &mut WizardForm,
    field: &FieldSpec,
    ids: &[ControlId],
) -> Result<bool, CliError> {
    let options: Vec<String> = ids
        .iter()
        .map(|id| form.tree.control(*id).value.clone())
        .collect();
    let default = ids.iter().position(|id| form.tree.control(*id).checked);
    let Some(choice) = prompts::select_one(&field.label, &options, default)? else {
        return Ok(false);
    };
    for (index, id) in ids.iter().enumerate() {
        form.tree.set_checked(*id, index == choice);
    }
    dispatch::control_changed(form, ids[choice]);
    Ok(true)
}

fn prompt_checkbox_group(
    form: &mut WizardForm,
    field: &FieldSpec,
    ids: &[ControlId],
) -> Result<bool, CliError> {
    let options: Vec<String> = ids
        .iter()
        .map(|id| form.tree.control(*id).value.clone())
        .collect();
    let checked: Vec<bool> = ids.iter().map(|id| form.tree.control(*id).checked).collect();
    let Some(picks) = prompts::select_many(&field.label, &options, &checked)? else {
        return Ok(false);
    };
    let mut changed = Vec::new();
    for (index, id) in ids.iter().enumerate() {
        let desired = picks.contains(&index);
        if form.tree.control(*id).checked != desired {
            form.tree.set_checked(*id, desired);
            changed.push(*id);
        }
    }
    for id in changed {
        dispatch::control_changed(form, id);
    }
    Ok(true)
}

fn prompt_select(
    form: &mut WizardForm,
    field: &FieldSpec,
    id: ControlId,
) -> Result<bool, CliError> {
    let mut options: Vec<String> = Vec::new();
    if !field.required {
        options.push("(leave blank)".to_string());
    }
    options.extend(field.options.iter().cloned());
    let offset = usize::from(!field.required);
    let current = form.tree.control(id).value.clone();
    let default = field
        .options
        .iter()
        .position(|option| *option == current)
        .map(|index| index + offset);
    let Some(choice) = prompts::select_one(&field.label, &options, default)? else {
        return Ok(false);
    };
    if !field.required && choice == 0 {
        return Ok(true);
    }
    form.tree.set_value(id, options[choice].clone());
    dispatch::control_changed(form, id);
    Ok(true)
}

fn prompt_slider(
    form: &mut WizardForm,
    field: &FieldSpec,
    id: ControlId,
) -> Result<bool, CliError> {
    let Some((lo, hi)) = form.tree.control(id).bounds else {
        return prompt_text(form, field, id);
    };
    let is_readiness = form
        .readiness
        .as_ref()
        .map(|readiness| readiness.field == field.name)
        .unwrap_or(false);
    let options: Vec<String> = (lo..=hi)
        .map(|value| {
            if is_readiness {
                match catalog::readiness_label(value) {
                    Some(text) => format!("{value} - {text}"),
                    None => value.to_string(),
                }
            } else {
                value.to_string()
            }
        })
        .collect();
    let default = form
        .tree
        .control(id)
        .value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|value| (lo..=hi).contains(value))
        .map(|value| (value - lo) as usize);
    let Some(choice) = prompts::select_one(&field.label, &options, default)? else {
        return Ok(false);
    };
    form.tree.set_value(id, (lo + choice as i64).to_string());
    dispatch::control_changed(form, id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::output::{set_preferences, OutputPreferences};

    #[test]
    fn chip_line_marks_done_active_and_pending_sections() {
        set_preferences(OutputPreferences {
            plain_mode: true,
            quiet_mode: false,
        });
        let mut form = WizardForm::from_spec(&catalog::cash_buyer());
        form.init();
        form.tree.set_chips_for(2);
        let line = chip_line(&form);
        assert!(line.starts_with("[x Contact Information]"));
        assert!(line.contains("[> Buying Experience]"));
        assert!(line.contains("[  Financing]"));
    }
}
