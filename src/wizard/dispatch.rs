//! Reactions to control changes: range resyncs, conditional reveals, the
//! readiness label, and clearing stale validity markers as soon as the
//! offending control is corrected.

use crate::schema::{ReadinessSpec, ToggleSpec};
use crate::schema::catalog::readiness_label;
use crate::wizard::page::WizardForm;
use crate::wizard::range::{self, RangeTrigger};
use crate::wizard::tree::{ControlId, ControlTree};

/// Entry point for "this control just changed". Runs every reaction that
/// watches the control, then re-judges its validity marker.
pub fn control_changed(form: &mut WizardForm, id: ControlId) {
    let name = form.tree.control(id).name.clone();

    if let Some(spec) = form.range.clone() {
        let trigger = if name == spec.min_slider {
            Some(RangeTrigger::MinSlider)
        } else if name == spec.max_slider {
            Some(RangeTrigger::MaxSlider)
        } else if name == spec.min_input {
            Some(RangeTrigger::MinInput)
        } else if name == spec.max_input {
            Some(RangeTrigger::MaxInput)
        } else {
            None
        };
        if let Some(trigger) = trigger {
            range::sync(&mut form.tree, &spec, trigger);
        }
    }

    for toggle in form.toggles.clone() {
        if toggle.watch == name {
            apply_toggle(&mut form.tree, &toggle);
        }
    }

    if let Some(spec) = form.readiness.clone() {
        if spec.field == name {
            update_readiness(&mut form.tree, &spec);
        }
    }

    revalidate_control(&mut form.tree, id);
}

/// Applies one conditional reveal rule based on the watched control's current
/// selection.
pub fn apply_toggle(tree: &mut ControlTree, rule: &ToggleSpec) {
    let on = watched_selection_matches(tree, &rule.watch, &rule.when_value);
    for id in tree.named(&rule.target) {
        let control = tree.control_mut(id);
        control.visible = on;
        if rule.require_when_visible {
            control.required = on;
        }
        if !on {
            if rule.clear_on_hide {
                control.value.clear();
            }
            control.invalid = false;
        }
    }
}

/// Re-runs every toggle rule of a form, e.g. after restoring values.
pub fn apply_all_toggles(form: &mut WizardForm) {
    for toggle in form.toggles.clone() {
        apply_toggle(&mut form.tree, &toggle);
    }
}

/// Publishes the readiness label matching the slider's current score.
pub fn update_readiness(tree: &mut ControlTree, spec: &ReadinessSpec) {
    let Some(id) = tree.first_named(&spec.field) else {
        return;
    };
    let Ok(score) = tree.control(id).value.trim().parse::<i64>() else {
        return;
    };
    if let Some(label) = readiness_label(score) {
        tree.set_label(&spec.field, label);
    }
}

fn watched_selection_matches(tree: &ControlTree, watch: &str, when_value: &str) -> bool {
    let ids = tree.named(watch);
    if ids.is_empty() {
        return false;
    }
    if ids
        .iter()
        .any(|id| tree.control(*id).kind.is_checkable())
    {
        return tree.checked_values(watch).iter().any(|v| v == when_value);
    }
    tree.control(ids[0]).value == when_value
}

/// Clears the validity marker of a corrected control, and the page banner
/// once nothing is marked invalid anymore.
fn revalidate_control(tree: &mut ControlTree, id: ControlId) {
    let control = tree.control(id);
    let name = control.name.clone();
    if control.kind.is_checkable() {
        let group_key = control.group_key.clone();
        if !tree.checked_values(&name).is_empty() {
            for member in tree.named(&name) {
                tree.clear_invalid(member);
            }
            if let Some(key) = group_key {
                tree.set_group_fault(&key, false);
            }
        }
    } else {
        let control = tree.control(id);
        let satisfied = (!control.required || !control.is_blank())
            && control.constraint.check(&control.value);
        if satisfied {
            tree.clear_invalid(id);
        }
    }
    if !tree.any_invalid() {
        tree.clear_banner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog;
    use crate::wizard::page::WizardForm;

    fn cash_buyer_form() -> WizardForm {
        let mut form = WizardForm::from_spec(&catalog::cash_buyer());
        form.init();
        form
    }

    #[test]
    fn other_financing_reveals_and_requires_its_text_field() {
        let mut form = cash_buyer_form();
        let other = form.tree.first_named("SourceFinancingOther").unwrap();
        assert!(!form.tree.control(other).visible);

        form.tree.check_matching("SourceFinancing", "Other");
        let watched = form.tree.named("SourceFinancing")[7];
        control_changed(&mut form, watched);
        assert!(form.tree.control(other).visible);
        assert!(form.tree.control(other).required);
    }

    #[test]
    fn hiding_clears_value_and_requirement() {
        let mut form = cash_buyer_form();
        form.tree.check_matching("SourceFinancing", "Other");
        let watched = form.tree.named("SourceFinancing")[7];
        control_changed(&mut form, watched);
        let other = form.tree.first_named("SourceFinancingOther").unwrap();
        form.tree.set_value(other, "crypto windfall");

        form.tree.set_checked(watched, false);
        control_changed(&mut form, watched);
        let other_control = form.tree.control(other);
        assert!(!other_control.visible);
        assert!(!other_control.required);
        assert_eq!(other_control.value, "");
    }

    #[test]
    fn proof_of_funds_reveal_keeps_value_on_hide() {
        let mut form = cash_buyer_form();
        form.tree.check_matching("ProofOfFunds", "Yes");
        let yes = form.tree.named("ProofOfFunds")[0];
        control_changed(&mut form, yes);
        let file = form.tree.first_named("ProofOfFundsFile").unwrap();
        assert!(form.tree.control(file).visible);
        assert!(!form.tree.control(file).required);
        form.tree.set_value(file, "pof.pdf");

        // Switching to No hides the slot but keeps what was entered.
        form.tree.set_checked(yes, false);
        form.tree.check_matching("ProofOfFunds", "No");
        control_changed(&mut form, yes);
        assert!(!form.tree.control(file).visible);
        assert_eq!(form.tree.control(file).value, "pof.pdf");
    }

    #[test]
    fn slider_change_resyncs_the_range() {
        let mut form = cash_buyer_form();
        let slider = form.tree.first_named("priceRangeMinSlider").unwrap();
        form.tree.set_value(slider, "300000");
        control_changed(&mut form, slider);
        let input = form.tree.first_named("PriceRangesMin").unwrap();
        assert_eq!(form.tree.control(input).value, "300000");
    }

    #[test]
    fn readiness_label_follows_the_score() {
        let mut form = cash_buyer_form();
        let slider = form.tree.first_named("PurchaseReadiness").unwrap();
        assert_eq!(form.tree.label("PurchaseReadiness"), Some("Somewhat ready"));
        form.tree.set_value(slider, "10");
        control_changed(&mut form, slider);
        assert_eq!(
            form.tree.label("PurchaseReadiness"),
            Some("Ready to close today")
        );
    }

    #[test]
    fn correcting_a_control_clears_its_marker() {
        let mut form = cash_buyer_form();
        let name = form.tree.first_named("FullName").unwrap();
        form.tree.mark_invalid(name);
        form.tree.append_banner("Please correct the highlighted fields.");

        form.tree.set_value(name, "Ada Lovelace");
        control_changed(&mut form, name);
        assert!(!form.tree.control(name).invalid);
        assert_eq!(form.tree.banner(), None);
    }

    #[test]
    fn banner_stays_while_other_fields_are_still_marked() {
        let mut form = cash_buyer_form();
        let name = form.tree.first_named("FullName").unwrap();
        let email = form.tree.first_named("Email").unwrap();
        form.tree.mark_invalid(name);
        form.tree.mark_invalid(email);
        form.tree.append_banner("Please correct the highlighted fields.");

        form.tree.set_value(name, "Ada Lovelace");
        control_changed(&mut form, name);
        assert!(form.tree.banner().is_some());
    }

    #[test]
    fn checking_any_group_member_clears_the_group_fault() {
        let mut form = cash_buyer_form();
        form.tree.set_group_fault("SourceFinancing", true);
        let member = form.tree.named("SourceFinancing")[2];
        form.tree.set_checked(member, true);
        control_changed(&mut form, member);
        assert!(!form.tree.group_fault("SourceFinancing"));
    }
}
