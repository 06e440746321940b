//! Section validation. A pure check walks every logical field of a section
//! and reports per-field verdicts; a separate pass applies the verdicts to
//! the tree as validity markers. Keeping the two apart lets navigation and
//! submission share one rule set while deciding themselves how to react.

use crate::wizard::tree::{ControlId, ControlKind, ControlTree};

/// Verdict for one logical field.
#[derive(Debug, Clone)]
pub struct FieldCheck {
    pub name: String,
    pub ok: bool,
    /// Controls the verdict covers: one for scalars, every member for choice
    /// groups.
    pub controls: Vec<ControlId>,
    /// Set when the verdict belongs to a required checkbox group; faults are
    /// then surfaced at group level instead of per control.
    pub group_key: Option<String>,
}

/// Result of checking one section. Field order follows document order.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub step: u32,
    pub checks: Vec<FieldCheck>,
}

impl ValidationOutcome {
    pub fn ok(&self) -> bool {
        self.checks.iter().all(|check| check.ok)
    }

    pub fn failing(&self) -> impl Iterator<Item = &FieldCheck> {
        self.checks.iter().filter(|check| !check.ok)
    }

    pub fn first_failing_control(&self) -> Option<ControlId> {
        self.failing()
            .next()
            .and_then(|check| check.controls.first().copied())
    }
}

/// Checks every required field of a section without mutating anything and
/// without short-circuiting: every field is evaluated even after the first
/// failure, so all verdicts are available at once.
pub fn check_section(tree: &ControlTree, step: u32) -> ValidationOutcome {
    let mut checks: Vec<FieldCheck> = Vec::new();
    let mut seen_radio: Vec<String> = Vec::new();
    let mut seen_groups: Vec<String> = Vec::new();

    for id in tree.section_controls(step) {
        let control = tree.control(id);
        match control.kind {
            ControlKind::Hidden | ControlKind::Submit => {}
            ControlKind::Radio => {
                if seen_radio.contains(&control.name) {
                    continue;
                }
                seen_radio.push(control.name.clone());
                let members: Vec<ControlId> = tree
                    .section_controls(step)
                    .into_iter()
                    .filter(|m| {
                        let c = tree.control(*m);
                        c.kind == ControlKind::Radio && c.name == control.name
                    })
                    .collect();
                let usable: Vec<ControlId> = members
                    .iter()
                    .copied()
                    .filter(|m| {
                        let c = tree.control(*m);
                        c.visible && !c.disabled
                    })
                    .collect();
                let required = usable.iter().any(|m| tree.control(*m).required);
                if usable.is_empty() || !required {
                    continue;
                }
                let ok = usable.iter().any(|m| tree.control(*m).checked);
                checks.push(FieldCheck {
                    name: control.name.clone(),
                    ok,
                    controls: members,
                    group_key: None,
                });
            }
            ControlKind::Checkbox => {
                let Some(key) = control.group_key.clone() else {
                    // Ungrouped checkboxes carry no requirement of their own.
                    continue;
                };
                if seen_groups.contains(&key) {
                    continue;
                }
                seen_groups.push(key.clone());
                let members: Vec<ControlId> = tree
                    .section_controls(step)
                    .into_iter()
                    .filter(|m| tree.control(*m).group_key.as_deref() == Some(key.as_str()))
                    .collect();
                if !members.iter().any(|m| {
                    let c = tree.control(*m);
                    c.visible && !c.disabled
                }) {
                    continue;
                }
                let ok = members.iter().any(|m| tree.control(*m).checked);
                checks.push(FieldCheck {
                    name: control.name.clone(),
                    ok,
                    controls: members,
                    group_key: Some(key),
                });
            }
            _ => {
                if !control.required || control.disabled || !control.visible {
                    continue;
                }
                let ok = !control.is_blank() && control.constraint.check(&control.value);
                checks.push(FieldCheck {
                    name: control.name.clone(),
                    ok,
                    controls: vec![id],
                    group_key: None,
                });
            }
        }
    }

    ValidationOutcome { step, checks }
}

/// Applies verdicts to the tree: scalar and radio failures mark their
/// controls, checkbox group failures raise the group fault, and passing
/// fields have their markers cleared.
pub fn apply_markers(tree: &mut ControlTree, outcome: &ValidationOutcome) {
    for check in &outcome.checks {
        match &check.group_key {
            Some(key) => tree.set_group_fault(key, !check.ok),
            None => {
                for id in &check.controls {
                    if check.ok {
                        tree.clear_invalid(*id);
                    } else {
                        tree.mark_invalid(*id);
                    }
                }
            }
        }
    }
}

/// Convenience wrapper: check a section and apply the markers.
pub fn validate_section(tree: &mut ControlTree, step: u32) -> ValidationOutcome {
    let outcome = check_section(tree, step);
    apply_markers(tree, &outcome);
    outcome
}
