//! In-memory mirror of the rendered form: every control with its live value,
//! checked state, visibility, and validity marker, plus section-level state
//! such as chips, the progress figure, and the error banner.

use std::collections::BTreeMap;

use crate::schema::{Constraint, FieldKind, FieldSpec, FieldValue, FormSpec};

/// Stable index of one control inside a [`ControlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlId(usize);

/// Concrete control variant. Choice groups from the schema expand into one
/// control per option, so radios and checkboxes appear here individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Number,
    Select,
    TextArea,
    Radio,
    Checkbox,
    Hidden,
    Slider,
    Submit,
}

impl ControlKind {
    pub fn is_checkable(self) -> bool {
        matches!(self, ControlKind::Radio | ControlKind::Checkbox)
    }

    /// Whether the control can receive focus when its section opens.
    pub fn is_focusable(self) -> bool {
        !matches!(self, ControlKind::Hidden | ControlKind::Submit)
    }
}

#[derive(Debug, Clone)]
pub struct Control {
    pub name: String,
    pub label: String,
    pub kind: ControlKind,
    /// Step of the section the control belongs to.
    pub step: u32,
    /// Current raw value. For radios and checkboxes this is the option the
    /// control stands for; `checked` carries the selection state.
    pub value: String,
    pub checked: bool,
    pub required: bool,
    pub disabled: bool,
    pub visible: bool,
    pub constraint: Constraint,
    /// Logical key of a checkbox group that needs at least one pick.
    pub group_key: Option<String>,
    pub options: Vec<String>,
    pub bounds: Option<(i64, i64)>,
    /// Validity marker, the analogue of an is-invalid style class.
    pub invalid: bool,
    /// Inline error text attached next to the control.
    pub feedback: Option<String>,
}

impl Control {
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// Visibility and title of one section.
#[derive(Debug, Clone)]
pub struct SectionState {
    pub step: u32,
    pub title: String,
    pub visible: bool,
}

/// Progress chip state for one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipState {
    Pending,
    Active,
    Complete,
}

/// Track fill percentages for the dual-handle range, measured from the low
/// bound. Purely presentational.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeVisual {
    pub left_pct: f64,
    pub right_pct: f64,
}

#[derive(Debug, Clone)]
pub struct ControlTree {
    controls: Vec<Control>,
    sections: Vec<SectionState>,
    chips: Vec<ChipState>,
    focused: Option<ControlId>,
    banner: Option<String>,
    progress: u8,
    /// Free-form display labels published by the engine (range summary,
    /// readiness text) keyed by name.
    labels: BTreeMap<String, String>,
    /// Group-level fault markers for required checkbox groups.
    group_faults: BTreeMap<String, bool>,
    range_visual: RangeVisual,
}

impl ControlTree {
    /// Expands a form schema into its control tree. Choice groups become one
    /// control per option; everything else maps one to one.
    pub fn from_spec(spec: &FormSpec) -> Self {
        let mut controls = Vec::new();
        let mut sections = Vec::new();
        for section in &spec.sections {
            sections.push(SectionState {
                step: section.step,
                title: section.title.clone(),
                visible: false,
            });
            for field in &section.fields {
                expand_field(&mut controls, field, section.step);
            }
        }
        let chips = vec![ChipState::Pending; sections.len()];
        ControlTree {
            controls,
            sections,
            chips,
            focused: None,
            banner: None,
            progress: 0,
            labels: BTreeMap::new(),
            group_faults: BTreeMap::new(),
            range_visual: RangeVisual::default(),
        }
    }

    pub fn control(&self, id: ControlId) -> &Control {
        &self.controls[id.0]
    }

    pub fn control_mut(&mut self, id: ControlId) -> &mut Control {
        &mut self.controls[id.0]
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// All control ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = ControlId> {
        (0..self.controls.len()).map(ControlId)
    }

    /// Controls posted under the given name, in document order.
    pub fn named(&self, name: &str) -> Vec<ControlId> {
        self.ids()
            .filter(|id| self.control(*id).name == name)
            .collect()
    }

    pub fn first_named(&self, name: &str) -> Option<ControlId> {
        self.ids().find(|id| self.control(*id).name == name)
    }

    /// Distinct control names, in document order.
    pub fn names(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for control in &self.controls {
            if !seen.contains(&control.name.as_str()) {
                seen.push(control.name.as_str());
            }
        }
        seen
    }

    pub fn section_controls(&self, step: u32) -> Vec<ControlId> {
        self.ids()
            .filter(|id| self.control(*id).step == step)
            .collect()
    }

    pub fn sections(&self) -> &[SectionState] {
        &self.sections
    }

    pub fn section(&self, step: u32) -> Option<&SectionState> {
        self.sections.iter().find(|s| s.step == step)
    }

    pub fn has_section(&self, step: u32) -> bool {
        self.section(step).is_some()
    }

    pub fn total_steps(&self) -> u32 {
        self.sections.len() as u32
    }

    /// First declared step, used as the landing section.
    pub fn first_step(&self) -> Option<u32> {
        if self.has_section(1) {
            return Some(1);
        }
        self.sections.first().map(|s| s.step)
    }

    pub fn set_section_visible(&mut self, step: u32, visible: bool) {
        if let Some(section) = self.sections.iter_mut().find(|s| s.step == step) {
            section.visible = visible;
        }
    }

    pub fn show_only(&mut self, step: u32) {
        for section in &mut self.sections {
            section.visible = section.step == step;
        }
    }

    pub fn visible_step(&self) -> Option<u32> {
        self.sections.iter().find(|s| s.visible).map(|s| s.step)
    }

    pub fn set_value(&mut self, id: ControlId, value: impl Into<String>) {
        self.controls[id.0].value = value.into();
    }

    pub fn set_checked(&mut self, id: ControlId, checked: bool) {
        self.controls[id.0].checked = checked;
    }

    /// Checks every checkable control with the given name whose option value
    /// matches. Never unchecks.
    pub fn check_matching(&mut self, name: &str, value: &str) {
        for control in &mut self.controls {
            if control.name == name && control.kind.is_checkable() && control.value == value {
                control.checked = true;
            }
        }
    }

    /// Values of the checked members of a choice group.
    pub fn checked_values(&self, name: &str) -> Vec<String> {
        self.controls
            .iter()
            .filter(|c| c.name == name && c.kind.is_checkable() && c.checked)
            .map(|c| c.value.clone())
            .collect()
    }

    pub fn group_members(&self, key: &str) -> Vec<ControlId> {
        self.ids()
            .filter(|id| self.control(*id).group_key.as_deref() == Some(key))
            .collect()
    }

    pub fn set_group_fault(&mut self, key: &str, faulted: bool) {
        self.group_faults.insert(key.to_string(), faulted);
    }

    pub fn group_fault(&self, key: &str) -> bool {
        self.group_faults.get(key).copied().unwrap_or(false)
    }

    pub fn mark_invalid(&mut self, id: ControlId) {
        self.controls[id.0].invalid = true;
    }

    /// Clears the validity marker only; inline feedback text is kept and
    /// simply stops being shown until the control is marked again.
    pub fn clear_invalid(&mut self, id: ControlId) {
        self.controls[id.0].invalid = false;
    }

    pub fn set_feedback(&mut self, id: ControlId, text: impl Into<String>) {
        self.controls[id.0].feedback = Some(text.into());
    }

    pub fn any_invalid(&self) -> bool {
        self.controls.iter().any(|c| c.invalid)
    }

    pub fn first_invalid(&self) -> Option<ControlId> {
        self.ids().find(|id| self.control(*id).invalid)
    }

    /// Step of the first invalid control in document order.
    pub fn first_invalid_step(&self) -> Option<u32> {
        self.first_invalid().map(|id| self.control(id).step)
    }

    /// Finds a hidden control by name, creating it inside the given step when
    /// absent.
    pub fn ensure_hidden(&mut self, name: &str, step: u32) -> ControlId {
        if let Some(id) = self.first_named(name) {
            return id;
        }
        self.controls.push(Control {
            name: name.to_string(),
            label: name.to_string(),
            kind: ControlKind::Hidden,
            step,
            value: String::new(),
            checked: false,
            required: false,
            disabled: false,
            visible: false,
            constraint: Constraint::None,
            group_key: None,
            options: Vec::new(),
            bounds: None,
            invalid: false,
            feedback: None,
        });
        ControlId(self.controls.len() - 1)
    }

    pub fn focus(&mut self, id: ControlId) {
        self.focused = Some(id);
    }

    pub fn focused(&self) -> Option<ControlId> {
        self.focused
    }

    pub fn first_focusable_in(&self, step: u32) -> Option<ControlId> {
        self.section_controls(step).into_iter().find(|id| {
            let control = self.control(*id);
            control.kind.is_focusable() && control.visible && !control.disabled
        })
    }

    /// Focuses the first usable control of a section, leaving focus untouched
    /// when the section has none.
    pub fn focus_first_in(&mut self, step: u32) {
        if let Some(id) = self.first_focusable_in(step) {
            self.focused = Some(id);
        }
    }

    pub fn set_progress(&mut self, pct: u8) {
        self.progress = pct;
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn chips(&self) -> &[ChipState] {
        &self.chips
    }

    /// Recomputes every chip relative to the active step: earlier sections
    /// show complete, the active one highlights, later ones stay pending.
    pub fn set_chips_for(&mut self, active_step: u32) {
        for (index, section) in self.sections.iter().enumerate() {
            self.chips[index] = if section.step < active_step {
                ChipState::Complete
            } else if section.step == active_step {
                ChipState::Active
            } else {
                ChipState::Pending
            };
        }
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Appends a line to the page-level error banner, creating it on first
    /// use.
    pub fn append_banner(&mut self, text: &str) {
        match &mut self.banner {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(text);
            }
            None => self.banner = Some(text.to_string()),
        }
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    pub fn set_label(&mut self, key: &str, text: impl Into<String>) {
        self.labels.insert(key.to_string(), text.into());
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn set_range_visual(&mut self, visual: RangeVisual) {
        self.range_visual = visual;
    }

    pub fn range_visual(&self) -> RangeVisual {
        self.range_visual
    }

    pub fn disable_submit_triggers(&mut self) {
        for control in &mut self.controls {
            if control.kind == ControlKind::Submit {
                control.disabled = true;
            }
        }
    }

    /// Native-style whole-form check: required controls filled, constraints
    /// satisfied, required radio groups answered. Disabled and hidden
    /// controls are exempt, matching built-in form validation.
    pub fn native_valid(&self) -> bool {
        let mut seen_radio_groups: Vec<&str> = Vec::new();
        for control in &self.controls {
            if control.disabled
                || matches!(control.kind, ControlKind::Hidden | ControlKind::Submit)
            {
                continue;
            }
            match control.kind {
                ControlKind::Radio => {
                    if seen_radio_groups.contains(&control.name.as_str()) {
                        continue;
                    }
                    seen_radio_groups.push(&control.name);
                    let members: Vec<&Control> = self
                        .controls
                        .iter()
                        .filter(|c| c.kind == ControlKind::Radio && c.name == control.name)
                        .collect();
                    let required = members.iter().any(|c| c.required && !c.disabled);
                    if required && !members.iter().any(|c| c.checked) {
                        return false;
                    }
                }
                ControlKind::Checkbox => {
                    if control.required && !control.checked {
                        return false;
                    }
                }
                _ => {
                    if control.required && control.is_blank() {
                        return false;
                    }
                    if !control.constraint.check(&control.value) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Snapshot of what a post body would carry: checked choices grouped by
    /// name, scalar controls as-is. Disabled controls and submit triggers are
    /// left out, matching how browsers build form data.
    pub fn collect_values(&self) -> BTreeMap<String, FieldValue> {
        let mut scalars: BTreeMap<String, String> = BTreeMap::new();
        let mut picks: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut pick_order: Vec<String> = Vec::new();
        for control in &self.controls {
            if control.disabled || control.kind == ControlKind::Submit {
                continue;
            }
            match control.kind {
                ControlKind::Radio => {
                    if control.checked {
                        scalars.insert(control.name.clone(), control.value.clone());
                    }
                }
                ControlKind::Checkbox => {
                    if control.checked {
                        if !pick_order.contains(&control.name) {
                            pick_order.push(control.name.clone());
                        }
                        picks
                            .entry(control.name.clone())
                            .or_default()
                            .push(control.value.clone());
                    }
                }
                _ => {
                    scalars.insert(control.name.clone(), control.value.clone());
                }
            }
        }
        let mut values: BTreeMap<String, FieldValue> = scalars
            .into_iter()
            .map(|(name, value)| (name, FieldValue::Text(value)))
            .collect();
        for name in pick_order {
            if let Some(items) = picks.remove(&name) {
                values.insert(name, FieldValue::Multi(items));
            }
        }
        values
    }
}

fn expand_field(controls: &mut Vec<Control>, field: &FieldSpec, step: u32) {
    let base = Control {
        name: field.name.clone(),
        label: field.label.clone(),
        kind: ControlKind::Text,
        step,
        value: field.initial.clone().unwrap_or_default(),
        checked: false,
        required: field.required,
        disabled: false,
        visible: !field.starts_hidden,
        constraint: field.constraint.clone(),
        group_key: None,
        options: Vec::new(),
        bounds: field.bounds,
        invalid: false,
        feedback: None,
    };
    match field.kind {
        FieldKind::RadioGroup => {
            for option in &field.options {
                controls.push(Control {
                    kind: ControlKind::Radio,
                    value: option.clone(),
                    constraint: Constraint::None,
                    ..base.clone()
                });
            }
        }
        FieldKind::CheckboxGroup => {
            // Members are never individually required; a group key marks the
            // at-least-one rule instead.
            for option in &field.options {
                controls.push(Control {
                    kind: ControlKind::Checkbox,
                    value: option.clone(),
                    required: false,
                    constraint: Constraint::None,
                    group_key: field.group_key.clone(),
                    ..base.clone()
                });
            }
        }
        FieldKind::Select => controls.push(Control {
            kind: ControlKind::Select,
            options: field.options.clone(),
            ..base
        }),
        FieldKind::Text => controls.push(base),
        FieldKind::Number => controls.push(Control {
            kind: ControlKind::Number,
            ..base
        }),
        FieldKind::TextArea => controls.push(Control {
            kind: ControlKind::TextArea,
            ..base
        }),
        FieldKind::Hidden => controls.push(Control {
            kind: ControlKind::Hidden,
            visible: false,
            ..base
        }),
        FieldKind::Slider => controls.push(Control {
            kind: ControlKind::Slider,
            ..base
        }),
        FieldKind::Submit => controls.push(Control {
            kind: ControlKind::Submit,
            required: false,
            ..base
        }),
    }
}
