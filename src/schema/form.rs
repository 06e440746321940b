use crate::schema::field::FieldSpec;

/// One step of a multi-step form.
#[derive(Debug, Clone)]
pub struct SectionSpec {
    /// 1-based step number the section is addressed by.
    pub step: u32,
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

impl SectionSpec {
    pub fn new(step: u32, title: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        SectionSpec {
            step,
            title: title.into(),
            fields,
        }
    }
}

/// Names the four controls of a dual-handle range pair plus the hidden
/// composite they are folded into and the summary label that mirrors them.
#[derive(Debug, Clone)]
pub struct RangeSpec {
    pub min_input: String,
    pub max_input: String,
    pub min_slider: String,
    pub max_slider: String,
    /// Hidden field that carries the combined `"min - max"` value.
    pub composite: String,
    /// Label key the formatted summary text is published under.
    pub summary: String,
}

/// Conditional reveal: watching one control's selection shows or hides a
/// dependent control.
#[derive(Debug, Clone)]
pub struct ToggleSpec {
    /// Name of the watched choice control.
    pub watch: String,
    /// Selection that turns the target on.
    pub when_value: String,
    /// Name of the dependent control.
    pub target: String,
    /// Whether the target becomes required while visible.
    pub require_when_visible: bool,
    /// Whether hiding the target also clears its value.
    pub clear_on_hide: bool,
}

/// Folds a free-text companion of an "Other" style choice into the comments
/// field at submit time.
#[derive(Debug, Clone)]
pub struct MergeSpec {
    pub watch: String,
    pub when_value: String,
    /// Name of the free-text control holding the elaboration.
    pub text_field: String,
    /// Prefix the merged line is labelled with.
    pub label: String,
}

/// Live label derived from a 1-10 readiness slider.
#[derive(Debug, Clone)]
pub struct ReadinessSpec {
    pub field: String,
}

/// Complete descriptor of one intake form.
#[derive(Debug, Clone)]
pub struct FormSpec {
    /// DOM-style element id the form is resolved by.
    pub id: String,
    pub title: String,
    pub sections: Vec<SectionSpec>,
    pub range: Option<RangeSpec>,
    pub toggles: Vec<ToggleSpec>,
    pub merges: Vec<MergeSpec>,
    /// Field the "Other" elaborations are merged into.
    pub comments_field: Option<String>,
    pub readiness: Option<ReadinessSpec>,
    /// Canonical page path used for post-submit redirects.
    pub canonical_path: String,
    /// Endpoint the one-time restore payload is fetched from, when the form
    /// participates in the restore protocol.
    pub restore_path: Option<String>,
}

impl FormSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, canonical_path: impl Into<String>) -> Self {
        FormSpec {
            id: id.into(),
            title: title.into(),
            sections: Vec::new(),
            range: None,
            toggles: Vec::new(),
            merges: Vec::new(),
            comments_field: None,
            readiness: None,
            canonical_path: canonical_path.into(),
            restore_path: None,
        }
    }

    pub fn total_steps(&self) -> u32 {
        self.sections.len() as u32
    }

    pub fn section(&self, step: u32) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.step == step)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.sections
            .iter()
            .flat_map(|s| s.fields.iter())
            .find(|f| f.name == name)
    }
}
