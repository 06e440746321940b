use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9 ().-]{7,20}$").unwrap()
});

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?[\w.-]+\.[A-Za-z]{2,}(/\S*)?$").unwrap()
});

/// What kind of control a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Select,
    TextArea,
    /// One control per option; at most one may be picked.
    RadioGroup,
    /// One control per option; any number may be picked.
    CheckboxGroup,
    /// Carried in the post body but never rendered.
    Hidden,
    Slider,
    Submit,
}

/// Declarative format check applied to a single scalar value.
///
/// Constraints judge content, not presence: an empty value always passes and
/// is left to the required rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    None,
    Email,
    Phone,
    Url,
    /// Integer greater than or equal to the bound.
    IntMin(i64),
    /// Integer within the inclusive bounds.
    IntRange(i64, i64),
    /// Exactly one of the listed options.
    OneOf(Vec<String>),
}

impl Default for Constraint {
    fn default() -> Self {
        Constraint::None
    }
}

impl Constraint {
    pub fn one_of(options: &[&str]) -> Self {
        Constraint::OneOf(options.iter().map(|o| o.to_string()).collect())
    }

    /// Checks a raw control value against the constraint.
    pub fn check(&self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return true;
        }
        match self {
            Constraint::None => true,
            Constraint::Email => EMAIL_RE.is_match(value),
            Constraint::Phone => PHONE_RE.is_match(value),
            Constraint::Url => URL_RE.is_match(value),
            Constraint::IntMin(min) => {
                value.parse::<i64>().map(|n| n >= *min).unwrap_or(false)
            }
            Constraint::IntRange(lo, hi) => value
                .parse::<i64>()
                .map(|n| n >= *lo && n <= *hi)
                .unwrap_or(false),
            Constraint::OneOf(options) => options.iter().any(|option| option == value),
        }
    }
}

/// One logical field of a form section.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Name the value is posted under.
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub constraint: Constraint,
    /// Options for selects and choice groups.
    pub options: Vec<String>,
    /// Logical key marking a checkbox group that needs at least one pick.
    pub group_key: Option<String>,
    /// Inclusive slider bounds.
    pub bounds: Option<(i64, i64)>,
    /// Value the control starts with before any user input.
    pub initial: Option<String>,
    /// Revealed later by a toggle rule rather than rendered up front.
    pub starts_hidden: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        FieldSpec {
            name: name.into(),
            label: label.into(),
            kind,
            required: true,
            constraint: Constraint::None,
            options: Vec::new(),
            group_key: None,
            bounds: None,
            initial: None,
            starts_hidden: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    /// Marks a checkbox group as requiring at least one selection.
    pub fn with_group_key(mut self, key: impl Into<String>) -> Self {
        self.group_key = Some(key.into());
        self
    }

    pub fn with_bounds(mut self, lo: i64, hi: i64) -> Self {
        self.bounds = Some((lo, hi));
        self
    }

    pub fn with_initial(mut self, value: impl Into<String>) -> Self {
        self.initial = Some(value.into());
        self
    }

    pub fn hidden_until_toggled(mut self) -> Self {
        self.starts_hidden = true;
        self
    }
}
