use serde::{Deserialize, Deserializer, Serialize};

/// A submitted or restored field value.
///
/// Wire payloads are loose about types: numbers arrive as JSON numbers or
/// strings, checkbox groups as arrays or a lone scalar, booleans as flags.
/// Deserialization folds all of those shapes into three cases so the rest of
/// the engine never has to care.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A single scalar value (text inputs, selects, radio picks, numbers).
    Text(String),
    /// Multiple selections, e.g. a checkbox group.
    Multi(Vec<String>),
    /// An explicit boolean flag.
    Flag(bool),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn multi<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Multi(items.into_iter().map(Into::into).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::Multi(items) => Some(items),
            _ => None,
        }
    }

    /// True when the value carries no usable content. Flags are never blank:
    /// an explicit `false` is still an answer.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.trim().is_empty(),
            FieldValue::Multi(items) => items.is_empty(),
            FieldValue::Flag(_) => false,
        }
    }

    /// Human-readable rendering used by summaries and notifications.
    pub fn to_display(&self) -> String {
        match self {
            FieldValue::Text(value) => value.clone(),
            FieldValue::Multi(items) => items.join(", "),
            FieldValue::Flag(flag) => flag.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::Multi(items)
    }
}

/// Wire shape accepted for a single value. Kept private; [`FieldValue`] is the
/// normalized form.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Flag(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<RawValue>),
}

fn stringify(raw: &RawValue) -> Option<String> {
    match raw {
        RawValue::Flag(flag) => Some(flag.to_string()),
        RawValue::Int(n) => Some(n.to_string()),
        RawValue::Float(f) => Some(f.to_string()),
        RawValue::Text(text) => Some(text.clone()),
        // Nested arrays have no meaning for form fields; drop them.
        RawValue::List(_) => None,
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawValue::deserialize(deserializer)?;
        match raw {
            RawValue::Flag(flag) => Ok(FieldValue::Flag(flag)),
            RawValue::Int(n) => Ok(FieldValue::Text(n.to_string())),
            RawValue::Float(f) => Ok(FieldValue::Text(f.to_string())),
            RawValue::Text(text) => Ok(FieldValue::Text(text)),
            RawValue::List(items) => {
                let items = items.iter().filter_map(stringify).collect();
                Ok(FieldValue::Multi(items))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_fold_into_text() {
        let parsed: FieldValue = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(parsed, FieldValue::text("hello"));

        let parsed: FieldValue = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, FieldValue::text("42"));

        let parsed: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(parsed, FieldValue::Flag(true));
    }

    #[test]
    fn arrays_fold_into_multi() {
        let parsed: FieldValue = serde_json::from_str(r#"["Cash on Hand", 7]"#).unwrap();
        assert_eq!(parsed, FieldValue::multi(["Cash on Hand", "7"]));
    }

    #[test]
    fn serializes_without_tags() {
        let json = serde_json::to_string(&FieldValue::multi(["a", "b"])).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        let json = serde_json::to_string(&FieldValue::text("x")).unwrap();
        assert_eq!(json, r#""x""#);
    }

    #[test]
    fn blank_detection() {
        assert!(FieldValue::text("  ").is_blank());
        assert!(FieldValue::Multi(vec![]).is_blank());
        assert!(!FieldValue::Flag(false).is_blank());
    }
}
