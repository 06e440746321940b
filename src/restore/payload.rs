//! Wire format of a stashed draft: the submitted values plus the validation
//! errors that bounced them. Tolerant on the way in (historic producers
//! disagreed on field names and shapes), canonical on the way out.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::schema::FieldValue;

/// One validation error as reported by the rule engine. `field` is `None`
/// for errors that are not about any particular field.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError {
    pub field: Option<String>,
    pub message: String,
}

impl ServerError {
    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServerError {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        ServerError {
            field: None,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct WireError<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    param: Option<&'a str>,
    msg: &'a str,
}

impl Serialize for ServerError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        WireError {
            param: self.field.as_deref(),
            msg: &self.message,
        }
        .serialize(serializer)
    }
}

/// Accepted error shapes: a bare message string, or an entry keyed any of
/// the ways validators have keyed them over time.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawError {
    Message(String),
    Entry {
        #[serde(default)]
        param: Option<String>,
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        msg: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

impl<'de> Deserialize<'de> for ServerError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawError::deserialize(deserializer)?;
        Ok(match raw {
            RawError::Message(message) => ServerError {
                field: None,
                message,
            },
            RawError::Entry {
                param,
                path,
                msg,
                message,
            } => ServerError {
                field: param.or(path).filter(|f| !f.is_empty()),
                message: msg.or(message).unwrap_or_default(),
            },
        })
    }
}

/// The stashed draft a page load may pick up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestorePayload {
    #[serde(
        default,
        deserialize_with = "deserialize_values",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub values: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ServerError>,
}

impl RestorePayload {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.errors.is_empty()
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn with_error(mut self, error: ServerError) -> Self {
        self.errors.push(error);
        self
    }
}

/// Null entries mean "nothing stored for this field" and are dropped rather
/// than failing the whole payload.
fn deserialize_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, FieldValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, Option<FieldValue>> = BTreeMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_draft() {
        let json = r#"{
            "values": {
                "FullName": "Ada Lovelace",
                "YearsInBusiness": 6,
                "SourceFinancing": ["Hard Money", "Other"],
                "Skipped": null
            },
            "errors": [
                {"param": "Email", "msg": "Valid email address is required."},
                {"msg": "Error saving data to database"}
            ]
        }"#;
        let payload: RestorePayload = serde_json::from_str(json).unwrap();
        assert_eq!(
            payload.values.get("FullName"),
            Some(&FieldValue::text("Ada Lovelace"))
        );
        assert_eq!(
            payload.values.get("YearsInBusiness"),
            Some(&FieldValue::text("6"))
        );
        assert!(!payload.values.contains_key("Skipped"));
        assert_eq!(payload.errors.len(), 2);
        assert_eq!(payload.errors[0].field.as_deref(), Some("Email"));
        assert_eq!(payload.errors[1].field, None);
    }

    #[test]
    fn accepts_bare_string_errors() {
        let json = r#"{"errors": ["first problem", "second problem"]}"#;
        let payload: RestorePayload = serde_json::from_str(json).unwrap();
        assert_eq!(
            payload.errors,
            vec![
                ServerError::general("first problem"),
                ServerError::general("second problem")
            ]
        );
    }

    #[test]
    fn accepts_alternate_error_keys() {
        let json = r#"{"errors": [{"path": "CellPhone", "message": "Valid phone number is required."}]}"#;
        let payload: RestorePayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.errors[0].field.as_deref(), Some("CellPhone"));
        assert_eq!(payload.errors[0].message, "Valid phone number is required.");
    }

    #[test]
    fn serializes_in_the_canonical_shape() {
        let payload = RestorePayload::default()
            .with_value("FullName", "Ada")
            .with_error(ServerError::for_field("Email", "Valid email address is required."))
            .with_error(ServerError::general("Something else went wrong."));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["values"]["FullName"], "Ada");
        assert_eq!(json["errors"][0]["param"], "Email");
        assert_eq!(json["errors"][1].get("param"), None);
        assert_eq!(json["errors"][1]["msg"], "Something else went wrong.");
    }

    #[test]
    fn empty_round_trip() {
        let payload: RestorePayload = serde_json::from_str("{}").unwrap();
        assert!(payload.is_empty());
        assert_eq!(serde_json::to_string(&payload).unwrap(), "{}");
    }
}
