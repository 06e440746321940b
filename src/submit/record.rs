//! Accepted leads and the places they go.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::IntakeError;
use crate::schema::{FieldKind, FieldValue, FormSpec};
use crate::utils;

/// One accepted submission, exactly as it passed validation.
///
/// The value map is kept generic rather than typed per form: legacy fields
/// that no current page renders still ride along unharmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: Uuid,
    pub form_id: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_ip: Option<String>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl LeadRecord {
    pub fn new(form_id: impl Into<String>, fields: BTreeMap<String, FieldValue>) -> Self {
        LeadRecord {
            id: Uuid::new_v4(),
            form_id: form_id.into(),
            submitted_at: Utc::now(),
            submitter_ip: None,
            fields,
        }
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.submitter_ip = Some(ip.into());
        self
    }

    /// `Label: value` lines in the order the form declares its fields, with
    /// any undeclared extras appended at the end. Blank answers are omitted.
    pub fn summary_lines(&self, spec: &FormSpec) -> Vec<String> {
        let mut lines = Vec::new();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for section in &spec.sections {
            for field in &section.fields {
                if matches!(field.kind, FieldKind::Submit) {
                    continue;
                }
                if let Some(value) = self.fields.get(&field.name) {
                    seen.insert(field.name.as_str());
                    if !value.is_blank() {
                        lines.push(format!("{}: {}", field.label, value.to_display()));
                    }
                }
            }
        }
        for (name, value) in &self.fields {
            if !seen.contains(name.as_str()) && !value.is_blank() {
                lines.push(format!("{name}: {}", value.to_display()));
            }
        }
        lines
    }
}

/// Where accepted leads are persisted.
pub trait LeadSink {
    fn save(&self, record: &LeadRecord) -> Result<(), IntakeError>;
}

/// In-memory sink for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<LeadRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn saved(&self) -> Vec<LeadRecord> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LeadSink for MemorySink {
    fn save(&self, record: &LeadRecord) -> Result<(), IntakeError> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

/// Sink that writes each lead as `<id>.json` under the leads directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    root: PathBuf,
}

impl JsonFileSink {
    pub fn new() -> Self {
        JsonFileSink {
            root: utils::leads_dir(),
        }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        JsonFileSink { root: root.into() }
    }

    fn file_for(&self, id: &Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

impl Default for JsonFileSink {
    fn default() -> Self {
        JsonFileSink::new()
    }
}

impl LeadSink for JsonFileSink {
    fn save(&self, record: &LeadRecord) -> Result<(), IntakeError> {
        let path = self.file_for(&record.id);
        let json = serde_json::to_string_pretty(record)?;
        let tmp = tmp_path(&path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        debug!(lead = %record.id, path = %path.display(), "lead written");
        Ok(())
    }
}

/// Downstream notification once a lead is stored. Failures here must never
/// bounce the submission, so the trait is infallible and implementations
/// swallow their own errors.
pub trait LeadNotifier {
    fn lead_received(&self, record: &LeadRecord, spec: &FormSpec);
}

/// Notifier that writes the would-be notification to the log.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl LeadNotifier for LogNotifier {
    fn lead_received(&self, record: &LeadRecord, spec: &FormSpec) {
        info!(form = %record.form_id, lead = %record.id, "new lead recorded");
        for line in record.summary_lines(spec) {
            debug!("{line}");
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.tmp"),
        None => "tmp".to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), IntakeError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog;
    use tempfile::TempDir;

    fn sample_record() -> LeadRecord {
        let mut fields = BTreeMap::new();
        fields.insert("FullName".to_string(), FieldValue::text("Dana Builder"));
        fields.insert("Email".to_string(), FieldValue::text("dana@builder.test"));
        fields.insert(
            "SourceFinancing".to_string(),
            FieldValue::multi(["Cash on Hand", "Hard Money"]),
        );
        fields.insert("Website".to_string(), FieldValue::text(""));
        fields.insert("Mins".to_string(), FieldValue::text("42"));
        LeadRecord::new("cash-buyer-form", fields)
    }

    #[test]
    fn summary_follows_form_order_and_appends_extras() {
        let record = sample_record();
        let lines = record.summary_lines(&catalog::cash_buyer());
        assert_eq!(lines[0], "Full Name: Dana Builder");
        assert!(lines.contains(&"Source of Financing: Cash on Hand, Hard Money".to_string()));
        // Blank answers are dropped, unknown legacy columns survive at the end.
        assert!(!lines.iter().any(|line| line.starts_with("Website")));
        assert_eq!(lines.last().map(String::as_str), Some("Mins: 42"));
    }

    #[test]
    fn memory_sink_collects_records() {
        let sink = MemorySink::new();
        sink.save(&sample_record()).expect("save");
        sink.save(&sample_record()).expect("save");
        assert_eq!(sink.saved().len(), 2);
    }

    #[test]
    fn file_sink_round_trips_a_record() {
        let dir = TempDir::new().expect("temp dir");
        let sink = JsonFileSink::with_root(dir.path());
        let record = sample_record();
        sink.save(&record).expect("save");

        let raw = fs::read_to_string(dir.path().join(format!("{}.json", record.id)))
            .expect("read lead file");
        let loaded: LeadRecord = serde_json::from_str(&raw).expect("parse lead file");
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.form_id, "cash-buyer-form");
        assert_eq!(
            loaded.fields.get("FullName").and_then(FieldValue::as_text),
            Some("Dana Builder")
        );
    }
}
