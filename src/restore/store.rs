//! Server-side stash of bounced drafts, keyed by session. Reads are
//! destructive: a draft is handed out exactly once, so stale answers can
//! never resurface on a later visit.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::IntakeError;
use crate::restore::payload::RestorePayload;
use crate::utils::drafts_dir;

/// Identifies one visitor session across the submit/redirect/restore cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey(Uuid);

impl SessionKey {
    pub fn new() -> Self {
        SessionKey(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        SessionKey(uuid)
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        SessionKey::new()
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionKey {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(SessionKey(Uuid::parse_str(raw)?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDraft {
    created_at: DateTime<Utc>,
    payload: RestorePayload,
}

/// Where bounced drafts wait for their single pickup.
pub trait SessionStore {
    fn put(&self, key: &SessionKey, payload: &RestorePayload) -> Result<(), IntakeError>;

    /// One-time read: returns the draft and removes it in the same motion.
    fn take(&self, key: &SessionKey) -> Result<Option<RestorePayload>, IntakeError>;

    /// Non-destructive read for inspection tooling.
    fn peek(&self, key: &SessionKey) -> Result<Option<RestorePayload>, IntakeError>;

    fn clear(&self, key: &SessionKey) -> Result<(), IntakeError>;
}

/// Process-local store for tests and in-process round trips.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<SessionKey, StoredDraft>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionKey, StoredDraft>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn put(&self, key: &SessionKey, payload: &RestorePayload) -> Result<(), IntakeError> {
        self.lock().insert(
            *key,
            StoredDraft {
                created_at: Utc::now(),
                payload: payload.clone(),
            },
        );
        Ok(())
    }

    fn take(&self, key: &SessionKey) -> Result<Option<RestorePayload>, IntakeError> {
        Ok(self.lock().remove(key).map(|draft| draft.payload))
    }

    fn peek(&self, key: &SessionKey) -> Result<Option<RestorePayload>, IntakeError> {
        Ok(self.lock().get(key).map(|draft| draft.payload.clone()))
    }

    fn clear(&self, key: &SessionKey) -> Result<(), IntakeError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Draft files on disk, one JSON file per session.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new() -> Self {
        FileStore { root: drafts_dir() }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    fn file_for(&self, key: &SessionKey) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Removes drafts older than `max_age`; unreadable files count as stale.
    /// Returns how many were dropped.
    pub fn prune(&self, max_age: Duration) -> Result<usize, IntakeError> {
        if !self.root.exists() {
            return Ok(0);
        }
        let cutoff = Utc::now() - max_age;
        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let stale = match fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str::<StoredDraft>(&data) {
                    Ok(draft) => draft.created_at < cutoff,
                    Err(_) => true,
                },
                Err(_) => true,
            };
            if stale {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl Default for FileStore {
    fn default() -> Self {
        FileStore::new()
    }
}

impl SessionStore for FileStore {
    fn put(&self, key: &SessionKey, payload: &RestorePayload) -> Result<(), IntakeError> {
        let draft = StoredDraft {
            created_at: Utc::now(),
            payload: payload.clone(),
        };
        let json = serde_json::to_string_pretty(&draft)?;
        let path = self.file_for(key);
        let tmp = tmp_path(&path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn take(&self, key: &SessionKey) -> Result<Option<RestorePayload>, IntakeError> {
        let path = self.file_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        // Gone before it is parsed: even a corrupt draft is served only once.
        fs::remove_file(&path)?;
        let draft: StoredDraft = serde_json::from_str(&data)?;
        Ok(Some(draft.payload))
    }

    fn peek(&self, key: &SessionKey) -> Result<Option<RestorePayload>, IntakeError> {
        let path = self.file_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        let draft: StoredDraft = serde_json::from_str(&data)?;
        Ok(Some(draft.payload))
    }

    fn clear(&self, key: &SessionKey) -> Result<(), IntakeError> {
        let path = self.file_for(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
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
    use crate::restore::payload::ServerError;
    use tempfile::TempDir;

    fn sample_payload() -> RestorePayload {
        RestorePayload::default()
            .with_value("FullName", "Ada Lovelace")
            .with_error(ServerError::for_field(
                "Email",
                "Valid email address is required.",
            ))
    }

    #[test]
    fn memory_store_hands_a_draft_out_once() {
        let store = MemoryStore::new();
        let key = SessionKey::new();
        store.put(&key, &sample_payload()).expect("put");
        assert_eq!(store.take(&key).expect("take"), Some(sample_payload()));
        assert_eq!(store.take(&key).expect("second take"), None);
    }

    #[test]
    fn file_store_round_trips_and_deletes_on_take() {
        let temp = TempDir::new().expect("temp dir");
        let store = FileStore::with_root(temp.path());
        let key = SessionKey::new();
        store.put(&key, &sample_payload()).expect("put");

        let taken = store.take(&key).expect("take");
        assert_eq!(taken, Some(sample_payload()));
        assert_eq!(store.take(&key).expect("second take"), None);
        assert!(!temp.path().join(format!("{key}.json")).exists());
    }

    #[test]
    fn peek_does_not_consume() {
        let temp = TempDir::new().expect("temp dir");
        let store = FileStore::with_root(temp.path());
        let key = SessionKey::new();
        store.put(&key, &sample_payload()).expect("put");
        assert!(store.peek(&key).expect("peek").is_some());
        assert!(store.take(&key).expect("take").is_some());
    }

    #[test]
    fn sessions_do_not_overlap() {
        let store = MemoryStore::new();
        let first = SessionKey::new();
        let second = SessionKey::new();
        store.put(&first, &sample_payload()).expect("put");
        assert_eq!(store.take(&second).expect("take"), None);
        assert!(store.take(&first).expect("take").is_some());
    }

    #[test]
    fn prune_drops_old_and_corrupt_drafts() {
        let temp = TempDir::new().expect("temp dir");
        let store = FileStore::with_root(temp.path());
        let fresh = SessionKey::new();
        store.put(&fresh, &sample_payload()).expect("put");
        std::fs::write(temp.path().join("broken.json"), "not json").expect("write");

        let removed = store.prune(Duration::hours(1)).expect("prune");
        assert_eq!(removed, 1);
        assert!(store.peek(&fresh).expect("peek").is_some());
    }

    #[test]
    fn session_key_parses_its_display_form() {
        let key = SessionKey::new();
        let text = key.to_string();
        assert_eq!(text.parse::<SessionKey>().expect("parse"), key);
    }
}
