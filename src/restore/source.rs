//! Where a page load gets its stashed draft from: over HTTP against the
//! restore endpoint, or straight out of a local session store when everything
//! runs in one process.

use std::time::Duration;

use crate::errors::IntakeError;
use crate::restore::payload::RestorePayload;
use crate::restore::store::{SessionKey, SessionStore};

pub trait RestoreSource {
    fn fetch(&self) -> Result<RestorePayload, IntakeError>;
}

/// Fetches the draft from a restore endpoint. The request carries the
/// session cookie and a hard timeout; the caller decides what a failure
/// means (in practice: nothing, the page just starts blank).
pub struct HttpRestoreSource {
    url: String,
    timeout: Duration,
    cookie: Option<String>,
}

impl HttpRestoreSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        HttpRestoreSource {
            url: url.into(),
            timeout,
            cookie: None,
        }
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }
}

impl RestoreSource for HttpRestoreSource {
    fn fetch(&self) -> Result<RestorePayload, IntakeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let mut request = client.get(&self.url);
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie.clone());
        }
        let payload = request.send()?.error_for_status()?.json::<RestorePayload>()?;
        Ok(payload)
    }
}

/// Pulls the draft straight from a session store, consuming it. This is the
/// same one-time semantics the HTTP endpoint provides, minus the network.
pub struct StoreRestoreSource<'a> {
    store: &'a dyn SessionStore,
    key: SessionKey,
}

impl<'a> StoreRestoreSource<'a> {
    pub fn new(store: &'a dyn SessionStore, key: SessionKey) -> Self {
        StoreRestoreSource { store, key }
    }
}

impl RestoreSource for StoreRestoreSource<'_> {
    fn fetch(&self) -> Result<RestorePayload, IntakeError> {
        Ok(self.store.take(&self.key)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restore::store::MemoryStore;

    #[test]
    fn store_source_consumes_the_draft() {
        let store = MemoryStore::new();
        let key = SessionKey::new();
        store
            .put(&key, &RestorePayload::default().with_value("FullName", "Ada"))
            .expect("put");

        let source = StoreRestoreSource::new(&store, key);
        let first = source.fetch().expect("fetch");
        assert!(!first.is_empty());
        let second = source.fetch().expect("fetch again");
        assert!(second.is_empty());
    }
}
