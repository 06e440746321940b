//! The submission gateway: validates a posted value map, persists the lead,
//! and produces the redirect the page is sent back with. Rejections stash the
//! draft under the caller's session key so the next page load can restore it.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::IntakeError;
use crate::restore::{RestorePayload, ServerError, SessionKey, SessionStore};
use crate::schema::{FieldValue, FormSpec};
use crate::submit::record::{LeadNotifier, LeadRecord, LeadSink};
use crate::submit::rules;
use crate::wizard::PageUrl;

/// Message carried on the success redirect.
pub const SUCCESS_MESSAGE: &str = "Form submitted successfully!";
/// Message reported when the lead sink fails after validation passed.
pub const SINK_FAILURE_MESSAGE: &str = "Error saving data to database";

/// What the caller redirects the submitter to.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Accepted { record_id: Uuid, redirect: PageUrl },
    Rejected { redirect: PageUrl },
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted { .. })
    }

    pub fn redirect(&self) -> &PageUrl {
        match self {
            SubmissionOutcome::Accepted { redirect, .. } => redirect,
            SubmissionOutcome::Rejected { redirect } => redirect,
        }
    }
}

pub struct SubmissionGateway<'a> {
    store: &'a dyn SessionStore,
    sink: &'a dyn LeadSink,
    notifier: &'a dyn LeadNotifier,
}

impl<'a> SubmissionGateway<'a> {
    pub fn new(
        store: &'a dyn SessionStore,
        sink: &'a dyn LeadSink,
        notifier: &'a dyn LeadNotifier,
    ) -> Self {
        SubmissionGateway {
            store,
            sink,
            notifier,
        }
    }

    /// Handles one posted submission.
    ///
    /// The redirect lands on `referrer` when one was sent, otherwise on the
    /// form's canonical path. A success clears any stashed draft; a rejection
    /// replaces it, and also carries the messages in the `errors` query
    /// parameter for pages that never fetch the stash.
    pub fn handle(
        &self,
        spec: &FormSpec,
        session: &SessionKey,
        mut values: BTreeMap<String, FieldValue>,
        referrer: Option<&str>,
        submitter_ip: Option<&str>,
    ) -> Result<SubmissionOutcome, IntakeError> {
        let rule_set = rules::rules_for(&spec.id)
            .ok_or_else(|| IntakeError::UnknownForm(spec.id.clone()))?;
        rules::normalize_price_range(&mut values);

        let errors = rules::evaluate(&rule_set, &values);
        if !errors.is_empty() {
            debug!(form = %spec.id, failures = errors.len(), "submission rejected");
            return self.reject(spec, session, values, errors, referrer);
        }

        let mut record = LeadRecord::new(&spec.id, values);
        if let Some(ip) = submitter_ip {
            record = record.with_ip(ip);
        }

        if let Err(error) = self.sink.save(&record) {
            warn!(form = %spec.id, %error, "lead sink failed, bouncing the draft back");
            return self.reject(
                spec,
                session,
                record.fields,
                vec![ServerError::general(SINK_FAILURE_MESSAGE)],
                referrer,
            );
        }

        self.notifier.lead_received(&record, spec);
        self.store.clear(session)?;

        let redirect = PageUrl::new(referrer.unwrap_or(&spec.canonical_path))
            .with_query("success", "true")
            .with_query("message", SUCCESS_MESSAGE);
        debug!(form = %spec.id, lead = %record.id, "submission accepted");
        Ok(SubmissionOutcome::Accepted {
            record_id: record.id,
            redirect,
        })
    }

    fn reject(
        &self,
        spec: &FormSpec,
        session: &SessionKey,
        values: BTreeMap<String, FieldValue>,
        errors: Vec<ServerError>,
        referrer: Option<&str>,
    ) -> Result<SubmissionOutcome, IntakeError> {
        let messages: Vec<&str> = errors.iter().map(|error| error.message.as_str()).collect();
        let encoded = serde_json::to_string(&messages)?;

        let payload = RestorePayload { values, errors };
        self.store.put(session, &payload)?;

        let redirect =
            PageUrl::new(referrer.unwrap_or(&spec.canonical_path)).with_query("errors", encoded);
        Ok(SubmissionOutcome::Rejected { redirect })
    }
}
