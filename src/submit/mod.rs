//! Server side of the intake flow: the validation rule sets, accepted lead
//! records, and the gateway that turns a submission into either a stored lead
//! or a stashed draft for the restore protocol.

pub mod gateway;
pub mod record;
pub mod rules;

pub use gateway::{SubmissionGateway, SubmissionOutcome, SINK_FAILURE_MESSAGE, SUCCESS_MESSAGE};
pub use record::{JsonFileSink, LeadNotifier, LeadRecord, LeadSink, LogNotifier, MemorySink};
pub use rules::{evaluate, normalize_price_range, rules_for, FieldRule, RuleCheck};
