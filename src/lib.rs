#![doc(test(attr(deny(warnings))))]

//! Intake Core drives multi-step lead intake forms end to end: the wizard
//! state machine a visitor steps through, the server-side rule chains posted
//! drafts are checked against, and the stash-and-restore handshake that
//! brings a bounced draft back onto the page.

pub mod cli;
pub mod config;
pub mod errors;
pub mod restore;
pub mod schema;
pub mod submit;
pub mod utils;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Intake Core tracing initialized.");
    });
}
