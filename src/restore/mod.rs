//! One-time restore protocol: a rejected submission's values and errors are
//! stashed server-side, fetched exactly once on the next page load, and
//! replayed into the wizard so nothing the visitor typed is lost.

pub mod page_load;
pub mod payload;
pub mod source;
pub mod store;

pub use page_load::{handle_page_load, RestoreReport};
pub use payload::{RestorePayload, ServerError};
pub use source::{HttpRestoreSource, RestoreSource, StoreRestoreSource};
pub use store::{FileStore, MemoryStore, SessionKey, SessionStore};
