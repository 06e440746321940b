//! Static form schemas: field and section descriptors, declared constraints,
//! and the catalog of intake forms built from them.

pub mod catalog;
mod field;
mod form;
mod value;

pub use field::{Constraint, FieldKind, FieldSpec};
pub use form::{FormSpec, MergeSpec, RangeSpec, ReadinessSpec, SectionSpec, ToggleSpec};
pub use value::FieldValue;
