//! The multi-step form wizard: a control tree mirroring the rendered form,
//! section validation, gated navigation, and submission orchestration.

pub mod dispatch;
pub mod effects;
pub mod navigator;
pub mod orchestrator;
pub mod page;
pub mod range;
pub mod tree;
pub mod validator;

pub use effects::{PageEffects, SilentEffects};
pub use navigator::{NavOutcome, StepNavigator};
pub use page::{Page, PageUrl, WizardForm};
pub use tree::{ChipState, Control, ControlId, ControlKind, ControlTree};
pub use validator::{FieldCheck, ValidationOutcome};
