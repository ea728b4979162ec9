//! The form engine: field schemas, validation, rendering, the pharmacy code
//! list, the pharmacist roster, and the orchestrator tying them to the draft
//! store and the notifier.

pub mod draft;
pub mod list;
pub mod orchestrator;
pub mod pharmacies;
pub mod render;
pub mod roster;
pub mod schema;
pub mod validator;

pub use list::ItemList;
pub use orchestrator::{
    CommandOutcome, FocusTarget, FormCommand, FormOrchestrator, FormPhase, SubmissionEvent,
    SubmissionKind, SubmissionOutcome,
};
pub use roster::{PharmacistRecord, RosterField, RosterManager};
pub use schema::{BusinessTypeId, FieldDescriptor, FieldSet, InputKind};
pub use validator::FieldCheck;
