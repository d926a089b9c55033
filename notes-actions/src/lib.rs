//! Contextual action sheet for a note.
//!
//! [`NoteActionSheet`] turns a note's flags and the installed extensions into
//! ordered sections of actions and runs the one the user picks through the
//! note mutator.

pub mod collaborators;
pub mod error;
pub mod sheet;
pub mod types;

pub use collaborators::{AlertPresenter, ExtensionSource, NoteMutator};
pub use error::{ActionError, ActionResult};
pub use sheet::{build_sections, common_actions, NoteActionSheet, COMMON_SECTION, HISTORY_SECTION};
pub use types::{
    ActionOutcome, ActionSection, ExtensionAction, ExtensionActions, Note, NoteActionKind,
    NoteChange, NoteFlags, SheetAction,
};
