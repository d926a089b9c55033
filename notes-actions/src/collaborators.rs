//! Services the action sheet drives but does not own.

use async_trait::async_trait;

use crate::error::ActionResult;
use crate::types::{ExtensionActions, Note, NoteChange};

/// Persists note changes.
#[async_trait]
pub trait NoteMutator: Send + Sync {
    /// Apply `change` and return the updated note.
    async fn change_item(&self, note: &Note, change: NoteChange) -> ActionResult<Note>;

    async fn delete_item(&self, note: &Note) -> ActionResult<()>;
}

/// Installed extensions that add actions to the sheet.
#[async_trait]
pub trait ExtensionSource: Send + Sync {
    /// Actions every extension offers for `note`, in any order.
    async fn load_actions(&self, note: &Note) -> ActionResult<Vec<ExtensionActions>>;

    async fn run_action(&self, extension_id: &str, action_id: &str, note: &Note) -> ActionResult<()>;
}

/// Shows a short message to the user.
pub trait AlertPresenter: Send + Sync {
    fn alert(&self, title: &str, text: &str);
}
