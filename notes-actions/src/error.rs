use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Failed to update note {uuid}: {reason}")]
    Mutation { uuid: String, reason: String },

    #[error("Extension '{extension_id}' failed: {reason}")]
    Extension {
        extension_id: String,
        reason: String,
    },

    #[error("Action '{0}' is not available for this note")]
    Unavailable(String),
}

pub type ActionResult<T> = Result<T, ActionError>;
