//! The action sheet view-model.
//!
//! Sections are rebuilt from the note's flags every time they are read.
//! Extension sections are cached and refreshed on mount and after every
//! action, since running an action can change what extensions offer.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::collaborators::{AlertPresenter, ExtensionSource, NoteMutator};
use crate::error::{ActionError, ActionResult};
use crate::types::{
    ActionOutcome, ActionSection, ExtensionActions, Note, NoteActionKind, NoteChange, SheetAction,
};

pub const HISTORY_SECTION: &str = "history";
pub const COMMON_SECTION: &str = "common";

const LOCKED_TITLE: &str = "Note Locked";
const LOCKED_ARCHIVE_TEXT: &str = "This note is locked. Unlock it before archiving.";

/// Built-in actions for a note with `note`'s flags.
pub fn common_actions(note: &Note) -> Vec<NoteActionKind> {
    let flags = &note.flags;
    if flags.protected {
        return vec![NoteActionKind::Unprotect];
    }
    if flags.trashed {
        return vec![NoteActionKind::Restore, NoteActionKind::DeletePermanently];
    }

    vec![
        if flags.pinned {
            NoteActionKind::Unpin
        } else {
            NoteActionKind::Pin
        },
        if flags.archived {
            NoteActionKind::Unarchive
        } else {
            NoteActionKind::Archive
        },
        if flags.locked {
            NoteActionKind::Unlock
        } else {
            NoteActionKind::Lock
        },
        NoteActionKind::Protect,
        NoteActionKind::Share,
        NoteActionKind::MoveToTrash,
    ]
}

/// Full section list: history, common, then one section per extension
/// ordered by extension identifier.
pub fn build_sections(note: &Note, extensions: &[ExtensionActions]) -> Vec<ActionSection> {
    let common = ActionSection {
        key: COMMON_SECTION.to_string(),
        title: "Actions".to_string(),
        actions: common_actions(note)
            .into_iter()
            .map(SheetAction::Builtin)
            .collect(),
    };

    // Protected notes expose nothing but the way out
    if note.flags.protected {
        return vec![common];
    }

    let mut sections = vec![
        ActionSection {
            key: HISTORY_SECTION.to_string(),
            title: "History".to_string(),
            actions: vec![SheetAction::Builtin(NoteActionKind::History)],
        },
        common,
    ];

    let mut extensions: Vec<&ExtensionActions> = extensions
        .iter()
        .filter(|ext| !ext.actions.is_empty())
        .collect();
    extensions.sort_by(|a, b| a.extension_id.cmp(&b.extension_id));

    sections.extend(extensions.into_iter().map(|ext| ActionSection {
        key: ext.extension_id.clone(),
        title: ext.name.clone(),
        actions: ext
            .actions
            .iter()
            .map(|action| SheetAction::Extension {
                extension_id: ext.extension_id.clone(),
                action: action.clone(),
            })
            .collect(),
    }));
    sections
}

pub struct NoteActionSheet {
    note: Note,
    mutator: Arc<dyn NoteMutator>,
    extensions: Arc<dyn ExtensionSource>,
    alerts: Arc<dyn AlertPresenter>,
    extension_actions: Vec<ExtensionActions>,
}

impl NoteActionSheet {
    pub fn new(
        note: Note,
        mutator: Arc<dyn NoteMutator>,
        extensions: Arc<dyn ExtensionSource>,
        alerts: Arc<dyn AlertPresenter>,
    ) -> Self {
        Self {
            note,
            mutator,
            extensions,
            alerts,
            extension_actions: Vec::new(),
        }
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    /// Load extension sections for the first render.
    pub async fn mount(&mut self) {
        if let Err(e) = self.reload_extensions().await {
            warn!(note = %self.note.uuid, error = %e, "Extension actions unavailable");
        }
    }

    /// Fetch extension actions again. On failure the previous sections are
    /// dropped rather than shown stale.
    pub async fn reload_extensions(&mut self) -> ActionResult<()> {
        match self.extensions.load_actions(&self.note).await {
            Ok(actions) => {
                debug!(note = %self.note.uuid, extensions = actions.len(), "Loaded extension actions");
                self.extension_actions = actions;
                Ok(())
            }
            Err(e) => {
                self.extension_actions.clear();
                Err(e)
            }
        }
    }

    pub fn sections(&self) -> Vec<ActionSection> {
        build_sections(&self.note, &self.extension_actions)
    }

    fn is_offered(&self, action: &SheetAction) -> bool {
        self.sections()
            .iter()
            .any(|section| section.actions.contains(action))
    }

    /// Run an action currently offered by the sheet, then refresh extensions.
    pub async fn run(&mut self, action: &SheetAction) -> ActionResult<ActionOutcome> {
        if !self.is_offered(action) {
            return Err(ActionError::Unavailable(action.label().to_string()));
        }

        let outcome = match action {
            SheetAction::Builtin(kind) => self.run_builtin(*kind).await?,
            SheetAction::Extension {
                extension_id,
                action,
            } => {
                self.extensions
                    .run_action(extension_id, &action.id, &self.note)
                    .await?;
                ActionOutcome::ExtensionRan
            }
        };
        info!(note = %self.note.uuid, action = %action.label(), outcome = ?outcome, "Ran note action");

        if outcome != ActionOutcome::Deleted {
            if let Err(e) = self.reload_extensions().await {
                warn!(note = %self.note.uuid, error = %e, "Failed to reload extension actions");
            }
        }
        Ok(outcome)
    }

    async fn run_builtin(&mut self, kind: NoteActionKind) -> ActionResult<ActionOutcome> {
        let change = match kind {
            NoteActionKind::History => return Ok(ActionOutcome::ShowHistory),
            NoteActionKind::Share => return Ok(ActionOutcome::Share),
            NoteActionKind::DeletePermanently => {
                self.mutator.delete_item(&self.note).await?;
                return Ok(ActionOutcome::Deleted);
            }
            NoteActionKind::Archive if self.note.flags.locked => {
                self.alerts.alert(LOCKED_TITLE, LOCKED_ARCHIVE_TEXT);
                return Ok(ActionOutcome::Blocked);
            }
            NoteActionKind::Pin => NoteChange::Pinned(true),
            NoteActionKind::Unpin => NoteChange::Pinned(false),
            NoteActionKind::Archive => NoteChange::Archived(true),
            NoteActionKind::Unarchive => NoteChange::Archived(false),
            NoteActionKind::Lock => NoteChange::Locked(true),
            NoteActionKind::Unlock => NoteChange::Locked(false),
            NoteActionKind::Protect => NoteChange::Protected(true),
            NoteActionKind::Unprotect => NoteChange::Protected(false),
            NoteActionKind::MoveToTrash => NoteChange::Trashed(true),
            NoteActionKind::Restore => NoteChange::Trashed(false),
        };

        let updated = self.mutator.change_item(&self.note, change).await?;
        self.note = updated.clone();
        Ok(ActionOutcome::Changed(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExtensionAction, NoteFlags};

    fn note(flags: NoteFlags) -> Note {
        Note::new("note-1", "Groceries").with_flags(flags)
    }

    fn labels(note: &Note) -> Vec<&'static str> {
        common_actions(note).iter().map(|k| k.label()).collect()
    }

    #[test]
    fn test_default_common_actions() {
        assert_eq!(
            labels(&note(NoteFlags::default())),
            vec!["Pin", "Archive", "Lock", "Protect", "Share", "Move to trash"]
        );
    }

    #[test]
    fn test_toggles_follow_flags() {
        let flags = NoteFlags {
            pinned: true,
            archived: true,
            locked: true,
            ..Default::default()
        };
        assert_eq!(
            labels(&note(flags)),
            vec!["Unpin", "Unarchive", "Unlock", "Protect", "Share", "Move to trash"]
        );
    }

    #[test]
    fn test_trashed_note_only_restores_or_deletes() {
        let flags = NoteFlags {
            trashed: true,
            pinned: true,
            ..Default::default()
        };
        assert_eq!(labels(&note(flags)), vec!["Restore", "Delete permanently"]);
    }

    #[test]
    fn test_protected_note_only_unprotects() {
        let flags = NoteFlags {
            protected: true,
            trashed: true,
            ..Default::default()
        };
        let sections = build_sections(&note(flags), &[]);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].key, COMMON_SECTION);
        assert_eq!(sections[0].labels(), vec!["Unprotect"]);
    }

    #[test]
    fn test_extension_sections_sorted_by_identifier() {
        let ext = |id: &str| ExtensionActions {
            extension_id: id.to_string(),
            name: id.to_uppercase(),
            actions: vec![ExtensionAction {
                id: "run".to_string(),
                label: format!("Run {id}"),
            }],
        };
        let empty = ExtensionActions {
            extension_id: "org.a.empty".to_string(),
            name: "Empty".to_string(),
            actions: vec![],
        };

        let sections = build_sections(
            &note(NoteFlags::default()),
            &[ext("org.z.last"), empty, ext("org.b.first")],
        );
        let keys: Vec<&str> = sections.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec![HISTORY_SECTION, COMMON_SECTION, "org.b.first", "org.z.last"]);
    }
}
