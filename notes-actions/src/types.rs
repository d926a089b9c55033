use serde::{Deserialize, Serialize};

/// Note state the action sheet branches on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFlags {
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub trashed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub uuid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub flags: NoteFlags,
}

impl Note {
    pub fn new(uuid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            title: title.into(),
            flags: NoteFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: NoteFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// A single flag change handed to the note mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "value")]
pub enum NoteChange {
    Pinned(bool),
    Archived(bool),
    Locked(bool),
    Protected(bool),
    Trashed(bool),
}

impl NoteChange {
    pub fn apply(self, flags: &mut NoteFlags) {
        match self {
            NoteChange::Pinned(v) => flags.pinned = v,
            NoteChange::Archived(v) => flags.archived = v,
            NoteChange::Locked(v) => flags.locked = v,
            NoteChange::Protected(v) => flags.protected = v,
            NoteChange::Trashed(v) => flags.trashed = v,
        }
    }
}

/// Built-in actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteActionKind {
    History,
    Pin,
    Unpin,
    Archive,
    Unarchive,
    Lock,
    Unlock,
    Protect,
    Unprotect,
    Share,
    MoveToTrash,
    Restore,
    DeletePermanently,
}

impl NoteActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            NoteActionKind::History => "Note history",
            NoteActionKind::Pin => "Pin",
            NoteActionKind::Unpin => "Unpin",
            NoteActionKind::Archive => "Archive",
            NoteActionKind::Unarchive => "Unarchive",
            NoteActionKind::Lock => "Lock",
            NoteActionKind::Unlock => "Unlock",
            NoteActionKind::Protect => "Protect",
            NoteActionKind::Unprotect => "Unprotect",
            NoteActionKind::Share => "Share",
            NoteActionKind::MoveToTrash => "Move to trash",
            NoteActionKind::Restore => "Restore",
            NoteActionKind::DeletePermanently => "Delete permanently",
        }
    }
}

/// An action contributed by an installed extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionAction {
    pub id: String,
    pub label: String,
}

/// Actions one extension offers for the current note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionActions {
    pub extension_id: String,
    pub name: String,
    #[serde(default)]
    pub actions: Vec<ExtensionAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetAction {
    Builtin(NoteActionKind),
    Extension {
        extension_id: String,
        action: ExtensionAction,
    },
}

impl SheetAction {
    pub fn label(&self) -> &str {
        match self {
            SheetAction::Builtin(kind) => kind.label(),
            SheetAction::Extension { action, .. } => &action.label,
        }
    }
}

/// A titled group of actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSection {
    pub key: String,
    pub title: String,
    pub actions: Vec<SheetAction>,
}

impl ActionSection {
    pub fn labels(&self) -> Vec<&str> {
        self.actions.iter().map(SheetAction::label).collect()
    }
}

/// What running an action did, for the host to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The note was changed and this is its new state
    Changed(Note),
    Deleted,
    /// The action was refused and the user was told why
    Blocked,
    /// The host should present its history view
    ShowHistory,
    /// The host should present its share sheet
    Share,
    /// An extension ran the action
    ExtensionRan,
}
