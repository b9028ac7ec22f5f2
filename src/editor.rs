//! Thin controller between user gestures and the registry. It forwards each
//! gesture to exactly one registry call, saves on success and reports an
//! `Outcome` that tells rejected, saved and unsaved changes apart. Display state is rebuilt from
//! the registry on every `view()` call instead of being cached here.

use tracing::{error, warn};

use crate::error::BookSetError;
use crate::models::{Book, BookId};
use crate::registry::BookSetRegistry;
use crate::store::BookSetStore;

/// A user action on the book set editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    ToggleBook(BookId),
    SetBook { book: BookId, included: bool },
    SwitchSet(String),
    AddSet(String),
    RemoveSet(String),
    RenameCurrent(String),
    SelectAll,
    SelectNone,
    SelectInverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Message for the user after a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// What became of a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Changed and saved.
    Applied(Notice),
    /// Changed in memory, but the save failed.
    Unsaved(Notice),
    /// The registry refused it; nothing changed.
    Rejected(Notice),
    /// Valid but had no effect, so nothing was saved.
    Unchanged,
}

impl Outcome {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Outcome::Applied(notice) | Outcome::Unsaved(notice) | Outcome::Rejected(notice) => {
                Some(notice)
            }
            Outcome::Unchanged => None,
        }
    }

    pub fn into_notice(self) -> Option<Notice> {
        match self {
            Outcome::Applied(notice) | Outcome::Unsaved(notice) | Outcome::Rejected(notice) => {
                Some(notice)
            }
            Outcome::Unchanged => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

/// One checkbox row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow<'a> {
    pub book: &'a Book,
    pub included: bool,
}

/// Everything a front-end needs to draw the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView<'a> {
    pub set_names: Vec<&'a str>,
    pub current: &'a str,
    pub rows: Vec<BookRow<'a>>,
    pub included: usize,
    pub can_edit: bool,
    pub can_remove: bool,
    pub unsaved: bool,
}

pub struct BookSetEditor<S: BookSetStore> {
    registry: BookSetRegistry,
    store: S,
    unsaved: bool,
}

impl<S: BookSetStore> BookSetEditor<S> {
    pub fn new(registry: BookSetRegistry, store: S) -> Self {
        Self {
            registry,
            store,
            unsaved: false,
        }
    }

    pub fn registry(&self) -> &BookSetRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Forward a gesture to the registry. A rejected gesture changes nothing;
    /// an accepted one is saved right away.
    pub fn apply(&mut self, gesture: Gesture) -> Outcome {
        match self.forward(gesture) {
            Ok(Some(message)) => self.persist(message),
            Ok(None) => Outcome::Unchanged,
            Err(err) => {
                warn!(error = %err, "book set gesture rejected");
                Outcome::Rejected(Notice::error(err.to_string()))
            }
        }
    }

    /// Try again to write changes a previous save could not.
    pub fn retry_save(&mut self) -> Outcome {
        if !self.unsaved {
            return Outcome::Unchanged;
        }
        self.persist("Saved book sets.".to_string())
    }

    pub fn view(&self) -> EditorView<'_> {
        let registry = &self.registry;
        let current = registry.current();
        let rows = registry
            .catalog()
            .list()
            .iter()
            .map(|book| BookRow {
                book,
                // Every catalog book has a flag.
                included: current.is_included(&book.id).unwrap_or(false),
            })
            .collect();
        let editable = !registry.is_default(current.name());

        EditorView {
            set_names: registry.all_names(),
            current: current.name(),
            rows,
            included: current.included_count(),
            can_edit: editable,
            can_remove: editable && registry.len() > 1,
            unsaved: self.unsaved,
        }
    }

    /// Returns the success message, or `None` when the gesture was a no-op
    /// that needs no save.
    fn forward(&mut self, gesture: Gesture) -> Result<Option<String>, BookSetError> {
        let registry = &mut self.registry;
        let message = match gesture {
            Gesture::ToggleBook(book) => {
                let included = registry.toggle(&book)?;
                let verb = if included { "Included" } else { "Excluded" };
                format!("{verb} {}.", book_name(registry, &book))
            }
            Gesture::SetBook { book, included } => {
                if !registry.set_included(&book, included)? {
                    return Ok(None);
                }
                let verb = if included { "Included" } else { "Excluded" };
                format!("{verb} {}.", book_name(registry, &book))
            }
            Gesture::SwitchSet(name) => {
                registry.select_current(&name)?;
                format!("Searching in '{}'.", registry.current_name())
            }
            Gesture::AddSet(name) => {
                let added = registry.add(&name)?;
                format!("Added book set '{}'.", added.name())
            }
            Gesture::RemoveSet(name) => {
                let shown = registry
                    .get(&name)
                    .map(|set| set.name().to_string())
                    .unwrap_or_else(|| name.clone());
                registry.remove(&name)?;
                format!("Removed book set '{shown}'.")
            }
            Gesture::RenameCurrent(new_name) => {
                let old = registry.current_name().to_string();
                registry.rename(&old, &new_name)?;
                format!("Renamed '{old}' to '{}'.", registry.current_name())
            }
            Gesture::SelectAll => {
                registry.select_all()?;
                "Included every book.".to_string()
            }
            Gesture::SelectNone => {
                registry.select_none()?;
                "Excluded every book.".to_string()
            }
            Gesture::SelectInverse => {
                registry.select_inverse()?;
                "Inverted the selection.".to_string()
            }
        };
        Ok(Some(message))
    }

    /// Save after a change. On failure the change stays in memory and is
    /// flagged as unsaved so the user can retry.
    fn persist(&mut self, message: String) -> Outcome {
        match self.registry.save(&mut self.store) {
            Ok(()) => {
                self.unsaved = false;
                Outcome::Applied(Notice::info(message))
            }
            Err(err) => {
                error!(error = %err, "failed to save book sets");
                self.unsaved = true;
                Outcome::Unsaved(Notice::error(format!("{message} Not saved: {err}")))
            }
        }
    }
}

fn book_name(registry: &BookSetRegistry, book: &BookId) -> String {
    registry
        .catalog()
        .get(book)
        .map(|b| b.name.clone())
        .unwrap_or_else(|| book.to_string())
}
