use thiserror::Error;

use crate::models::BookId;

/// Failures raised by book set operations. Every variant is a local validation
/// failure returned before any state is touched, except `Persistence` which
/// carries the database error chain.
#[derive(Debug, Error)]
pub enum BookSetError {
    #[error("Unknown book '{0}'.")]
    UnknownBook(BookId),

    #[error("No book set named '{0}'.")]
    UnknownSet(String),

    #[error("A book set named '{0}' already exists.")]
    DuplicateName(String),

    #[error("Book set name must not be empty.")]
    InvalidName,

    #[error("The last remaining book set cannot be removed.")]
    CannotRemoveLastSet,

    #[error("The '{0}' book set cannot be removed.")]
    CannotRemoveDefault(String),

    #[error("The '{0}' book set cannot be edited.")]
    DefaultSetReadOnly(String),

    #[error("Failed to persist book sets: {0:#}")]
    Persistence(#[from] anyhow::Error),
}
