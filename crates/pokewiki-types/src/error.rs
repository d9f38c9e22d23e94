use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid username {name:?}: {reason}")]
    InvalidUsername { name: String, reason: String },

    #[error("invalid page name {name:?}: {reason}")]
    InvalidPageName { name: String, reason: String },

    #[error("unknown sort direction: {0}")]
    UnknownSortDirection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
