use crate::types::Tab;
use thiserror::Error;

/// Errors from store mutations. A failed operation leaves the store as it was.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("a row named '{name}' already exists in {tab}")]
    DuplicateName { tab: Tab, name: String },

    #[error("no {tab} entry at index {index} (collection has {len})")]
    IndexOutOfRange { tab: Tab, index: usize, len: usize },

    #[error("an edit is already in progress on {0}; save or cancel it first")]
    DraftPending(Tab),

    #[error("no edit in progress on {0}")]
    NoDraft(Tab),

    #[error("an import into {0} is still pending")]
    ImportPending(Tab),
}

/// A required exchange-document field is missing or has the wrong type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed {tab} document: field '{field}' {problem}")]
pub struct SchemaError {
    pub tab: Tab,
    pub field: String,
    pub problem: SchemaProblem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaProblem {
    Missing,
    WrongType { expected: &'static str },
    /// Value already used by an earlier item of the same document.
    Duplicate,
}

impl std::fmt::Display for SchemaProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaProblem::Missing => f.write_str("is missing"),
            SchemaProblem::WrongType { expected } => write!(f, "must be {expected}"),
            SchemaProblem::Duplicate => f.write_str("repeats an earlier name"),
        }
    }
}

impl SchemaError {
    pub fn missing(tab: Tab, field: impl Into<String>) -> Self {
        Self {
            tab,
            field: field.into(),
            problem: SchemaProblem::Missing,
        }
    }

    pub fn wrong_type(tab: Tab, field: impl Into<String>, expected: &'static str) -> Self {
        Self {
            tab,
            field: field.into(),
            problem: SchemaProblem::WrongType { expected },
        }
    }

    pub fn duplicate(tab: Tab, field: impl Into<String>) -> Self {
        Self {
            tab,
            field: field.into(),
            problem: SchemaProblem::Duplicate,
        }
    }
}

/// Failures while turning file bytes into a collection.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures while restoring a saved session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported session version '{found}' (expected '{expected}')")]
    UnsupportedVersion { found: String, expected: &'static str },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown tab '{0}' (expected library, expressions or sections)")]
pub struct TabParseError(pub String);
