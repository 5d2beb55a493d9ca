use thiserror::Error;

/// A municipality name with no gazetteer entry. The record is kept without coordinates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnresolvedLocationError {
    #[error("Municipality name is empty")]
    EmptyName,

    #[error("No municipality named '{name}' (lookup key '{key}')")]
    NotFound { name: String, key: String },
}
