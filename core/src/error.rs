use thiserror::Error;

/// Failures reported by [`LocalIndex::find`](crate::LocalIndex::find). Index mutation
/// and term lookups never fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("query has no searchable terms")]
    EmptyQuery,

    #[error("index has no documents")]
    EmptyIndex,

    #[error("invalid search parameters: {0}")]
    InvalidParams(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
