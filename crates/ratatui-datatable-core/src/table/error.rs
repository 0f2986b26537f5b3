use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("page size must be greater than zero (got {0})")]
    InvalidPageSize(usize),

    #[error("failed to format column `{column}`: {message}")]
    Cell { column: String, message: String },
}

/// Returned by column cell formatters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CellError {
    pub message: String,
}

impl CellError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
