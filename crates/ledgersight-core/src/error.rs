//! Error types for Ledgersight

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Statement contains no rows")]
    EmptyTable,

    #[error("Invalid amount in column '{column}' at row {row}: '{value}'")]
    InvalidAmount {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Training error: {0}")]
    Training(String),

    #[error("Model fit error: {0}")]
    ModelFit(String),
}

pub type Result<T> = std::result::Result<T, Error>;
