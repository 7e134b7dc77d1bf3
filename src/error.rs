// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BalancingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Network has no branches")]
    EmptyNetwork,

    #[error("Branch {0} is missing from the record mapping")]
    MissingBranch(String),

    #[error("Branch {0} is not part of the configured network")]
    UnexpectedBranch(String),

    #[error("Branch {branch} has {actual} products, expected {expected}")]
    ProductCountMismatch {
        branch: String,
        expected: usize,
        actual: usize,
    },

    #[error("Branch {branch} has product {actual} at position {position}, expected {expected}")]
    ProductMismatch {
        branch: String,
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("Branch {0} is listed more than once")]
    DuplicateBranch(String),

    #[error("Product {0} appears more than once")]
    DuplicateProduct(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BalancingError>;
