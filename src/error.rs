//! Error types for OrionDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using OrionError
pub type Result<T> = std::result::Result<T, OrionError>;

/// Unified error type for OrionDB operations
#[derive(Debug, Error)]
pub enum OrionError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Pager Errors
    // -------------------------------------------------------------------------
    #[error("page {requested} out of range (max {max})")]
    PageOutOfRange { requested: u32, max: u32 },

    #[error("table full: page budget exhausted")]
    TableFull,

    #[error("corrupted database file: {0}")]
    Corrupted(String),

    // -------------------------------------------------------------------------
    // Tree Errors
    // -------------------------------------------------------------------------
    #[error("duplicate key: {0}")]
    DuplicateKey(u32),

    // -------------------------------------------------------------------------
    // Row Codec Errors
    // -------------------------------------------------------------------------
    #[error("malformed row: {0}")]
    MalformedRow(String),

    #[error("{field} too long: {len} bytes (max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    // -------------------------------------------------------------------------
    // Statement Errors
    // -------------------------------------------------------------------------
    #[error("parse error: {0}")]
    Parse(String),
}
