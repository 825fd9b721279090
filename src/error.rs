//! Error types for environment stack construction.
//!
//! Only construction-time problems are represented as errors. Contract
//! violations during step/reset (duplicate info keys, mismatched key sets,
//! reserved-key collisions) abort immediately via assertions instead of
//! propagating, so a broken wrapper chain can never feed corrupted batches
//! into training.

use thiserror::Error;

/// Result type for environment stack operations.
pub type Result<T> = std::result::Result<T, EnvError>;

/// Errors raised while assembling a wrapper chain.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Invalid configuration (zero instances, empty board, etc.)
    #[error("invalid configuration for '{param}': {message}")]
    InvalidConfig {
        /// Name of the offending parameter.
        param: &'static str,
        /// Human-readable description of the problem.
        message: String,
    },

    /// The simulation's native board does not fit the padded shape.
    #[error("board {rows}x{cols} exceeds padded maximum {max_rows}x{max_cols}")]
    BoardTooLarge {
        /// Native board rows.
        rows: usize,
        /// Native board columns.
        cols: usize,
        /// Configured maximum rows.
        max_rows: usize,
        /// Configured maximum columns.
        max_cols: usize,
    },
}
