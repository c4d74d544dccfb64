//! Unified error types for the CPMP workspace
//!
//! [`CpmpError`] is the common error representation at crate boundaries.
//! Instance readers return `anyhow::Result` internally and are converted
//! into `CpmpError` where the solver picks them up.
//!
//! # Example
//!
//! ```ignore
//! use cpmp_core::{CpmpError, CpmpResult};
//!
//! fn solve_file(path: &Path) -> CpmpResult<Option<f64>> {
//!     let instance = read_instance(path)?;
//!     let config = BranchAndPriceConfig::default();
//!     let solution = BranchAndPrice::new(&instance, config).solve()?;
//!     Ok(solution.objective)
//! }
//! ```

use thiserror::Error;

/// Unified error type for all CPMP operations.
#[derive(Error, Debug)]
pub enum CpmpError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Instance text that does not follow the expected layout
    #[error("Parse error: {0}")]
    Parse(String),

    /// Instance data that parses but is not a valid CPMP instance
    #[error("Validation error: {0}")]
    Validation(String),

    /// LP backend failures
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using CpmpError.
pub type CpmpResult<T> = Result<T, CpmpError>;

impl From<anyhow::Error> for CpmpError {
    fn from(err: anyhow::Error) -> Self {
        CpmpError::Other(format!("{err:#}"))
    }
}

impl From<String> for CpmpError {
    fn from(s: String) -> Self {
        CpmpError::Other(s)
    }
}

impl From<&str> for CpmpError {
    fn from(s: &str) -> Self {
        CpmpError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for CpmpError {
    fn from(err: serde_json::Error) -> Self {
        CpmpError::Parse(err.to_string())
    }
}
