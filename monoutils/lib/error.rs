//! `monoutils::error` is a module containing error utilities for the monodb project.

use std::path::PathBuf;

use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a monoutils-related operation.
pub type MonoutilsResult<T> = Result<T, MonoutilsError>;

/// An error that occurred in one of the monoutils helpers.
#[derive(pretty_error_debug::Debug, Error)]
pub enum MonoutilsError {
    /// An error that occurred when validating paths
    #[error("path validation error: {0}")]
    PathValidation(String),

    /// The home directory of the current user could not be determined
    #[error("unable to determine the home directory")]
    HomeDirNotFound,

    /// A file could not be replaced atomically
    #[error("atomic write to {path} failed: {source}")]
    AtomicWrite {
        /// The destination that was being replaced.
        path: PathBuf,

        /// The underlying io error.
        #[source]
        source: std::io::Error,
    },

    /// An error that occurred when performing an IO operation
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `MonoutilsResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> MonoutilsResult<T> {
    Result::Ok(value)
}
