//! `monoutils::path` is a module containing path utilities for the monodb project.

use std::path::{Path, PathBuf};

use crate::{MonoutilsError, MonoutilsResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The literal used in place of the user's home directory in displayed paths.
pub const HOME_LITERAL: &str = "$HOME";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the home directory of the current user.
pub fn home_dir() -> MonoutilsResult<PathBuf> {
    dirs::home_dir().ok_or(MonoutilsError::HomeDirNotFound)
}

/// Expands a leading `~` or `$HOME` in `path` to the user's home directory.
///
/// Paths without such a prefix are returned unchanged.
pub fn expand_home(path: impl AsRef<str>) -> MonoutilsResult<PathBuf> {
    let path = path.as_ref();
    for prefix in ["~", HOME_LITERAL] {
        if path == prefix {
            return home_dir();
        }

        if let Some(rest) = path.strip_prefix(&format!("{prefix}/")) {
            return Ok(home_dir()?.join(rest));
        }
    }

    Ok(PathBuf::from(path))
}

/// Replaces the user's home directory prefix in `path` with `$HOME`, for display purposes.
pub fn replace_literal_home(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    match dirs::home_dir() {
        Some(home) => match path.strip_prefix(&home) {
            Ok(rest) if rest.as_os_str().is_empty() => HOME_LITERAL.to_string(),
            Ok(rest) => format!("{}/{}", HOME_LITERAL, rest.display()),
            Err(_) => path.display().to_string(),
        },
        None => path.display().to_string(),
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
