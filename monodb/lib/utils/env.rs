use std::path::PathBuf;

use crate::config::DEFAULT_MONODB_HOME;

use super::MONODB_HOME_ENV_VAR;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the monodb home directory: `$MONODB_HOME` when set, `~/.monodb` otherwise.
pub fn get_monodb_home_path() -> PathBuf {
    match std::env::var_os(MONODB_HOME_ENV_VAR) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => DEFAULT_MONODB_HOME.to_path_buf(),
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
