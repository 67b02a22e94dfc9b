use std::path::PathBuf;

use tokio::fs;

use crate::{
    config::MonodbConfig,
    utils::{self, LOG_SUBDIR},
    MonodbResult,
};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Initializes the monodb home directory.
///
/// Uses `home` when given, otherwise `$MONODB_HOME` or `~/.monodb`. Existing files are kept.
/// Returns the home directory.
pub async fn init_home(home: Option<PathBuf>) -> MonodbResult<PathBuf> {
    let home = home.unwrap_or_else(utils::get_monodb_home_path);

    // Create the home and log directories
    fs::create_dir_all(home.join(LOG_SUBDIR)).await?;

    // Write the default config unless one exists
    if MonodbConfig::default().save_if_absent(&home).await? {
        tracing::info!("created default config in {}", home.display());
    }

    Ok(home)
}

/// The directory run logs are written to.
pub fn log_dir(home: impl Into<PathBuf>) -> PathBuf {
    home.into().join(LOG_SUBDIR)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
