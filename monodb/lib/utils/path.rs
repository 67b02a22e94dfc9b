//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The directory under the user's home where monodb keeps its global data.
pub const MONODB_HOME_DIR: &str = ".monodb";

/// The environment variable overriding the monodb home directory.
pub const MONODB_HOME_ENV_VAR: &str = "MONODB_HOME";

/// The filename of the host-wide sandbox catalog.
pub const CATALOG_FILENAME: &str = "sandboxes.json";

/// The filename of the host-wide configuration.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// The sub directory of the monodb home holding run logs.
pub const LOG_SUBDIR: &str = "logs";

/// The filename of the description written inside every sandbox.
pub const DESCRIPTION_FILENAME: &str = "sbdescription.json";

/// The filename of the per-node server configuration.
pub const NODE_CONFIG_FILENAME: &str = "my.sandbox.cnf";

/// The sub directory of a node holding its data files.
pub const NODE_DATA_SUBDIR: &str = "data";

/// The sub directory of a node holding its temporary files.
pub const NODE_TMP_SUBDIR: &str = "tmp";
