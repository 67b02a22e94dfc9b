use std::{path::PathBuf, sync::LazyLock};

use crate::utils::MONODB_HOME_DIR;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Offset added to the single-sandbox port to derive a multi-primary group's base port.
pub const DEFAULT_GROUP_REPLICATION_BASE_PORT: u16 = 12000;

/// Offset added to the single-sandbox port to derive a single-primary group's base port.
pub const DEFAULT_GROUP_REPLICATION_SP_BASE_PORT: u16 = 13000;

/// Distance between the data port block and the group-membership port block.
pub const DEFAULT_GROUP_PORT_DELTA: u16 = 125;

/// Distance between the data port block and the mysqlx port block.
pub const DEFAULT_MYSQLX_PORT_DELTA: u16 = 10000;

/// Distance between the data port block and the admin port block.
pub const DEFAULT_ADMIN_PORT_DELTA: u16 = 11000;

/// Derived base ports above this value are folded down in steps of 10000.
pub const DEFAULT_MAX_ALLOWED_PORT: u16 = 64000;

/// The default number of nodes in a group.
pub const DEFAULT_NODES: usize = 3;

/// The minimum number of nodes of a membership topology.
pub const MIN_MEMBERSHIP_NODES: usize = 3;

/// The prefix of node directory names.
pub const DEFAULT_NODE_PREFIX: &str = "node";

/// The label of primary nodes.
pub const DEFAULT_MASTER_NAME: &str = "master";

/// The abbreviation of primary nodes.
pub const DEFAULT_MASTER_ABBR: &str = "m";

/// The label of secondary nodes.
pub const DEFAULT_SLAVE_PREFIX: &str = "slave";

/// The abbreviation of secondary nodes.
pub const DEFAULT_SLAVE_ABBR: &str = "s";

/// The default database user.
pub const DEFAULT_DB_USER: &str = "msandbox";

/// The default database password.
pub const DEFAULT_DB_PASSWORD: &str = "msandbox";

/// The default replication user.
pub const DEFAULT_RPL_USER: &str = "rsandbox";

/// The default replication password.
pub const DEFAULT_RPL_PASSWORD: &str = "rsandbox";

/// The default address every node listens on.
pub const DEFAULT_MASTER_IP: &str = "127.0.0.1";

/// The name given to managed clusters.
pub const DEFAULT_CLUSTER_NAME: &str = "mycluster";

/// The default shell used by the generated scripts.
pub const DEFAULT_SHELL_PATH: &str = "/usr/bin/env bash";

/// The default cluster shell used to bootstrap managed clusters.
pub const DEFAULT_CLUSTER_SHELL_PATH: &str = "mysqlsh";

/// The path where all monodb global data is stored.
pub static DEFAULT_MONODB_HOME: LazyLock<PathBuf> = LazyLock::new(|| {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(MONODB_HOME_DIR)
});

/// The directory new sandboxes are created in.
pub static DEFAULT_SANDBOX_HOME: LazyLock<PathBuf> = LazyLock::new(|| {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sandboxes")
});

/// The directory holding one unpacked server tree per version.
pub static DEFAULT_SANDBOX_BINARY: LazyLock<PathBuf> = LazyLock::new(|| {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("opt")
        .join("mysql")
});
