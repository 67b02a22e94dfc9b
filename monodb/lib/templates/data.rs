//! Typed data for each template family.

use chrono::{DateTime, Local};
use serde::Serialize;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Timestamp layout of generated files, e.g. `Mon Jan  6 15:04:05 UTC 2025`.
pub const SCRIPT_TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Z %Y";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Fields every generated file starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptHeader {
    /// The interpreter line.
    pub shell_path: String,

    /// The version of monodb that generated the file.
    pub app_version: String,

    /// When the file was generated.
    pub date_time: String,
}

/// One node as seen by the multi-node scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeScriptData {
    /// The generated file header.
    #[serde(flatten)]
    pub header: ScriptHeader,

    /// The node ordinal, starting at 1.
    pub node: usize,

    /// The client port.
    pub node_port: u16,

    /// The group communication port.
    pub group_port: u16,

    /// The X protocol port, if allocated.
    pub mysqlx_port: Option<u16>,

    /// The admin port, if allocated.
    pub admin_port: Option<u16>,

    /// The node directory prefix.
    pub node_label: String,

    /// The sandbox directory.
    pub sandbox_dir: String,
}

/// Data of the scripts acting on several nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiNodeData {
    /// The generated file header.
    #[serde(flatten)]
    pub header: ScriptHeader,

    /// The cluster shell.
    pub cluster_shell_path: String,

    /// The sandbox directory.
    pub sandbox_dir: String,

    /// The address nodes advertise.
    pub master_ip: String,

    /// Space-separated ordinals of the primaries.
    pub master_list: String,

    /// Space-separated ordinals of the secondaries.
    pub slave_list: String,

    /// Space-separated ordinals in stop order.
    pub stop_node_list: String,

    /// The node directory prefix.
    pub node_label: String,

    /// The primary label.
    pub master_label: String,

    /// The primary abbreviation.
    pub master_abbr: String,

    /// The secondary label.
    pub slave_label: String,

    /// The secondary abbreviation.
    pub slave_abbr: String,

    /// The database user.
    pub db_user: String,

    /// The database password.
    pub db_password: String,

    /// The replication user.
    pub rpl_user: String,

    /// The replication password.
    pub rpl_password: String,

    /// Whether only node 1 accepts writes.
    pub single_primary: bool,

    /// Whether the server understands `SOURCE`/`REPLICA` statements.
    pub source_replica_terminology: bool,

    /// The name of the managed cluster.
    pub cluster_name: String,

    /// The client port of node 1.
    pub primary_port: u16,

    /// Every node, in ordinal order.
    pub nodes: Vec<NodeScriptData>,
}

/// Data of the group membership option blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicationOptionsData {
    /// The data block base port, zero-padded to eight digits.
    pub base_port: String,

    /// The peer string.
    pub group_seeds: String,

    /// The local group communication address.
    pub local_addresses: String,

    /// Whether only node 1 accepts writes.
    pub single_primary: bool,
}

/// Data of a node's configuration file and scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeConfigData {
    /// The generated file header.
    #[serde(flatten)]
    pub header: ScriptHeader,

    /// The client prompt, e.g. `node2`.
    pub prompt: String,

    /// The operating system user running the server.
    pub os_user: String,

    /// The server binaries.
    pub basedir: String,

    /// The node directory.
    pub sandbox_dir: String,

    /// The data directory.
    pub datadir: String,

    /// The temporary directory.
    pub tmpdir: String,

    /// The client port.
    pub port: u16,

    /// The server id.
    pub server_id: u32,

    /// The unix socket.
    pub socket_file: String,

    /// The address the server listens on.
    pub bind_address: String,

    /// The database user.
    pub db_user: String,

    /// The database password.
    pub db_password: String,

    /// The host part of the sandbox accounts.
    pub db_host: String,

    /// The replication user.
    pub rpl_user: String,

    /// The replication password.
    pub rpl_password: String,

    /// The X protocol port, if allocated.
    pub mysqlx_port: Option<u16>,

    /// The admin port, if allocated.
    pub admin_port: Option<u16>,

    /// Replication option blocks appended to the configuration.
    pub repl_options: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ScriptHeader {
    /// Creates a header stamped with the current local time.
    pub fn now(shell_path: impl Into<String>) -> Self {
        Self::at(shell_path, Local::now())
    }

    /// Creates a header stamped with `timestamp`.
    pub fn at(shell_path: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            shell_path: shell_path.into(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            date_time: timestamp.format(SCRIPT_TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl ReplicationOptionsData {
    /// Creates the option data of one node.
    pub fn new(
        base_port: u16,
        group_seeds: impl Into<String>,
        local_addresses: impl Into<String>,
        single_primary: bool,
    ) -> Self {
        Self {
            base_port: format!("{:08}", base_port),
            group_seeds: group_seeds.into(),
            local_addresses: local_addresses.into(),
            single_primary,
        }
    }
}
