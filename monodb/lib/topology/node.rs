use std::path::PathBuf;

use getset::Getters;
use typed_builder::TypedBuilder;

use crate::config::Flavor;

use super::NodeRole;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Everything the topology decided about one node.
#[derive(Debug, Clone, PartialEq, Eq, Getters, TypedBuilder)]
#[getset(get = "pub with_prefix")]
pub struct NodeRecord {
    /// The node ordinal, starting at 1.
    pub(super) ordinal: usize,

    /// The client port.
    pub(super) data_port: u16,

    /// The group communication port.
    pub(super) group_port: u16,

    /// The X protocol port.
    pub(super) mysqlx_port: Option<u16>,

    /// The admin port.
    pub(super) admin_port: Option<u16>,

    /// The client prompt, e.g. `node1`.
    pub(super) label: String,

    /// The node directory name.
    pub(super) dir_name: String,

    /// The server id.
    pub(super) server_id: u32,

    /// The addresses of every member, shared by all nodes.
    pub(super) peer_string: String,

    /// Whether the node accepts writes.
    pub(super) role: NodeRole,
}

/// The request handed to a node creator.
#[derive(Debug, Clone)]
pub struct NodeDefinition {
    /// The topology's view of the node.
    pub record: NodeRecord,

    /// The server version.
    pub version: String,

    /// The server flavor.
    pub flavor: Flavor,

    /// The server binaries.
    pub basedir: PathBuf,

    /// The sandbox directory.
    pub sandbox_dir: PathBuf,

    /// The node directory inside the sandbox.
    pub node_dir: PathBuf,

    /// The sandbox type of the node, e.g. `group-node`.
    pub sandbox_type: String,

    /// The database user.
    pub db_user: String,

    /// The database password.
    pub db_password: String,

    /// The replication user.
    pub rpl_user: String,

    /// The replication password.
    pub rpl_password: String,

    /// The address the node listens on.
    pub master_ip: String,

    /// The interpreter line of generated scripts.
    pub shell_path: String,

    /// Option blocks to append to the node configuration.
    pub repl_options: String,

    /// Install the node without starting it.
    pub skip_start: bool,

    /// Create the sandbox users after start.
    pub load_grants: bool,
}
