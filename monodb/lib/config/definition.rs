//! The provisioning request.

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::{
    Capability, Flavor, DEFAULT_CLUSTER_SHELL_PATH, DEFAULT_DB_PASSWORD, DEFAULT_DB_USER,
    DEFAULT_MASTER_IP, DEFAULT_NODES, DEFAULT_RPL_PASSWORD, DEFAULT_RPL_USER, DEFAULT_SHELL_PATH,
    MIN_MEMBERSHIP_NODES,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The arrangement of nodes in a multi-node sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyKind {
    /// A group replication set whose members are started through SQL.
    #[value(name = "group")]
    GroupReplication,

    /// A managed cluster formed through the cluster shell.
    #[value(name = "cluster")]
    InnodbCluster,
}

/// One provisioning request.
///
/// A definition is owned by a single provisioning run. The topology builder fills in the
/// allocated base port as allocation proceeds.
#[derive(Debug, Clone, TypedBuilder)]
pub struct SandboxDefinition {
    /// The server version, e.g. `8.0.35`.
    #[builder(setter(into))]
    pub version: String,

    /// The server flavor.
    #[builder(default)]
    pub flavor: Flavor,

    /// The directory holding the unpacked server binaries.
    #[builder(setter(into))]
    pub basedir: PathBuf,

    /// The single-sandbox port. Derived from the version when unset.
    #[builder(default, setter(strip_option))]
    pub port: Option<u16>,

    /// Explicit base port of the data block. Derived from `port` when unset.
    #[builder(default, setter(strip_option))]
    pub base_port: Option<u16>,

    /// The destination directory.
    #[builder(setter(into))]
    pub sandbox_dir: PathBuf,

    /// The topology to build.
    pub topology: TopologyKind,

    /// The number of nodes.
    #[builder(default = DEFAULT_NODES)]
    pub nodes: usize,

    /// Whether only node 1 accepts writes.
    #[builder(default)]
    pub single_primary: bool,

    /// The database user.
    #[builder(default = DEFAULT_DB_USER.to_string(), setter(into))]
    pub db_user: String,

    /// The database password.
    #[builder(default = DEFAULT_DB_PASSWORD.to_string(), setter(into))]
    pub db_password: String,

    /// The replication user.
    #[builder(default = DEFAULT_RPL_USER.to_string(), setter(into))]
    pub rpl_user: String,

    /// The replication password.
    #[builder(default = DEFAULT_RPL_PASSWORD.to_string(), setter(into))]
    pub rpl_password: String,

    /// The address the nodes listen on and advertise to their peers.
    #[builder(default = DEFAULT_MASTER_IP.to_string(), setter(into))]
    pub master_ip: String,

    /// Install the nodes without starting them.
    #[builder(default)]
    pub skip_start: bool,

    /// Run the per-node actions of a band in parallel.
    #[builder(default)]
    pub run_concurrently: bool,

    /// Allocate and configure the administrative connection interface.
    #[builder(default)]
    pub enable_admin_address: bool,

    /// Allocate and configure the X protocol even when the version does not enable it by default.
    #[builder(default)]
    pub enable_mysqlx: bool,

    /// Never allocate the X protocol ports.
    #[builder(default)]
    pub disable_mysqlx: bool,

    /// Start the nodes read-only.
    #[builder(default)]
    pub read_only: bool,

    /// Start the nodes super-read-only.
    #[builder(default)]
    pub super_read_only: bool,

    /// Replace an existing sandbox at the destination.
    #[builder(default)]
    pub force: bool,

    /// The base of the per-node server ids.
    #[builder(default)]
    pub base_server_id: u32,

    /// The interpreter line of the generated scripts.
    #[builder(default = DEFAULT_SHELL_PATH.to_string(), setter(into))]
    pub shell_path: String,

    /// The cluster shell used to bootstrap managed clusters.
    #[builder(default = DEFAULT_CLUSTER_SHELL_PATH.to_string(), setter(into))]
    pub cluster_shell_path: String,

    /// The log file of the run, recorded in the sandbox description.
    #[builder(default, setter(strip_option, into))]
    pub log_file: Option<PathBuf>,

    /// Ports to treat as reserved in addition to the catalog.
    #[builder(default)]
    pub installed_ports: Vec<u16>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl TopologyKind {
    /// The minimum number of nodes of the topology.
    pub fn min_nodes(&self) -> usize {
        MIN_MEMBERSHIP_NODES
    }

    /// The capability the server needs to run the topology.
    pub fn required_capability(&self) -> Capability {
        match self {
            TopologyKind::GroupReplication => Capability::GroupReplication,
            TopologyKind::InnodbCluster => Capability::InnodbCluster,
        }
    }

    /// The sandbox type recorded in descriptions and the catalog.
    pub fn sandbox_type(&self, single_primary: bool) -> &'static str {
        match (self, single_primary) {
            (TopologyKind::GroupReplication, false) => "group-multi-primary",
            (TopologyKind::GroupReplication, true) => "group-single-primary",
            (TopologyKind::InnodbCluster, _) => "innodb-cluster",
        }
    }

    /// The prefix of default destination directory names.
    pub fn dir_prefix(&self, single_primary: bool) -> &'static str {
        match (self, single_primary) {
            (TopologyKind::GroupReplication, false) => "group_msb_",
            (TopologyKind::GroupReplication, true) => "group_sp_msb_",
            (TopologyKind::InnodbCluster, _) => "ic_msb_",
        }
    }
}

impl SandboxDefinition {
    /// The default destination directory name for a topology and version, e.g. `group_msb_8_0_35`.
    pub fn default_dir_name(topology: TopologyKind, single_primary: bool, version: &str) -> String {
        format!(
            "{}{}",
            topology.dir_prefix(single_primary),
            version.replace('.', "_")
        )
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyKind::GroupReplication => write!(f, "group replication"),
            TopologyKind::InnodbCluster => write!(f, "InnoDB Cluster"),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder_defaults() {
        let def = SandboxDefinition::builder()
            .version("8.0.35")
            .basedir("/opt/mysql/8.0.35")
            .sandbox_dir("/tmp/group_msb_8_0_35")
            .topology(TopologyKind::GroupReplication)
            .build();

        assert_eq!(def.nodes, 3);
        assert_eq!(def.flavor, Flavor::Mysql);
        assert_eq!(def.master_ip, "127.0.0.1");
        assert_eq!(def.rpl_user, "rsandbox");
        assert!(def.port.is_none());
        assert!(!def.skip_start);
    }

    #[test]
    fn test_default_dir_name() {
        assert_eq!(
            SandboxDefinition::default_dir_name(TopologyKind::GroupReplication, true, "8.0.35"),
            "group_sp_msb_8_0_35"
        );
        assert_eq!(
            SandboxDefinition::default_dir_name(TopologyKind::InnodbCluster, true, "8.4.0"),
            "ic_msb_8_4_0"
        );
    }

    #[test]
    fn test_sandbox_type() {
        assert_eq!(
            TopologyKind::GroupReplication.sandbox_type(false),
            "group-multi-primary"
        );
        assert_eq!(TopologyKind::InnodbCluster.sandbox_type(true), "innodb-cluster");
    }
}
