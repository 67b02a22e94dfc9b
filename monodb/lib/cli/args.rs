use std::path::PathBuf;

use clap::Parser;

use crate::config::{Flavor, TopologyKind, DEFAULT_MASTER_IP, DEFAULT_NODES};

use super::styles;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// `monodb` is a tool for provisioning disposable local database sandboxes
#[derive(Debug, Parser)]
#[command(name = "monodb", author, version, styles=styles::styles())]
pub struct MonodbArgs {
    /// The subcommand to run
    #[command(subcommand)]
    pub subcommand: Option<MonodbSubcommand>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Debug, Parser)]
pub enum MonodbSubcommand {
    /// Initialize the monodb home directory
    #[command(name = "init")]
    Init {
        /// The directory to initialize. Defaults to $MONODB_HOME or ~/.monodb
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Deploy a multi-node sandbox
    #[command(name = "deploy")]
    Deploy {
        /// The topology to deploy
        #[arg(value_enum)]
        topology: TopologyKind,

        /// The server version, e.g. 8.0.35
        version: String,

        /// The number of nodes
        #[arg(long, default_value_t = DEFAULT_NODES)]
        nodes: usize,

        /// Accept writes on the first node only
        #[arg(long)]
        single_primary: bool,

        /// The base port of the data block
        #[arg(long)]
        base_port: Option<u16>,

        /// The name of the sandbox directory under the sandbox home
        #[arg(long)]
        sandbox_directory: Option<String>,

        /// Install the nodes without starting them
        #[arg(long)]
        skip_start: bool,

        /// Run the per-node actions in parallel
        #[arg(long)]
        concurrent: bool,

        /// Configure the administrative connection interface
        #[arg(long)]
        enable_admin_address: bool,

        /// Configure the X protocol even when the version does not enable it
        #[arg(long, conflicts_with = "disable_mysqlx")]
        enable_mysqlx: bool,

        /// Never configure the X protocol
        #[arg(long)]
        disable_mysqlx: bool,

        /// Start the nodes read-only
        #[arg(long)]
        read_only: bool,

        /// Start the nodes super-read-only
        #[arg(long)]
        super_read_only: bool,

        /// Replace an existing sandbox at the destination
        #[arg(long)]
        force: bool,

        /// The server flavor
        #[arg(long, value_enum, default_value_t = Flavor::Mysql)]
        flavor: Flavor,

        /// The address the nodes listen on
        #[arg(long, default_value = DEFAULT_MASTER_IP)]
        master_ip: String,
    },

    /// List the installed sandboxes
    #[command(name = "sandboxes")]
    Sandboxes,

    /// Stop and delete a sandbox
    #[command(name = "delete")]
    Delete {
        /// The sandbox name under the sandbox home, or its path
        name: String,
    },
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deploy() {
        let args = MonodbArgs::parse_from([
            "monodb",
            "deploy",
            "group",
            "8.0.35",
            "--single-primary",
            "--base-port",
            "20000",
            "--concurrent",
        ]);

        match args.subcommand {
            Some(MonodbSubcommand::Deploy {
                topology,
                version,
                nodes,
                single_primary,
                base_port,
                concurrent,
                flavor,
                master_ip,
                ..
            }) => {
                assert_eq!(topology, TopologyKind::GroupReplication);
                assert_eq!(version, "8.0.35");
                assert_eq!(nodes, DEFAULT_NODES);
                assert!(single_primary);
                assert_eq!(base_port, Some(20000));
                assert!(concurrent);
                assert_eq!(flavor, Flavor::Mysql);
                assert_eq!(master_ip, DEFAULT_MASTER_IP);
            }
            other => panic!("unexpected subcommand: {:?}", other),
        }
    }

    #[test]
    fn test_mysqlx_flags_conflict() {
        let result = MonodbArgs::try_parse_from([
            "monodb",
            "deploy",
            "cluster",
            "8.0.35",
            "--enable-mysqlx",
            "--disable-mysqlx",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_delete() {
        let args = MonodbArgs::parse_from(["monodb", "delete", "group_msb_8_0_35"]);
        assert!(matches!(
            args.subcommand,
            Some(MonodbSubcommand::Delete { ref name }) if name == "group_msb_8_0_35"
        ));
    }
}
