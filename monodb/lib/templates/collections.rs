use std::sync::LazyLock;

use super::{Template, TemplateCollection};

//--------------------------------------------------------------------------------------------------
// Constants: Single Node
//--------------------------------------------------------------------------------------------------

/// The node configuration file.
pub const TMPL_MY_CNF: &str = "my_cnf";

/// Basic binary log and relay log options.
pub const TMPL_REPLICATION_OPTIONS: &str = "replication_options";

/// GTID options.
pub const TMPL_GTID_OPTIONS: &str = "gtid_options";

/// Crash-safe replication options for `8.0.x` and older.
pub const TMPL_REPL_CRASH_SAFE_OPTIONS: &str = "repl_crash_safe_options";

/// Crash-safe replication options for `8.4` and newer.
pub const TMPL_REPL_CRASH_SAFE_OPTIONS84: &str = "repl_crash_safe_options84";

/// Initializes the node data directory.
pub const TMPL_INIT_DB: &str = "init_db";

/// Starts the node.
pub const TMPL_START: &str = "start";

/// Stops the node.
pub const TMPL_STOP: &str = "stop";

/// Reports whether the node runs.
pub const TMPL_STATUS: &str = "status";

/// Restarts the node.
pub const TMPL_RESTART: &str = "restart";

/// Kills the node process.
pub const TMPL_SEND_KILL: &str = "send_kill";

/// Removes the node data.
pub const TMPL_CLEAR: &str = "clear";

/// Opens a client session on the node.
pub const TMPL_USE: &str = "use";

/// Opens a client session on the admin port.
pub const TMPL_USE_ADMIN: &str = "use_admin";

/// Creates the sandbox users.
pub const TMPL_LOAD_GRANTS: &str = "load_grants";

/// Checks that the node answers.
pub const TMPL_TEST_SB: &str = "test_sb";

//--------------------------------------------------------------------------------------------------
// Constants: Multiple Nodes
//--------------------------------------------------------------------------------------------------

/// Starts every node.
pub const TMPL_START_MULTI: &str = "start_multi";

/// Restarts every node.
pub const TMPL_RESTART_MULTI: &str = "restart_multi";

/// Reports every node.
pub const TMPL_STATUS_MULTI: &str = "status_multi";

/// Tests every node.
pub const TMPL_TEST_SB_MULTI: &str = "test_sb_multi";

/// Stops every node, last first.
pub const TMPL_STOP_MULTI: &str = "stop_multi";

/// Removes the data of every node.
pub const TMPL_CLEAR_MULTI: &str = "clear_multi";

/// Kills every node.
pub const TMPL_SEND_KILL_MULTI: &str = "send_kill_multi";

/// Runs a query on every node.
pub const TMPL_USE_MULTI: &str = "use_multi";

/// Runs a query on every node through the admin port.
pub const TMPL_USE_MULTI_ADMIN: &str = "use_multi_admin";

/// Prints one piece of metadata of every node.
pub const TMPL_METADATA_MULTI: &str = "metadata_multi";

/// Runs a command in every node directory.
pub const TMPL_EXEC_MULTI: &str = "exec_multi";

/// The `n<i>` shortcut.
pub const TMPL_NODE: &str = "node";

/// The `na<i>` shortcut.
pub const TMPL_NODE_ADMIN: &str = "node_admin";

/// Runs a query on every primary.
pub const TMPL_USE_MASTERS: &str = "use_masters";

/// Runs a query on every secondary.
pub const TMPL_USE_SLAVES: &str = "use_slaves";

/// Runs a command in every primary directory.
pub const TMPL_EXEC_MASTERS: &str = "exec_masters";

/// Runs a command in every secondary directory.
pub const TMPL_EXEC_SLAVES: &str = "exec_slaves";

/// Checks that tables created on every primary reach every node.
pub const TMPL_TEST_REPLICATION: &str = "test_replication";

/// Reinitializes and restarts every node.
pub const TMPL_WIPE_AND_RESTART_ALL: &str = "wipe_and_restart_all";

//--------------------------------------------------------------------------------------------------
// Constants: Membership
//--------------------------------------------------------------------------------------------------

/// Group replication options for `8.0.x` and older.
pub const TMPL_GROUP_REPL_OPTIONS: &str = "group_replication_options";

/// Group replication options for `8.4` and newer.
pub const TMPL_GROUP_REPL_OPTIONS84: &str = "group_replication_options84";

/// Starts group replication on every node.
pub const TMPL_INIT_NODES: &str = "init_nodes";

/// Lists the group members as seen by each node.
pub const TMPL_CHECK_NODES: &str = "check_nodes";

/// Managed cluster options for `8.0.x`.
pub const TMPL_CLUSTER_OPTIONS: &str = "cluster_options";

/// Managed cluster options for `8.4` and newer.
pub const TMPL_CLUSTER_OPTIONS84: &str = "cluster_options84";

/// Forms the managed cluster through the cluster shell.
pub const TMPL_INIT_CLUSTER_NODES: &str = "init_cluster_nodes";

/// Prints the managed cluster status.
pub const TMPL_CHECK_CLUSTER: &str = "check_cluster";

//--------------------------------------------------------------------------------------------------
// Statics
//--------------------------------------------------------------------------------------------------

/// Templates of a single node: its configuration file, scripts and option blocks.
pub static SINGLE_TEMPLATES: LazyLock<TemplateCollection> = LazyLock::new(|| {
    TemplateCollection::from([
        Template::new(TMPL_MY_CNF, "Node configuration file", "", include_str!("single/my_cnf.tera")),
        Template::new(
            TMPL_REPLICATION_OPTIONS,
            "Binary log and relay log options",
            "Static text",
            include_str!("single/replication_options.tera"),
        ),
        Template::new(TMPL_GTID_OPTIONS, "GTID options", "Static text", include_str!("single/gtid_options.tera")),
        Template::new(
            TMPL_REPL_CRASH_SAFE_OPTIONS,
            "Crash-safe replication options",
            "Up to 8.0.x",
            include_str!("single/repl_crash_safe_options.tera"),
        ),
        Template::new(
            TMPL_REPL_CRASH_SAFE_OPTIONS84,
            "Crash-safe replication options for 8.4.x",
            "The repository options were removed in 8.4",
            include_str!("single/repl_crash_safe_options84.tera"),
        ),
        Template::new(TMPL_INIT_DB, "Initializes the data directory", "", include_str!("single/init_db.tera")),
        Template::new(TMPL_START, "Starts the server", "", include_str!("single/start.tera")),
        Template::new(TMPL_STOP, "Stops the server", "", include_str!("single/stop.tera")),
        Template::new(TMPL_STATUS, "Shows whether the server is running", "", include_str!("single/status.tera")),
        Template::new(TMPL_RESTART, "Restarts the server", "", include_str!("single/restart.tera")),
        Template::new(TMPL_SEND_KILL, "Kills the server process", "", include_str!("single/send_kill.tera")),
        Template::new(TMPL_CLEAR, "Removes all data", "", include_str!("single/clear.tera")),
        Template::new(TMPL_USE, "Opens a client session", "", include_str!("single/use.tera")),
        Template::new(
            TMPL_USE_ADMIN,
            "Opens a client session on the admin port",
            "Only written when the admin address is enabled",
            include_str!("single/use_admin.tera"),
        ),
        Template::new(TMPL_LOAD_GRANTS, "Creates the sandbox users", "", include_str!("single/load_grants.tera")),
        Template::new(TMPL_TEST_SB, "Checks that the server answers", "", include_str!("single/test_sb.tera")),
    ])
});

/// Scripts acting on every node of a multi-node sandbox.
pub static MULTIPLE_TEMPLATES: LazyLock<TemplateCollection> = LazyLock::new(|| {
    TemplateCollection::from([
        Template::new(TMPL_START_MULTI, "Starts all nodes", "", include_str!("multiple/start_multi.tera")),
        Template::new(TMPL_RESTART_MULTI, "Restarts all nodes", "", include_str!("multiple/restart_multi.tera")),
        Template::new(TMPL_STATUS_MULTI, "Shows the status of all nodes", "", include_str!("multiple/status_multi.tera")),
        Template::new(TMPL_TEST_SB_MULTI, "Tests all nodes", "", include_str!("multiple/test_sb_multi.tera")),
        Template::new(
            TMPL_STOP_MULTI,
            "Stops all nodes",
            "Nodes are stopped in reverse order",
            include_str!("multiple/stop_multi.tera"),
        ),
        Template::new(TMPL_CLEAR_MULTI, "Removes the data of all nodes", "", include_str!("multiple/clear_multi.tera")),
        Template::new(TMPL_SEND_KILL_MULTI, "Kills all nodes", "", include_str!("multiple/send_kill_multi.tera")),
        Template::new(TMPL_USE_MULTI, "Runs a query on all nodes", "", include_str!("multiple/use_multi.tera")),
        Template::new(
            TMPL_USE_MULTI_ADMIN,
            "Runs a query on all nodes through the admin port",
            "",
            include_str!("multiple/use_multi_admin.tera"),
        ),
        Template::new(
            TMPL_METADATA_MULTI,
            "Shows the ports and directories of all nodes",
            "Takes the metadata name as argument",
            include_str!("multiple/metadata_multi.tera"),
        ),
        Template::new(TMPL_EXEC_MULTI, "Runs a command in every node directory", "", include_str!("multiple/exec_multi.tera")),
        Template::new(TMPL_NODE, "Opens a client session on one node", "", include_str!("multiple/node.tera")),
        Template::new(
            TMPL_NODE_ADMIN,
            "Opens an admin session on one node",
            "",
            include_str!("multiple/node_admin.tera"),
        ),
    ])
});

/// Scripts acting on the nodes of one role.
pub static REPLICATION_TEMPLATES: LazyLock<TemplateCollection> = LazyLock::new(|| {
    TemplateCollection::from([
        Template::new(TMPL_USE_MASTERS, "Runs a query on all masters", "", include_str!("replication/use_masters.tera")),
        Template::new(TMPL_USE_SLAVES, "Runs a query on all slaves", "", include_str!("replication/use_slaves.tera")),
        Template::new(
            TMPL_EXEC_MASTERS,
            "Runs a command in every master directory",
            "",
            include_str!("replication/exec_masters.tera"),
        ),
        Template::new(
            TMPL_EXEC_SLAVES,
            "Runs a command in every slave directory",
            "",
            include_str!("replication/exec_slaves.tera"),
        ),
        Template::new(
            TMPL_TEST_REPLICATION,
            "Tests replication flow from every master",
            "Waits SLEEP_TIME seconds, 3 by default, before checking",
            include_str!("replication/test_replication.tera"),
        ),
        Template::new(
            TMPL_WIPE_AND_RESTART_ALL,
            "Reinitializes and restarts all nodes",
            "",
            include_str!("replication/wipe_and_restart_all.tera"),
        ),
    ])
});

/// Group replication option blocks and scripts.
pub static GROUP_TEMPLATES: LazyLock<TemplateCollection> = LazyLock::new(|| {
    TemplateCollection::from([
        Template::new(
            TMPL_GROUP_REPL_OPTIONS,
            "Group replication configuration",
            "Up to 8.0.x",
            include_str!("group/group_replication_options.tera"),
        ),
        Template::new(
            TMPL_GROUP_REPL_OPTIONS84,
            "Group replication configuration for 8.4.x",
            "",
            include_str!("group/group_replication_options84.tera"),
        ),
        Template::new(TMPL_INIT_NODES, "Starts group replication", "", include_str!("group/init_nodes.tera")),
        Template::new(TMPL_CHECK_NODES, "Checks the status of group replication", "", include_str!("group/check_nodes.tera")),
    ])
});

/// Managed cluster option blocks and scripts.
pub static CLUSTER_TEMPLATES: LazyLock<TemplateCollection> = LazyLock::new(|| {
    TemplateCollection::from([
        Template::new(
            TMPL_CLUSTER_OPTIONS,
            "Set the correct my.cnf configurations",
            "",
            include_str!("cluster/cluster_options.tera"),
        ),
        Template::new(
            TMPL_CLUSTER_OPTIONS84,
            "Set the correct my.cnf configurations for 8.4.x",
            "",
            include_str!("cluster/cluster_options84.tera"),
        ),
        Template::new(
            TMPL_INIT_CLUSTER_NODES,
            "Initialize InnoDB Cluster nodes using the cluster shell",
            "",
            include_str!("cluster/init_cluster_nodes.tera"),
        ),
        Template::new(
            TMPL_CHECK_CLUSTER,
            "Checks the status of the cluster",
            "",
            include_str!("cluster/check_cluster.tera"),
        ),
    ])
});

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
