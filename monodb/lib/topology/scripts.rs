//! Control scripts of a multi-node sandbox.

use std::path::{Path, PathBuf};

use crate::{
    config::TopologyKind,
    templates::{
        write_script, write_scripts, MultiNodeData, ScriptBatch, ScriptDef, CLUSTER_TEMPLATES,
        GROUP_TEMPLATES, MULTIPLE_TEMPLATES, REPLICATION_TEMPLATES, TMPL_CHECK_CLUSTER,
        TMPL_CHECK_NODES, TMPL_CLEAR_MULTI, TMPL_EXEC_MASTERS, TMPL_EXEC_MULTI, TMPL_EXEC_SLAVES,
        TMPL_INIT_CLUSTER_NODES, TMPL_INIT_NODES, TMPL_METADATA_MULTI, TMPL_NODE, TMPL_NODE_ADMIN,
        TMPL_RESTART_MULTI, TMPL_SEND_KILL_MULTI, TMPL_START_MULTI, TMPL_STATUS_MULTI,
        TMPL_STOP_MULTI, TMPL_TEST_REPLICATION, TMPL_TEST_SB_MULTI, TMPL_USE_MASTERS,
        TMPL_USE_MULTI, TMPL_USE_MULTI_ADMIN, TMPL_USE_SLAVES, TMPL_WIPE_AND_RESTART_ALL,
    },
    MonodbResult,
};

use super::RoleScriptNames;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Starts every node.
pub const SCRIPT_START_ALL: &str = "start_all";

/// Restarts every node.
pub const SCRIPT_RESTART_ALL: &str = "restart_all";

/// Reports every node.
pub const SCRIPT_STATUS_ALL: &str = "status_all";

/// Tests every node.
pub const SCRIPT_TEST_SB_ALL: &str = "test_sb_all";

/// Stops every node.
pub const SCRIPT_STOP_ALL: &str = "stop_all";

/// Removes the data of every node.
pub const SCRIPT_CLEAR_ALL: &str = "clear_all";

/// Kills every node.
pub const SCRIPT_SEND_KILL_ALL: &str = "send_kill_all";

/// Runs a query on every node.
pub const SCRIPT_USE_ALL: &str = "use_all";

/// Runs a query on every node through the admin port.
pub const SCRIPT_USE_ALL_ADMIN: &str = "use_all_admin";

/// Prints one piece of metadata of every node.
pub const SCRIPT_METADATA_ALL: &str = "metadata_all";

/// Runs a command in every node directory.
pub const SCRIPT_EXEC_ALL: &str = "exec_all";

/// Checks that writes on the primaries reach every node.
pub const SCRIPT_TEST_REPLICATION: &str = "test_replication";

/// Reinitializes and restarts every node.
pub const SCRIPT_WIPE_AND_RESTART_ALL: &str = "wipe_and_restart_all";

/// Forms the group or cluster.
pub const SCRIPT_INITIALIZE_NODES: &str = "initialize_nodes";

/// Lists the group members.
pub const SCRIPT_CHECK_NODES: &str = "check_nodes";

/// Prints the cluster status.
pub const SCRIPT_CHECK_CLUSTER: &str = "check_cluster";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Renders every control script of a sandbox into `sandbox_dir`.
///
/// Stops at the first failure. Returns the written paths.
pub async fn render_control_scripts(
    sandbox_dir: &Path,
    topology: TopologyKind,
    data: &MultiNodeData,
    role_names: &RoleScriptNames,
    with_admin: bool,
) -> MonodbResult<Vec<PathBuf>> {
    let multiple = ScriptBatch {
        collection: &MULTIPLE_TEMPLATES,
        data,
        sandbox_dir,
        scripts: vec![
            ScriptDef::executable(SCRIPT_START_ALL, TMPL_START_MULTI),
            ScriptDef::executable(SCRIPT_RESTART_ALL, TMPL_RESTART_MULTI),
            ScriptDef::executable(SCRIPT_STATUS_ALL, TMPL_STATUS_MULTI),
            ScriptDef::executable(SCRIPT_TEST_SB_ALL, TMPL_TEST_SB_MULTI),
            ScriptDef::executable(SCRIPT_STOP_ALL, TMPL_STOP_MULTI),
            ScriptDef::executable(SCRIPT_CLEAR_ALL, TMPL_CLEAR_MULTI),
            ScriptDef::executable(SCRIPT_SEND_KILL_ALL, TMPL_SEND_KILL_MULTI),
            ScriptDef::executable(SCRIPT_USE_ALL, TMPL_USE_MULTI),
            ScriptDef::executable(SCRIPT_METADATA_ALL, TMPL_METADATA_MULTI),
            ScriptDef::executable(SCRIPT_EXEC_ALL, TMPL_EXEC_MULTI),
        ],
    };

    let replication = ScriptBatch {
        collection: &REPLICATION_TEMPLATES,
        data,
        sandbox_dir,
        scripts: vec![
            ScriptDef::executable(&role_names.use_all_slaves, TMPL_USE_SLAVES),
            ScriptDef::executable(&role_names.use_all_masters, TMPL_USE_MASTERS),
            ScriptDef::executable(&role_names.exec_all_masters, TMPL_EXEC_MASTERS),
            ScriptDef::executable(&role_names.exec_all_slaves, TMPL_EXEC_SLAVES),
            ScriptDef::executable(SCRIPT_TEST_REPLICATION, TMPL_TEST_REPLICATION),
            ScriptDef::executable(SCRIPT_WIPE_AND_RESTART_ALL, TMPL_WIPE_AND_RESTART_ALL),
        ],
    };

    let membership = match topology {
        TopologyKind::GroupReplication => ScriptBatch {
            collection: &GROUP_TEMPLATES,
            data,
            sandbox_dir,
            scripts: vec![
                ScriptDef::executable(SCRIPT_INITIALIZE_NODES, TMPL_INIT_NODES),
                ScriptDef::executable(SCRIPT_CHECK_NODES, TMPL_CHECK_NODES),
            ],
        },
        TopologyKind::InnodbCluster => ScriptBatch {
            collection: &CLUSTER_TEMPLATES,
            data,
            sandbox_dir,
            scripts: vec![
                ScriptDef::executable(SCRIPT_INITIALIZE_NODES, TMPL_INIT_CLUSTER_NODES),
                ScriptDef::executable(SCRIPT_CHECK_CLUSTER, TMPL_CHECK_CLUSTER),
            ],
        },
    };

    let mut written = Vec::new();
    for batch in [&multiple, &replication, &membership] {
        written.extend(write_scripts(batch).await?);
    }

    for node in &data.nodes {
        let name = format!("n{}", node.node);
        written.push(write_script(&MULTIPLE_TEMPLATES, &name, TMPL_NODE, sandbox_dir, node, true).await?);

        if with_admin {
            let name = format!("na{}", node.node);
            written.push(
                write_script(&MULTIPLE_TEMPLATES, &name, TMPL_NODE_ADMIN, sandbox_dir, node, true).await?,
            );
        }
    }

    if with_admin {
        tracing::debug!("creating admin script for all nodes");
        written.push(
            write_script(&MULTIPLE_TEMPLATES, SCRIPT_USE_ALL_ADMIN, TMPL_USE_MULTI_ADMIN, sandbox_dir, data, true)
                .await?,
        );
    }

    Ok(written)
}
