use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use crate::{
    catalog::{write_description, SandboxDescription},
    execution::{CommandSpec, ExecutionItem, ExecutionList},
    templates::{
        write_scripts, NodeConfigData, ScriptBatch, ScriptDef, ScriptHeader, SINGLE_TEMPLATES,
        TMPL_CLEAR, TMPL_INIT_DB, TMPL_LOAD_GRANTS, TMPL_MY_CNF, TMPL_RESTART, TMPL_SEND_KILL,
        TMPL_START, TMPL_STATUS, TMPL_STOP, TMPL_TEST_SB, TMPL_USE, TMPL_USE_ADMIN,
    },
    topology::NodeDefinition,
    utils::{NODE_CONFIG_FILENAME, NODE_DATA_SUBDIR, NODE_TMP_SUBDIR},
    MonodbResult,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Band of the data directory initialization.
pub const PRIORITY_INIT_DB: u32 = 1;

/// Band of the server start.
pub const PRIORITY_START: u32 = 2;

/// Band of the user creation.
pub const PRIORITY_LOAD_GRANTS: u32 = 3;

/// Initializes the data directory.
pub const NODE_SCRIPT_INIT_DB: &str = "init_db";

/// Starts the node.
pub const NODE_SCRIPT_START: &str = "start";

/// Creates the sandbox users.
pub const NODE_SCRIPT_LOAD_GRANTS: &str = "load_grants";

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Builds a single node and returns the work needed to bring it up.
///
/// The returned actions are scheduled together with those of every other node, so creating a
/// node must not start it.
#[async_trait]
pub trait NodeCreator: Send + Sync {
    /// Creates the node described by `node`.
    async fn create_node(&self, node: &NodeDefinition) -> MonodbResult<ExecutionList>;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Creates nodes as directories with a configuration file and control scripts.
#[derive(Debug, Clone, Default)]
pub struct LocalNodeCreator;

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl LocalNodeCreator {
    fn config_data(node: &NodeDefinition) -> NodeConfigData {
        let record = &node.record;
        let port = *record.get_data_port();

        NodeConfigData {
            header: ScriptHeader::now(&node.shell_path),
            prompt: record.get_label().clone(),
            os_user: std::env::var("USER").unwrap_or_else(|_| "mysql".to_string()),
            basedir: node.basedir.display().to_string(),
            sandbox_dir: node.node_dir.display().to_string(),
            datadir: node.node_dir.join(NODE_DATA_SUBDIR).display().to_string(),
            tmpdir: node.node_dir.join(NODE_TMP_SUBDIR).display().to_string(),
            port,
            server_id: *record.get_server_id(),
            socket_file: format!("/tmp/mysql_sandbox{}.sock", port),
            bind_address: node.master_ip.clone(),
            db_user: node.db_user.clone(),
            db_password: node.db_password.clone(),
            db_host: account_host(&node.master_ip),
            rpl_user: node.rpl_user.clone(),
            rpl_password: node.rpl_password.clone(),
            mysqlx_port: *record.get_mysqlx_port(),
            admin_port: *record.get_admin_port(),
            repl_options: node.repl_options.clone(),
        }
    }

    fn scripts(node: &NodeDefinition) -> Vec<ScriptDef> {
        let mut scripts = vec![
            ScriptDef::plain(NODE_CONFIG_FILENAME, TMPL_MY_CNF),
            ScriptDef::executable(NODE_SCRIPT_INIT_DB, TMPL_INIT_DB),
            ScriptDef::executable(NODE_SCRIPT_START, TMPL_START),
            ScriptDef::executable("stop", TMPL_STOP),
            ScriptDef::executable("status", TMPL_STATUS),
            ScriptDef::executable("restart", TMPL_RESTART),
            ScriptDef::executable("send_kill", TMPL_SEND_KILL),
            ScriptDef::executable("clear", TMPL_CLEAR),
            ScriptDef::executable("use", TMPL_USE),
            ScriptDef::executable(NODE_SCRIPT_LOAD_GRANTS, TMPL_LOAD_GRANTS),
            ScriptDef::executable("test_sb", TMPL_TEST_SB),
        ];

        if node.record.get_admin_port().is_some() {
            scripts.push(ScriptDef::executable("use_admin", TMPL_USE_ADMIN));
        }

        scripts
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// The host part of the sandbox accounts for nodes listening on `ip`.
fn account_host(ip: &str) -> String {
    if ip.starts_with("127.") {
        "127.%".to_string()
    } else {
        "%".to_string()
    }
}

fn node_command(priority: u32, node_dir: &Path, script: &str, label: &str) -> ExecutionItem {
    let spec = CommandSpec::builder()
        .program(node_dir.join(script))
        .current_dir(node_dir)
        .build();

    ExecutionItem::command(priority, format!("{} {}", script, label), spec)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl NodeCreator for LocalNodeCreator {
    async fn create_node(&self, node: &NodeDefinition) -> MonodbResult<ExecutionList> {
        let record = &node.record;
        let node_dir = &node.node_dir;
        tracing::debug!("creating {} in {}", record.get_label(), node_dir.display());

        // Create the node directory
        fs::create_dir_all(node_dir.join(NODE_TMP_SUBDIR)).await?;

        // Write the configuration and scripts
        let data = Self::config_data(node);
        let batch = ScriptBatch {
            collection: &SINGLE_TEMPLATES,
            data: &data,
            sandbox_dir: node_dir,
            scripts: Self::scripts(node),
        };
        write_scripts(&batch).await?;

        let description = SandboxDescription {
            basedir: node.basedir.clone(),
            sandbox_type: node.sandbox_type.clone(),
            version: node.version.clone(),
            flavor: node.flavor,
            port: [
                Some(*record.get_data_port()),
                Some(*record.get_group_port()),
                *record.get_mysqlx_port(),
                *record.get_admin_port(),
            ]
            .into_iter()
            .flatten()
            .collect(),
            nodes: 0,
            node_num: *record.get_ordinal(),
            log_file: None,
        };
        write_description(node_dir, &description).await?;

        // Defer the work that needs a running server
        let label = record.get_label();
        let mut list = vec![node_command(PRIORITY_INIT_DB, node_dir, NODE_SCRIPT_INIT_DB, label)];
        if !node.skip_start {
            list.push(node_command(PRIORITY_START, node_dir, NODE_SCRIPT_START, label));
            if node.load_grants {
                list.push(node_command(
                    PRIORITY_LOAD_GRANTS,
                    node_dir,
                    NODE_SCRIPT_LOAD_GRANTS,
                    label,
                ));
            }
        }

        Ok(list)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
