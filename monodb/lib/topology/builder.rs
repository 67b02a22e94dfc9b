use std::{
    path::Path,
    sync::{Arc, LazyLock},
};

use regex::{NoExpand, Regex};
use scopeguard::ScopeGuard;
use semver::Version;
use tokio::fs;
use typed_builder::TypedBuilder;

use crate::{
    catalog::{write_description, SandboxCatalog, SandboxCatalogItem, SandboxDescription},
    config::{
        uses_legacy_options, Capability, CapabilityQuery, CapabilityTable, MonodbConfig,
        SandboxDefinition, TopologyKind, DEFAULT_CLUSTER_NAME,
    },
    execution::{ExecutionList, Scheduler},
    management::{remove_sandbox, CommandRunner, LocalNodeCreator, NodeCreator, ShellRunner},
    ports::{HostPortProbe, PortProbe},
    templates::{
        fill_template, MultiNodeData, NodeScriptData, ReplicationOptionsData, ScriptHeader,
        CLUSTER_TEMPLATES, GROUP_TEMPLATES, SINGLE_TEMPLATES, TMPL_CLUSTER_OPTIONS,
        TMPL_CLUSTER_OPTIONS84, TMPL_GROUP_REPL_OPTIONS, TMPL_GROUP_REPL_OPTIONS84,
        TMPL_GTID_OPTIONS, TMPL_REPLICATION_OPTIONS, TMPL_REPL_CRASH_SAFE_OPTIONS,
        TMPL_REPL_CRASH_SAFE_OPTIONS84,
    },
    MonodbError, MonodbResult, ProvisionStep,
};

use super::{
    allocate_ports, connection_string, derive_base_port, node_dir_name, render_control_scripts,
    server_id, stop_node_list, validate, NodeDefinition, NodeRecord, PortPlan, PortRequest,
    RoleLists, RoleScriptNames, SCRIPT_INITIALIZE_NODES,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The loopback address in rendered options, rewritten to the master IP.
static LOOPBACK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"127\.0\.0\.1").unwrap());

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Provisions multi-node membership sandboxes.
///
/// The builder owns no state of its own beyond its collaborators, so one instance can serve any
/// number of sequential runs.
#[derive(TypedBuilder)]
pub struct TopologyBuilder {
    /// Host-wide settings.
    #[builder(default)]
    config: MonodbConfig,

    /// The registry of installed sandboxes.
    catalog: SandboxCatalog,

    /// Builds each node.
    #[builder(default = Arc::new(LocalNodeCreator))]
    node_creator: Arc<dyn NodeCreator>,

    /// Runs the bootstrap script.
    #[builder(default = Arc::new(ShellRunner))]
    runner: Arc<dyn CommandRunner>,

    /// Decides what a version supports.
    #[builder(default = Arc::new(CapabilityTable))]
    capabilities: Arc<dyn CapabilityQuery>,

    /// Tells which host ports are taken.
    #[builder(default = Arc::new(HostPortProbe))]
    probe: Arc<dyn PortProbe>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl TopologyBuilder {
    /// Provisions the sandbox described by `definition` and returns its committed description.
    ///
    /// Nothing is created before validation and port allocation succeed. Once the destination
    /// exists, any failure up to writing the description removes it again. A failure to update
    /// the catalog afterwards is reported as [`MonodbError::CatalogWrite`] and leaves the
    /// sandbox in place.
    pub async fn provision(&self, mut definition: SandboxDefinition) -> MonodbResult<SandboxDescription> {
        let topology = definition.topology;
        let sandbox_dir = definition.sandbox_dir.clone();
        tracing::info!("provisioning {} in {}", topology, sandbox_dir.display());

        // Validate the request
        let version = validate(&definition, &*self.capabilities)
            .await
            .map_err(|e| e.at(ProvisionStep::Validate))?;

        let exists = fs::try_exists(&sandbox_dir)
            .await
            .map_err(|e| MonodbError::from(e).at(ProvisionStep::Validate))?;
        if definition.force && exists {
            tracing::info!("replacing existing sandbox {}", sandbox_dir.display());
            remove_sandbox(&sandbox_dir, &self.catalog, &*self.runner)
                .await
                .map_err(|e| e.at(ProvisionStep::Validate))?;
        }

        // Allocate every port before touching the filesystem
        let plan = self
            .allocate(&definition, &version)
            .await
            .map_err(|e| e.at(ProvisionStep::AllocatePorts))?;
        definition.base_port = Some(plan.base_port);

        // Reserve the destination
        reserve_directory(&sandbox_dir)
            .await
            .map_err(|e| e.at(ProvisionStep::ReserveDirectory))?;
        let cleanup = scopeguard::guard(sandbox_dir.clone(), |dir| {
            tracing::warn!("provisioning failed, removing {}", dir.display());
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                tracing::error!("error removing {}: {}", dir.display(), e);
            }
        });

        let (description, item) = self.build(&definition, &version, &plan).await?;

        // Commit
        write_description(&sandbox_dir, &description)
            .await
            .map_err(|e| e.at(ProvisionStep::Commit))?;
        ScopeGuard::into_inner(cleanup);

        self.catalog.update(&sandbox_dir, item).await?;
        tracing::info!("{} installed in {}", topology, sandbox_dir.display());

        Ok(description)
    }

    async fn allocate(&self, definition: &SandboxDefinition, version: &Version) -> MonodbResult<PortPlan> {
        let mut reserved = self.catalog.installed_ports().await?;
        reserved.extend(definition.installed_ports.iter().copied());

        let flavor = definition.flavor;
        let with_mysqlx = (self.capabilities.supports(flavor, Capability::MysqlXDefault, version)
            || definition.enable_mysqlx)
            && !definition.disable_mysqlx;

        let with_admin = definition.enable_admin_address
            && self.capabilities.supports(flavor, Capability::AdminAddress, version);
        if definition.enable_admin_address && !with_admin {
            tracing::warn!("admin address is not supported by {} {}, skipping", flavor, version);
        }

        let base = derive_base_port(definition, version, &self.config);
        let request = PortRequest::new(base, definition.nodes, &self.config, with_mysqlx, with_admin);

        Ok(allocate_ports(&request, &mut reserved, &*self.probe, &definition.sandbox_dir)?)
    }

    /// Runs the steps between reserving the directory and committing.
    async fn build(
        &self,
        definition: &SandboxDefinition,
        version: &Version,
        plan: &PortPlan,
    ) -> MonodbResult<(SandboxDescription, SandboxCatalogItem)> {
        let topology = definition.topology;
        let nodes = definition.nodes;
        let sandbox_dir = &definition.sandbox_dir;

        // Roles and the values shared by every node
        let roles = RoleLists::new(nodes, definition.single_primary);
        if !roles.is_partition_of(nodes) {
            return Err(MonodbError::custom(anyhow::anyhow!(
                "node roles {:?} and {:?} do not cover {} nodes",
                roles.masters,
                roles.slaves,
                nodes
            ))
            .at(ProvisionStep::ConstructNodes));
        }
        let peer_string = connection_string(&definition.master_ip, plan.group.ports());
        tracing::debug!("peer string {}", peer_string);

        let node_prefix = self.config.get_node_prefix();
        let records: Vec<NodeRecord> = (1..=nodes)
            .map(|ordinal| {
                let label = node_dir_name(node_prefix, ordinal);
                NodeRecord {
                    ordinal,
                    data_port: plan.data.port(ordinal),
                    group_port: plan.group.port(ordinal),
                    mysqlx_port: plan.mysqlx.map(|block| block.port(ordinal)),
                    admin_port: plan.admin.map(|block| block.port(ordinal)),
                    dir_name: label.clone(),
                    label,
                    server_id: server_id(definition.base_server_id, ordinal),
                    peer_string: peer_string.clone(),
                    role: roles.role_of(ordinal),
                }
            })
            .collect();

        // Build every node
        let mut execution_list = ExecutionList::new();
        for record in &records {
            let ordinal = record.ordinal;
            let node = self
                .node_definition(definition, version, plan, record)
                .map_err(|e| e.at(ProvisionStep::ConstructNodes))?;

            tracing::info!("creating {} {}", node_prefix, ordinal);
            let list = self.node_creator.create_node(&node).await.map_err(|e| {
                MonodbError::NodeConstruction {
                    node: ordinal,
                    source: Box::new(e),
                }
                .at(ProvisionStep::ConstructNodes)
            })?;

            execution_list.extend(list);
        }

        // Write the control scripts
        let data = self.multi_node_data(definition, version, &roles, &records);
        let role_names = RoleScriptNames::new(self.config.get_master_name(), self.config.get_slave_prefix());
        render_control_scripts(sandbox_dir, topology, &data, &role_names, plan.admin.is_some())
            .await
            .map_err(|e| e.at(ProvisionStep::RenderScripts))?;

        // Run the deferred node work
        let scheduler = if definition.run_concurrently {
            Scheduler::new(nodes)
        } else {
            Scheduler::sequential()
        };
        scheduler
            .run(execution_list)
            .await
            .map_err(|e| MonodbError::from(e).at(ProvisionStep::Schedule))?;

        // Form the group
        if !definition.skip_start {
            self.runner
                .run(&sandbox_dir.join(SCRIPT_INITIALIZE_NODES))
                .await
                .map_err(|e| e.at(ProvisionStep::Bootstrap))?;
        }

        Ok(self.commit_records(definition, plan, &records))
    }

    fn node_definition(
        &self,
        definition: &SandboxDefinition,
        version: &Version,
        plan: &PortPlan,
        record: &NodeRecord,
    ) -> MonodbResult<NodeDefinition> {
        let repl_options = self.replication_options(definition, version, plan, record)?;
        let sandbox_type = match definition.topology {
            TopologyKind::GroupReplication => "group-node",
            TopologyKind::InnodbCluster => "cluster-node",
        };

        Ok(NodeDefinition {
            record: record.clone(),
            version: definition.version.clone(),
            flavor: definition.flavor,
            basedir: definition.basedir.clone(),
            sandbox_dir: definition.sandbox_dir.clone(),
            node_dir: definition.sandbox_dir.join(&record.dir_name),
            sandbox_type: sandbox_type.to_string(),
            db_user: definition.db_user.clone(),
            db_password: definition.db_password.clone(),
            rpl_user: definition.rpl_user.clone(),
            rpl_password: definition.rpl_password.clone(),
            master_ip: definition.master_ip.clone(),
            shell_path: definition.shell_path.clone(),
            repl_options,
            skip_start: definition.skip_start,
            load_grants: true,
        })
    }

    /// Renders the option blocks appended to a node's configuration.
    fn replication_options(
        &self,
        definition: &SandboxDefinition,
        version: &Version,
        plan: &PortPlan,
        record: &NodeRecord,
    ) -> MonodbResult<String> {
        let legacy = uses_legacy_options(version);
        let (collection, options_template) = match (definition.topology, legacy) {
            (TopologyKind::GroupReplication, true) => (&*GROUP_TEMPLATES, TMPL_GROUP_REPL_OPTIONS),
            (TopologyKind::GroupReplication, false) => (&*GROUP_TEMPLATES, TMPL_GROUP_REPL_OPTIONS84),
            (TopologyKind::InnodbCluster, true) => (&*CLUSTER_TEMPLATES, TMPL_CLUSTER_OPTIONS),
            (TopologyKind::InnodbCluster, false) => (&*CLUSTER_TEMPLATES, TMPL_CLUSTER_OPTIONS84),
        };

        let data = ReplicationOptionsData::new(
            plan.base_port,
            &record.peer_string,
            format!("{}:{}", definition.master_ip, record.group_port),
            definition.single_primary,
        );

        let basic = fill_template(&SINGLE_TEMPLATES, TMPL_REPLICATION_OPTIONS, &data)?;
        let membership = fill_template(collection, options_template, &data)?;
        let options = format!("{}\n{}", basic, membership);
        let mut options = LOOPBACK_REGEX
            .replace_all(&options, NoExpand(&definition.master_ip))
            .into_owned();

        let crash_safe = if legacy {
            TMPL_REPL_CRASH_SAFE_OPTIONS
        } else {
            TMPL_REPL_CRASH_SAFE_OPTIONS84
        };
        for block in [TMPL_GTID_OPTIONS, crash_safe] {
            options.push('\n');
            options.push_str(&fill_template(&SINGLE_TEMPLATES, block, &data)?);
            options.push('\n');
        }

        Ok(options)
    }

    fn multi_node_data(
        &self,
        definition: &SandboxDefinition,
        version: &Version,
        roles: &RoleLists,
        records: &[NodeRecord],
    ) -> MultiNodeData {
        let header = ScriptHeader::now(&definition.shell_path);
        let sandbox_dir = definition.sandbox_dir.display().to_string();
        let node_label = self.config.get_node_prefix().clone();

        let nodes = records
            .iter()
            .map(|record| NodeScriptData {
                header: header.clone(),
                node: record.ordinal,
                node_port: record.data_port,
                group_port: record.group_port,
                mysqlx_port: record.mysqlx_port,
                admin_port: record.admin_port,
                node_label: node_label.clone(),
                sandbox_dir: sandbox_dir.clone(),
            })
            .collect();

        MultiNodeData {
            header,
            cluster_shell_path: definition.cluster_shell_path.clone(),
            sandbox_dir,
            master_ip: definition.master_ip.clone(),
            master_list: roles.master_list(),
            slave_list: roles.slave_list(),
            stop_node_list: stop_node_list(definition.nodes),
            node_label,
            master_label: self.config.get_master_name().clone(),
            master_abbr: self.config.get_master_abbr().clone(),
            slave_label: self.config.get_slave_prefix().clone(),
            slave_abbr: self.config.get_slave_abbr().clone(),
            db_user: definition.db_user.clone(),
            db_password: definition.db_password.clone(),
            rpl_user: definition.rpl_user.clone(),
            rpl_password: definition.rpl_password.clone(),
            single_primary: definition.single_primary,
            source_replica_terminology: self.capabilities.supports(
                definition.flavor,
                Capability::SourceReplicaTerminology,
                version,
            ),
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            primary_port: records.first().map(|r| r.data_port).unwrap_or_default(),
            nodes,
        }
    }

    fn commit_records(
        &self,
        definition: &SandboxDefinition,
        plan: &PortPlan,
        records: &[NodeRecord],
    ) -> (SandboxDescription, SandboxCatalogItem) {
        let sandbox_type = definition
            .topology
            .sandbox_type(definition.single_primary)
            .to_string();
        let ports = plan.all_ports();

        let description = SandboxDescription {
            basedir: definition.basedir.clone(),
            sandbox_type: sandbox_type.clone(),
            version: definition.version.clone(),
            flavor: definition.flavor,
            port: ports.clone(),
            nodes: definition.nodes,
            node_num: 0,
            log_file: definition.log_file.clone(),
        };

        let item = SandboxCatalogItem {
            origin: definition.basedir.clone(),
            sandbox_type,
            version: definition.version.clone(),
            flavor: definition.flavor,
            port: ports,
            nodes: records.iter().map(|r| r.dir_name.clone()).collect(),
            destination: definition.sandbox_dir.clone(),
            log_directory: definition
                .log_file
                .as_ref()
                .and_then(|f| f.parent())
                .map(Path::to_path_buf),
        };

        (description, item)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

async fn reserve_directory(sandbox_dir: &Path) -> MonodbResult<()> {
    if let Some(parent) = sandbox_dir.parent() {
        fs::create_dir_all(parent).await?;
    }

    fs::create_dir(sandbox_dir).await?;
    tracing::debug!("created directory {}", sandbox_dir.display());

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::parse_version,
        topology::{NodeRole, PortBlock},
    };

    fn plan() -> PortPlan {
        PortPlan {
            base_port: 20000,
            data: PortBlock { first: 20001, count: 3 },
            group: PortBlock { first: 20126, count: 3 },
            mysqlx: None,
            admin: None,
        }
    }

    fn record(master_ip: &str) -> NodeRecord {
        NodeRecord {
            ordinal: 2,
            data_port: 20002,
            group_port: 20127,
            mysqlx_port: None,
            admin_port: None,
            label: "node2".to_string(),
            dir_name: "node2".to_string(),
            server_id: 200,
            peer_string: connection_string(master_ip, plan().group.ports()),
            role: NodeRole::Primary,
        }
    }

    fn builder() -> TopologyBuilder {
        TopologyBuilder::builder()
            .catalog(SandboxCatalog::new("/nonexistent/sandboxes.json"))
            .build()
    }

    #[test]
    fn test_replication_options_rewrite_loopback() -> anyhow::Result<()> {
        let definition = SandboxDefinition::builder()
            .version("8.0.35")
            .basedir("/opt/mysql/8.0.35")
            .sandbox_dir("/tmp/group")
            .topology(TopologyKind::GroupReplication)
            .master_ip("192.168.1.10")
            .build();
        let version = parse_version("8.0.35")?;

        let options =
            builder().replication_options(&definition, &version, &plan(), &record("192.168.1.10"))?;

        assert!(!options.contains("127.0.0.1"));
        assert!(options.contains("report-host=192.168.1.10"));
        assert!(options.contains("loose-group-replication-local-address=192.168.1.10:20127"));
        assert!(options.contains("aaaaaaaa-aaaa-aaaa-aaaa-aaaa00020000"));
        assert!(options.contains("log_slave_updates=ON"));
        assert!(options.contains("gtid_mode=ON"));
        assert!(options.contains("master-info-repository=table"));

        Ok(())
    }

    #[test]
    fn test_replication_options_follow_version_family() -> anyhow::Result<()> {
        let definition = SandboxDefinition::builder()
            .version("8.4.0")
            .basedir("/opt/mysql/8.4.0")
            .sandbox_dir("/tmp/cluster")
            .topology(TopologyKind::InnodbCluster)
            .build();
        let version = parse_version("8.4.0")?;

        let options =
            builder().replication_options(&definition, &version, &plan(), &record("127.0.0.1"))?;

        assert!(options.contains("# InnoDB Cluster options"));
        assert!(options.contains("log_replica_updates=ON"));
        assert!(options.contains("relay-log-recovery=on"));
        assert!(!options.contains("master-info-repository"));

        Ok(())
    }
}
