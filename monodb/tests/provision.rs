use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use monodb::{
    catalog::{read_description, SandboxCatalog},
    config::{SandboxDefinition, TopologyKind},
    execution::{ExecutionItem, ExecutionList},
    management::{CommandRunner, NodeCreator},
    topology::{NodeDefinition, NodeRole, TopologyBuilder, SCRIPT_INITIALIZE_NODES},
    MonodbError, MonodbResult, PortAllocationError, ProvisionStep, ValidationError,
};
use tempfile::TempDir;
use test_log::test;

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[test(tokio::test)]
async fn test_single_primary_group_at_base_20000() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let creator = Arc::new(RecordingCreator::default());
    let runner = Arc::new(RecordingRunner::default());
    let builder = env.builder(creator.clone(), runner.clone(), |_: u16| false);

    let mut definition = env.definition(TopologyKind::GroupReplication, 3);
    definition.single_primary = true;
    definition.base_port = Some(20000);

    let description = builder.provision(definition).await?;

    // Ports grouped by node: data, group, mysqlx
    assert_eq!(
        description.port,
        vec![20001, 20126, 30001, 20002, 20127, 30002, 20003, 20128, 30003]
    );
    assert_eq!(description.sandbox_type, "group-single-primary");
    assert_eq!(description.nodes, 3);

    // Roles and options of every node
    let nodes = creator.nodes();
    assert_eq!(nodes.len(), 3);
    let roles: Vec<NodeRole> = nodes.iter().map(|n| *n.record.get_role()).collect();
    assert_eq!(
        roles,
        vec![NodeRole::Primary, NodeRole::Secondary, NodeRole::Secondary]
    );
    for (i, node) in nodes.iter().enumerate() {
        assert_eq!(*node.record.get_data_port(), 20001 + i as u16);
        assert_eq!(*node.record.get_group_port(), 20126 + i as u16);
        assert_eq!(node.sandbox_type, "group-node");
        assert!(node
            .repl_options
            .contains("loose-group-replication-single-primary-mode=ON"));
        assert!(node.repl_options.contains(&format!(
            "loose-group-replication-local-address=127.0.0.1:{}",
            20126 + i
        )));
    }

    // Control scripts
    for script in [
        "start_all",
        "stop_all",
        "use_all",
        "use_all_masters",
        "use_all_slaves",
        "exec_all_masters",
        "exec_all_slaves",
        "initialize_nodes",
        "check_nodes",
        "metadata_all",
        "test_replication",
        "n1",
        "n2",
        "n3",
    ] {
        assert!(env.sandbox_dir().join(script).exists(), "missing {}", script);
    }
    assert!(!env.sandbox_dir().join("use_all_admin").exists());

    let metadata = std::fs::read_to_string(env.sandbox_dir().join("metadata_all"))?;
    assert!(metadata.contains("port) value=20002 ;;"));
    assert!(metadata.contains("mysqlx_port) value=30003 ;;"));
    let sanity = std::fs::read_to_string(env.sandbox_dir().join("test_replication"))?;
    assert!(sanity.contains("for N in 1\n"));

    // Bootstrap and scheduled actions
    assert_eq!(
        runner.scripts(),
        vec![env.sandbox_dir().join(SCRIPT_INITIALIZE_NODES)]
    );
    assert_eq!(creator.executed(), 3);

    // Commit
    assert_eq!(read_description(env.sandbox_dir()).await?, description);
    let item = env
        .catalog()
        .get(env.sandbox_dir())
        .await?
        .expect("catalog entry");
    assert_eq!(item.port, description.port);
    assert_eq!(item.nodes, vec!["node1", "node2", "node3"]);

    Ok(())
}

#[test(tokio::test)]
async fn test_peer_string_is_shared_by_every_node() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let creator = Arc::new(RecordingCreator::default());
    let builder = env.builder(creator.clone(), Arc::new(RecordingRunner::default()), |_: u16| false);

    let mut definition = env.definition(TopologyKind::InnodbCluster, 5);
    definition.base_port = Some(21000);
    definition.skip_start = true;
    builder.provision(definition).await?;

    let nodes = creator.nodes();
    assert_eq!(nodes.len(), 5);

    let peers = nodes[0].record.get_peer_string().clone();
    assert_eq!(peers.split(',').count(), 5);
    assert_eq!(
        peers,
        "127.0.0.1:21126,127.0.0.1:21127,127.0.0.1:21128,127.0.0.1:21129,127.0.0.1:21130"
    );
    for node in &nodes {
        assert_eq!(node.record.get_peer_string(), &peers);
        assert!(node
            .repl_options
            .contains(&format!("loose-group-replication-group-seeds={}", peers)));
        assert_eq!(node.sandbox_type, "cluster-node");
    }

    // Multi-primary clusters have no secondaries
    assert!(nodes
        .iter()
        .all(|node| *node.record.get_role() == NodeRole::Primary));
    assert!(env.sandbox_dir().join("check_cluster").exists());

    Ok(())
}

#[test(tokio::test)]
async fn test_two_nodes_are_rejected_before_any_side_effect() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let creator = Arc::new(RecordingCreator::default());
    let builder = env.builder(creator.clone(), Arc::new(RecordingRunner::default()), |_: u16| false);

    let definition = env.definition(TopologyKind::GroupReplication, 2);
    let err = builder.provision(definition).await.unwrap_err();

    assert_eq!(err.step(), Some(ProvisionStep::Validate));
    assert!(matches!(
        err.root(),
        MonodbError::Validation(ValidationError::TooFewNodes { nodes: 2, minimum: 3, .. })
    ));
    assert!(!env.sandbox_dir().exists());
    assert!(creator.nodes().is_empty());
    assert!(env.catalog().read().await?.is_empty());

    Ok(())
}

#[test(tokio::test)]
async fn test_mysqlx_exhaustion_leaves_no_directory() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let builder = env.builder(
        Arc::new(RecordingCreator::default()),
        Arc::new(RecordingRunner::default()),
        |port: u16| port > 30000,
    );

    let mut definition = env.definition(TopologyKind::GroupReplication, 3);
    definition.base_port = Some(20000);
    let err = builder.provision(definition).await.unwrap_err();

    assert_eq!(err.step(), Some(ProvisionStep::AllocatePorts));
    assert!(matches!(
        err.root(),
        MonodbError::PortAllocation(PortAllocationError::BlockUnavailable { class, .. }) if class == "mysqlx"
    ));
    assert!(!env.sandbox_dir().exists());

    Ok(())
}

#[test(tokio::test)]
async fn test_failed_action_removes_the_directory() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let creator = Arc::new(RecordingCreator {
        fail_node: Some(2),
        ..Default::default()
    });
    let runner = Arc::new(RecordingRunner::default());
    let builder = env.builder(creator.clone(), runner.clone(), |_: u16| false);

    let mut definition = env.definition(TopologyKind::GroupReplication, 3);
    definition.base_port = Some(20000);
    let err = builder.provision(definition).await.unwrap_err();

    assert_eq!(err.step(), Some(ProvisionStep::Schedule));
    match err.root() {
        MonodbError::Scheduling(e) => {
            assert_eq!(e.priority, 2);
            assert_eq!(e.failures.len(), 1);
            assert_eq!(e.failures[0].label, "start node2");
        }
        other => panic!("unexpected error: {}", other),
    }

    assert!(!env.sandbox_dir().exists());
    assert!(runner.scripts().is_empty());
    assert!(env.catalog().get(env.sandbox_dir()).await?.is_none());

    Ok(())
}

#[test(tokio::test)]
async fn test_failed_node_construction_removes_the_directory() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let creator = Arc::new(RecordingCreator {
        fail_create: Some(2),
        ..Default::default()
    });
    let builder = env.builder(creator.clone(), Arc::new(RecordingRunner::default()), |_: u16| false);

    let mut definition = env.definition(TopologyKind::GroupReplication, 3);
    definition.base_port = Some(20000);
    let err = builder.provision(definition).await.unwrap_err();

    assert_eq!(err.step(), Some(ProvisionStep::ConstructNodes));
    assert!(matches!(err.root(), MonodbError::NodeConstruction { node: 2, .. }));
    assert_eq!(creator.nodes().len(), 1);
    assert_eq!(creator.executed(), 0);
    assert!(!env.sandbox_dir().exists());
    assert!(env.catalog().read().await?.is_empty());

    Ok(())
}

#[test(tokio::test)]
async fn test_failed_render_removes_the_directory() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    // A directory in place of a script makes the write fail.
    let creator = Arc::new(RecordingCreator {
        obstruct: Some(env.sandbox_dir().join("start_all")),
        ..Default::default()
    });
    let builder = env.builder(creator.clone(), Arc::new(RecordingRunner::default()), |_: u16| false);

    let mut definition = env.definition(TopologyKind::GroupReplication, 3);
    definition.base_port = Some(20000);
    let err = builder.provision(definition).await.unwrap_err();

    assert_eq!(err.step(), Some(ProvisionStep::RenderScripts));
    assert_eq!(creator.executed(), 0);
    assert!(!env.sandbox_dir().exists());
    assert!(env.catalog().read().await?.is_empty());

    Ok(())
}

#[test(tokio::test)]
async fn test_failed_bootstrap_removes_the_directory() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let creator = Arc::new(RecordingCreator::default());
    let runner = Arc::new(RecordingRunner {
        fail: true,
        ..Default::default()
    });
    let builder = env.builder(creator.clone(), runner.clone(), |_: u16| false);

    let mut definition = env.definition(TopologyKind::InnodbCluster, 3);
    definition.base_port = Some(20000);
    let err = builder.provision(definition).await.unwrap_err();

    assert_eq!(err.step(), Some(ProvisionStep::Bootstrap));
    assert!(matches!(err.root(), MonodbError::CommandFailed { .. }));
    assert_eq!(creator.executed(), 3);
    assert_eq!(runner.scripts().len(), 1);
    assert!(!env.sandbox_dir().exists());
    assert!(env.catalog().read().await?.is_empty());

    Ok(())
}

#[test(tokio::test)]
async fn test_catalog_failure_keeps_the_sandbox() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    // The catalog is readable during allocation and turns into a directory afterwards.
    let creator = Arc::new(RecordingCreator {
        obstruct: Some(env.catalog().path().to_path_buf()),
        ..Default::default()
    });
    let builder = env.builder(creator.clone(), Arc::new(RecordingRunner::default()), |_: u16| false);

    let mut definition = env.definition(TopologyKind::GroupReplication, 3);
    definition.base_port = Some(20000);
    let err = builder.provision(definition).await.unwrap_err();

    assert_eq!(err.step(), None);
    assert!(matches!(err, MonodbError::CatalogWrite { .. }));
    assert!(env.sandbox_dir().exists());
    let description = read_description(env.sandbox_dir()).await?;
    assert_eq!(description.port[0], 20001);

    Ok(())
}

#[test(tokio::test)]
async fn test_unreadable_destination_fails_validation() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let creator = Arc::new(RecordingCreator::default());
    let builder = env.builder(creator.clone(), Arc::new(RecordingRunner::default()), |_: u16| false);

    // With force the existence check happens after validation, and a NUL byte makes it fail.
    let mut definition = env.definition(TopologyKind::GroupReplication, 3);
    definition.force = true;
    definition.sandbox_dir = env.sandbox_home().join("bad\0dir");
    let err = builder.provision(definition).await.unwrap_err();

    assert_eq!(err.step(), Some(ProvisionStep::Validate));
    assert!(matches!(err.root(), MonodbError::Io(_)));
    assert!(creator.nodes().is_empty());
    assert!(!env.sandbox_home().exists());

    Ok(())
}

#[test(tokio::test)]
async fn test_installed_ports_are_not_reused() -> anyhow::Result<()> {
    let env = TestEnv::new()?;
    let builder = env.builder(
        Arc::new(RecordingCreator::default()),
        Arc::new(RecordingRunner::default()),
        |_: u16| false,
    );

    let mut first = env.definition(TopologyKind::GroupReplication, 3);
    first.base_port = Some(20000);
    first.skip_start = true;
    let first = builder.provision(first).await?;

    let mut second = env.definition(TopologyKind::GroupReplication, 3);
    second.base_port = Some(20000);
    second.skip_start = true;
    second.sandbox_dir = env.sandbox_home().join("second");
    let second = builder.provision(second).await?;

    assert_eq!(second.port[0], 20004);
    assert!(second.port.iter().all(|port| !first.port.contains(port)));
    assert_eq!(env.catalog().read().await?.len(), 2);

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Types: Helpers
//--------------------------------------------------------------------------------------------------

struct TestEnv {
    root: TempDir,
}

/// Records every node it is asked to create and returns one action per band.
#[derive(Default)]
struct RecordingCreator {
    nodes: Mutex<Vec<NodeDefinition>>,
    executed: Arc<Mutex<usize>>,
    fail_node: Option<usize>,
    fail_create: Option<usize>,
    obstruct: Option<PathBuf>,
}

/// Records every script it runs, failing them all when `fail` is set.
#[derive(Default)]
struct RecordingRunner {
    scripts: Mutex<Vec<PathBuf>>,
    fail: bool,
}

//--------------------------------------------------------------------------------------------------
// Methods: Helpers
//--------------------------------------------------------------------------------------------------

impl TestEnv {
    fn new() -> anyhow::Result<Self> {
        let root = tempfile::tempdir()?;
        std::fs::create_dir_all(root.path().join("basedir"))?;
        Ok(Self { root })
    }

    fn sandbox_home(&self) -> PathBuf {
        self.root.path().join("sandboxes")
    }

    fn sandbox_dir(&self) -> PathBuf {
        self.sandbox_home().join("group")
    }

    fn catalog(&self) -> SandboxCatalog {
        SandboxCatalog::in_home(self.root.path())
    }

    fn definition(&self, topology: TopologyKind, nodes: usize) -> SandboxDefinition {
        SandboxDefinition::builder()
            .version("8.0.35")
            .basedir(self.root.path().join("basedir"))
            .sandbox_dir(self.sandbox_dir())
            .topology(topology)
            .nodes(nodes)
            .build()
    }

    fn builder(
        &self,
        creator: Arc<dyn NodeCreator>,
        runner: Arc<dyn CommandRunner>,
        probe: impl Fn(u16) -> bool + Send + Sync + 'static,
    ) -> TopologyBuilder {
        TopologyBuilder::builder()
            .catalog(self.catalog())
            .node_creator(creator)
            .runner(runner)
            .probe(Arc::new(probe))
            .build()
    }
}

impl RecordingCreator {
    fn nodes(&self) -> Vec<NodeDefinition> {
        self.nodes.lock().unwrap().clone()
    }

    fn executed(&self) -> usize {
        *self.executed.lock().unwrap()
    }
}

impl RecordingRunner {
    fn scripts(&self) -> Vec<PathBuf> {
        self.scripts.lock().unwrap().clone()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations: Helpers
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl NodeCreator for RecordingCreator {
    async fn create_node(&self, node: &NodeDefinition) -> MonodbResult<ExecutionList> {
        let ordinal = *node.record.get_ordinal();
        if self.fail_create == Some(ordinal) {
            return Err(MonodbError::SandboxNotFound(node.node_dir.display().to_string()));
        }

        tokio::fs::create_dir_all(&node.node_dir).await?;
        self.nodes.lock().unwrap().push(node.clone());
        if let Some(path) = &self.obstruct {
            tokio::fs::create_dir_all(path).await?;
        }

        let label = node.record.get_label().clone();
        let fail = self.fail_node == Some(ordinal);
        let executed = self.executed.clone();

        Ok(vec![
            ExecutionItem::task(1, format!("init {}", label), async { Ok(()) }),
            ExecutionItem::task(2, format!("start {}", label), async move {
                if fail {
                    return Err(MonodbError::SandboxNotFound(ordinal.to_string()));
                }

                *executed.lock().unwrap() += 1;
                Ok(())
            }),
        ])
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, script: &Path) -> MonodbResult<String> {
        self.scripts.lock().unwrap().push(script.to_path_buf());
        if self.fail {
            return Err(MonodbError::CommandFailed {
                command: script.display().to_string(),
                status: Some(1),
                stderr: "bootstrap failed".to_string(),
            });
        }

        Ok(String::new())
    }
}
