use std::path::{Path, PathBuf};

use monodb::{
    catalog::SandboxCatalog,
    cli::AnsiStyles,
    config::{Flavor, MonodbConfig, SandboxDefinition, TopologyKind},
    management::{self, ShellRunner},
    topology::TopologyBuilder,
    MonodbResult,
};
use monoutils::replace_literal_home;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The options of the `deploy` subcommand.
pub struct DeployOptions {
    pub topology: TopologyKind,
    pub version: String,
    pub nodes: usize,
    pub single_primary: bool,
    pub base_port: Option<u16>,
    pub sandbox_directory: Option<String>,
    pub skip_start: bool,
    pub concurrent: bool,
    pub enable_admin_address: bool,
    pub enable_mysqlx: bool,
    pub disable_mysqlx: bool,
    pub read_only: bool,
    pub super_read_only: bool,
    pub force: bool,
    pub flavor: Flavor,
    pub master_ip: String,
}

//--------------------------------------------------------------------------------------------------
// Functions: Handlers
//--------------------------------------------------------------------------------------------------

pub async fn init_subcommand(path: Option<PathBuf>) -> MonodbResult<()> {
    let home = management::init_home(path).await?;
    println!("{} {}", "initialized".valid(), replace_literal_home(&home).literal());

    Ok(())
}

pub async fn deploy_subcommand(
    home: &Path,
    options: DeployOptions,
    log_file: Option<PathBuf>,
) -> MonodbResult<()> {
    let config = MonodbConfig::load(home).await?;
    let dir_name = sandbox_dir_name(
        options.topology,
        &options.version,
        options.single_primary,
        options.sandbox_directory.as_deref(),
    );
    let sandbox_dir = config.get_sandbox_home().join(dir_name);
    let basedir = config.get_sandbox_binary().join(&options.version);

    let mut definition = SandboxDefinition::builder()
        .version(options.version)
        .flavor(options.flavor)
        .basedir(basedir)
        .sandbox_dir(sandbox_dir)
        .topology(options.topology)
        .nodes(options.nodes)
        .single_primary(options.single_primary)
        .master_ip(options.master_ip)
        .skip_start(options.skip_start)
        .run_concurrently(options.concurrent)
        .enable_admin_address(options.enable_admin_address)
        .enable_mysqlx(options.enable_mysqlx)
        .disable_mysqlx(options.disable_mysqlx)
        .read_only(options.read_only)
        .super_read_only(options.super_read_only)
        .force(options.force)
        .shell_path(config.get_shell_path().clone())
        .cluster_shell_path(config.get_cluster_shell_path().clone())
        .build();
    definition.base_port = options.base_port;
    definition.log_file = log_file;

    let builder = TopologyBuilder::builder()
        .catalog(SandboxCatalog::in_home(home))
        .config(config)
        .build();

    let description = builder.provision(definition.clone()).await?;
    println!(
        "{} {} installed in {}",
        "✓".valid(),
        description.sandbox_type.header(),
        replace_literal_home(&definition.sandbox_dir).literal()
    );
    println!("  ports: {}", format_ports(&description.port));

    Ok(())
}

pub async fn sandboxes_subcommand(home: &Path) -> MonodbResult<()> {
    let catalog = SandboxCatalog::in_home(home);
    let items = management::list_sandboxes(&catalog).await?;
    if items.is_empty() {
        println!("no sandboxes installed");
        return Ok(());
    }

    for item in items {
        println!(
            "{} {} {} {} [{}]",
            replace_literal_home(&item.destination).literal(),
            item.sandbox_type.header(),
            item.flavor,
            item.version,
            format_ports(&item.port).placeholder()
        );
    }

    Ok(())
}

pub async fn delete_subcommand(home: &Path, name: &str) -> MonodbResult<()> {
    let config = MonodbConfig::load(home).await?;
    let sandbox_dir = management::resolve_sandbox_dir(name, config.get_sandbox_home());
    let catalog = SandboxCatalog::in_home(home);

    management::remove_sandbox(&sandbox_dir, &catalog, &ShellRunner).await?;

    println!("{} {}", "deleted".valid(), replace_literal_home(&sandbox_dir).literal());

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

/// The log file of a deployment: `<home>/logs/<sandbox directory name>.log`.
pub fn run_log_file(
    home: &Path,
    topology: TopologyKind,
    version: &str,
    single_primary: bool,
    sandbox_directory: Option<&str>,
) -> PathBuf {
    let dir_name = sandbox_dir_name(topology, version, single_primary, sandbox_directory);
    management::log_dir(home).join(format!("{}.log", dir_name))
}

fn sandbox_dir_name(
    topology: TopologyKind,
    version: &str,
    single_primary: bool,
    sandbox_directory: Option<&str>,
) -> String {
    match sandbox_directory {
        Some(name) => name.to_string(),
        None => SandboxDefinition::default_dir_name(topology, single_primary, version),
    }
}

fn format_ports(ports: &[u16]) -> String {
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
