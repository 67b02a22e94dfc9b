mod handlers;

use std::path::Path;

use clap::{CommandFactory, Parser};
use monodb::{
    cli::{MonodbArgs, MonodbSubcommand},
    utils, MonodbResult,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const DEFAULT_LOG_FILTER: &str = "monodb=info";

const VERBOSE_LOG_FILTER: &str = "monodb=debug";

const FILE_LOG_FILTER: &str = "monodb=debug";

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> MonodbResult<()> {
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args = MonodbArgs::parse();
    let home = utils::get_monodb_home_path();

    // Deployments also log to a file in the home directory
    let log_file = match &args.subcommand {
        Some(MonodbSubcommand::Deploy {
            topology,
            version,
            single_primary,
            sandbox_directory,
            ..
        }) => Some(handlers::run_log_file(
            &home,
            *topology,
            version,
            *single_primary,
            sandbox_directory.as_deref(),
        )),
        _ => None,
    };
    let _guard = init_tracing(args.verbose, log_file.as_deref())?;

    match args.subcommand {
        Some(MonodbSubcommand::Init { path }) => {
            tracing::trace!("initializing monodb home: path={path:?}");
            handlers::init_subcommand(path).await?;
        }
        Some(MonodbSubcommand::Deploy {
            topology,
            version,
            nodes,
            single_primary,
            base_port,
            sandbox_directory,
            skip_start,
            concurrent,
            enable_admin_address,
            enable_mysqlx,
            disable_mysqlx,
            read_only,
            super_read_only,
            force,
            flavor,
            master_ip,
        }) => {
            tracing::trace!("deploying {topology}: version={version}, nodes={nodes}");
            handlers::deploy_subcommand(
                &home,
                handlers::DeployOptions {
                    topology,
                    version,
                    nodes,
                    single_primary,
                    base_port,
                    sandbox_directory,
                    skip_start,
                    concurrent,
                    enable_admin_address,
                    enable_mysqlx,
                    disable_mysqlx,
                    read_only,
                    super_read_only,
                    force,
                    flavor,
                    master_ip,
                },
                log_file,
            )
            .await?;
        }
        Some(MonodbSubcommand::Sandboxes) => {
            handlers::sandboxes_subcommand(&home).await?;
        }
        Some(MonodbSubcommand::Delete { name }) => {
            tracing::trace!("deleting sandbox: name={name}");
            handlers::delete_subcommand(&home, &name).await?;
        }
        None => {
            MonodbArgs::command().print_help()?;
        }
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

/// Installs the console subscriber and, when `log_file` is given, a non-blocking file writer.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> MonodbResult<Option<WorkerGuard>> {
    let console_filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_filter(console_filter);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (dir, name) = match (path.parent(), path.file_name()) {
                (Some(dir), Some(name)) => (dir, name),
                _ => return Err(std::io::Error::other(format!("invalid log file {}", path.display())).into()),
            };
            std::fs::create_dir_all(dir)?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(FILE_LOG_FILTER));

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
