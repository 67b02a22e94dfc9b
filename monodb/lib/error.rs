use std::{
    error::Error,
    fmt::{self, Display},
    path::PathBuf,
};
use thiserror::Error;

use monoutils::MonoutilsError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a monodb-related operation.
pub type MonodbResult<T> = Result<T, MonodbError>;

/// An error that occurred while provisioning or managing sandboxes.
#[derive(Debug, Error)]
pub enum MonodbError {
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that can represent any error.
    #[error(transparent)]
    Custom(#[from] AnyError),

    /// An error from one of the shared utilities.
    #[error(transparent)]
    Utils(#[from] MonoutilsError),

    /// A JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML (de)serialization error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An error that occurred when a join handle returned an error.
    #[error("join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    /// A version string could not be parsed.
    #[error("invalid version '{0}': expected <major>.<minor>.<patch>")]
    InvalidVersion(String),

    /// The provisioning request was rejected before any side effect.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No conflict-free port range could be found.
    #[error("port allocation error: {0}")]
    PortAllocation(#[from] PortAllocationError),

    /// The node creator failed for one node.
    #[error("error creating sandbox for node {node}: {source}")]
    NodeConstruction {
        /// The ordinal of the node that failed.
        node: usize,

        /// The underlying error.
        #[source]
        source: Box<MonodbError>,
    },

    /// One or more actions of a priority band failed.
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    /// A template could not be rendered.
    #[error("error rendering template '{name}': {source}")]
    Template {
        /// The name of the template.
        name: String,

        /// The underlying template engine error.
        #[source]
        source: tera::Error,
    },

    /// A named template is not part of the collection it was looked up in.
    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    /// The catalog could not be updated.
    #[error("unable to update catalog {path}: {source}")]
    CatalogWrite {
        /// The catalog file.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: Box<MonodbError>,
    },

    /// An external command exited unsuccessfully.
    #[error("command '{command}' failed with status {status:?}: {stderr}")]
    CommandFailed {
        /// The command that was run.
        command: String,

        /// The exit code, if the process exited normally.
        status: Option<i32>,

        /// The captured standard error.
        stderr: String,
    },

    /// A sandbox was not found in the catalog.
    #[error("sandbox not found: {0}")]
    SandboxNotFound(String),

    /// A provisioning step failed.
    #[error("{step} failed: {source}")]
    Provision {
        /// The step that failed.
        step: ProvisionStep,

        /// The underlying error.
        #[source]
        source: Box<MonodbError>,
    },
}

/// Reasons a provisioning request is rejected up front.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The version or flavor cannot run the requested topology.
    #[error("{topology} is not supported for {flavor} {version}")]
    UnsupportedVersion {
        /// The requested topology.
        topology: String,

        /// The requested flavor.
        flavor: String,

        /// The requested version.
        version: String,
    },

    /// The topology needs more nodes than requested.
    #[error("can't run {topology} with less than {minimum} nodes (requested {nodes})")]
    TooFewNodes {
        /// The requested topology.
        topology: String,

        /// The requested number of nodes.
        nodes: usize,

        /// The minimum number of nodes.
        minimum: usize,
    },

    /// Read-only flags were given for a topology that manages them itself.
    #[error("options --read-only and --super-read-only can't be used for {0}, as it sets them when needed")]
    ReadOnlyFlags(String),

    /// The destination already exists and `force` was not given.
    #[error("destination {0} already exists")]
    DestinationExists(PathBuf),

    /// The server binaries directory does not exist.
    #[error("basedir {0} not found")]
    BasedirNotFound(PathBuf),
}

/// Reasons a port block cannot be handed out.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortAllocationError {
    /// No contiguous free range exists at or above `base`.
    #[error("no free port found: {count} contiguous ports starting at or after {base}")]
    NoFreePortFound {
        /// The first port searched.
        base: u32,

        /// The number of contiguous ports requested.
        count: usize,
    },

    /// A specific port class could not be allocated.
    #[error("error retrieving free {class} ports: {count} contiguous ports starting at or after {base}")]
    BlockUnavailable {
        /// The port class that failed.
        class: String,

        /// The first port searched.
        base: u32,

        /// The number of contiguous ports requested.
        count: usize,
    },
}

/// The aggregated failures of one priority band.
#[derive(Debug, Error)]
#[error("{} of {total} actions failed in priority band {priority}: {}", .failures.len(), format_failures(.failures))]
pub struct SchedulingError {
    /// The priority of the band that failed.
    pub priority: u32,

    /// The number of actions in the band.
    pub total: usize,

    /// Every failure of the band.
    pub failures: Vec<ActionFailure>,
}

/// A failed scheduled action.
#[derive(Debug)]
pub struct ActionFailure {
    /// The label of the action.
    pub label: String,

    /// What went wrong.
    pub error: MonodbError,
}

/// The steps of a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisionStep {
    /// Input validation.
    Validate,

    /// Port allocation.
    AllocatePorts,

    /// Destination directory creation.
    ReserveDirectory,

    /// Per-node construction.
    ConstructNodes,

    /// Control script rendering.
    RenderScripts,

    /// Running the scheduled actions.
    Schedule,

    /// Membership bootstrap.
    Bootstrap,

    /// Writing the sandbox description.
    Commit,
}

/// An error that can represent any error.
#[derive(Debug)]
pub struct AnyError {
    error: anyhow::Error,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MonodbError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> MonodbError {
        MonodbError::Custom(AnyError {
            error: error.into(),
        })
    }

    /// Wraps the error with the provisioning step it happened in.
    pub fn at(self, step: ProvisionStep) -> MonodbError {
        MonodbError::Provision {
            step,
            source: Box::new(self),
        }
    }

    /// Returns the step a provisioning error happened in, if any.
    pub fn step(&self) -> Option<ProvisionStep> {
        match self {
            MonodbError::Provision { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Returns the error without its provisioning step context.
    pub fn root(&self) -> &MonodbError {
        match self {
            MonodbError::Provision { source, .. } => source.root(),
            other => other,
        }
    }
}

impl AnyError {
    /// Downcasts the error to a `T`.
    pub fn downcast<T>(&self) -> Option<&T>
    where
        T: Display + fmt::Debug + Send + Sync + 'static,
    {
        self.error.downcast_ref::<T>()
    }
}

impl PortAllocationError {
    /// Attaches the port class to a `NoFreePortFound` error.
    pub fn for_class(self, class: impl Display) -> PortAllocationError {
        match self {
            PortAllocationError::NoFreePortFound { base, count } => {
                PortAllocationError::BlockUnavailable {
                    class: class.to_string(),
                    base,
                    count,
                }
            }
            other => other,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `MonodbResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> MonodbResult<T> {
    Result::Ok(value)
}

fn format_failures(failures: &[ActionFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("[{}: {}]", f.label, f.error))
        .collect::<Vec<_>>()
        .join(", ")
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProvisionStep::Validate => "validation",
            ProvisionStep::AllocatePorts => "port allocation",
            ProvisionStep::ReserveDirectory => "directory reservation",
            ProvisionStep::ConstructNodes => "node construction",
            ProvisionStep::RenderScripts => "script rendering",
            ProvisionStep::Schedule => "scheduled execution",
            ProvisionStep::Bootstrap => "membership bootstrap",
            ProvisionStep::Commit => "commit",
        };

        write!(f, "{}", name)
    }
}

impl PartialEq for AnyError {
    fn eq(&self, other: &Self) -> bool {
        self.error.to_string() == other.error.to_string()
    }
}

impl Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for AnyError {}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
