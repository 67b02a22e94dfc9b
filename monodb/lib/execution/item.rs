use std::{fmt, future::Future, path::PathBuf, pin::Pin, process::Stdio};

use tokio::process::Command;
use typed_builder::TypedBuilder;

use crate::{MonodbError, MonodbResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A boxed in-process action.
pub type TaskFuture = Pin<Box<dyn Future<Output = MonodbResult<()>> + Send + 'static>>;

/// The deferred actions of one or more nodes, in insertion order.
pub type ExecutionList = Vec<ExecutionItem>;

/// An external program invocation.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct CommandSpec {
    /// The program to run.
    #[builder(setter(into))]
    pub program: PathBuf,

    /// The arguments passed to the program.
    #[builder(default, setter(into))]
    pub args: Vec<String>,

    /// The working directory of the process.
    #[builder(default, setter(strip_option, into))]
    pub current_dir: Option<PathBuf>,
}

/// What an execution item does when its band runs.
pub enum Action {
    /// Runs an external program. A non-zero exit status is a failure.
    Command(CommandSpec),

    /// Runs an async task in-process.
    Task(TaskFuture),
}

/// A deferred action tagged with the priority band it runs in.
///
/// Lower priorities run first.
#[derive(Debug)]
pub struct ExecutionItem {
    /// The band of the action.
    pub priority: u32,

    /// A human-readable name used in logs and error reports.
    pub label: String,

    /// The action itself.
    pub action: Action,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ExecutionItem {
    /// Creates an item running an external program.
    pub fn command(priority: u32, label: impl Into<String>, spec: CommandSpec) -> Self {
        Self {
            priority,
            label: label.into(),
            action: Action::Command(spec),
        }
    }

    /// Creates an item running an in-process task.
    pub fn task<F>(priority: u32, label: impl Into<String>, task: F) -> Self
    where
        F: Future<Output = MonodbResult<()>> + Send + 'static,
    {
        Self {
            priority,
            label: label.into(),
            action: Action::Task(Box::pin(task)),
        }
    }
}

impl CommandSpec {
    /// The command line, for logs and errors.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs the program to completion and returns its standard output.
    pub async fn run(&self) -> MonodbResult<String> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let output = command.output().await?;
        if !output.status.success() {
            return Err(MonodbError::CommandFailed {
                command: self.command_line(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Action {
    /// Runs the action to completion.
    pub async fn run(self) -> MonodbResult<()> {
        match self {
            Action::Command(spec) => {
                let stdout = spec.run().await?;
                if !stdout.trim().is_empty() {
                    tracing::debug!("{}: {}", spec.command_line(), stdout.trim());
                }
                Ok(())
            }
            Action::Task(task) => task.await,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Command(spec) => f.debug_tuple("Command").field(spec).finish(),
            Action::Task(_) => f.write_str("Task(..)"),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
