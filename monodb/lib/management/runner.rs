use std::path::Path;

use async_trait::async_trait;

use crate::{execution::CommandSpec, MonodbResult};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Runs a generated script synchronously.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `script` and returns its standard output.
    async fn run(&self, script: &Path) -> MonodbResult<String>;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Runs scripts as child processes from their own directory.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, script: &Path) -> MonodbResult<String> {
        let spec = CommandSpec {
            program: script.to_path_buf(),
            args: Vec::new(),
            current_dir: script.parent().map(Path::to_path_buf),
        };

        tracing::info!("running {}", script.display());
        let output = spec.run().await?;
        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!("{}", line);
        }

        Ok(output)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
