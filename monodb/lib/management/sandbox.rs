use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{
    catalog::{SandboxCatalog, SandboxCatalogItem},
    topology::SCRIPT_STOP_ALL,
    MonodbError, MonodbResult,
};

use super::CommandRunner;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Resolves a sandbox given by name or path.
///
/// Anything with a path separator is taken as a path. A bare name lives in `sandbox_home`.
pub fn resolve_sandbox_dir(name_or_path: &str, sandbox_home: &Path) -> PathBuf {
    let path = Path::new(name_or_path);
    if path.is_absolute() || name_or_path.contains(std::path::MAIN_SEPARATOR) {
        path.to_path_buf()
    } else {
        sandbox_home.join(path)
    }
}

/// Stops and deletes the sandbox in `sandbox_dir` and drops its catalog entry.
///
/// A failing stop script is logged and does not prevent the removal. Returns the removed catalog
/// entry, if there was one.
pub async fn remove_sandbox(
    sandbox_dir: &Path,
    catalog: &SandboxCatalog,
    runner: &dyn CommandRunner,
) -> MonodbResult<Option<SandboxCatalogItem>> {
    let dir_exists = fs::try_exists(sandbox_dir).await?;
    let entry = catalog.get(sandbox_dir).await?;
    if !dir_exists && entry.is_none() {
        return Err(MonodbError::SandboxNotFound(sandbox_dir.display().to_string()));
    }

    // Stop the nodes
    let stop_script = sandbox_dir.join(SCRIPT_STOP_ALL);
    if fs::try_exists(&stop_script).await? {
        if let Err(e) = runner.run(&stop_script).await {
            tracing::warn!("error stopping sandbox {}: {}", sandbox_dir.display(), e);
        }
    }

    // Remove the directory
    if dir_exists {
        fs::remove_dir_all(sandbox_dir).await?;
        tracing::info!("removed {}", sandbox_dir.display());
    }

    // Release the ports
    catalog.remove(sandbox_dir).await
}

/// Lists the installed sandboxes, ordered by destination.
pub async fn list_sandboxes(catalog: &SandboxCatalog) -> MonodbResult<Vec<SandboxCatalogItem>> {
    Ok(catalog.read().await?.into_values().collect())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::config::Flavor;

    #[derive(Default)]
    struct RecordingRunner {
        runs: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, script: &Path) -> MonodbResult<String> {
            self.runs.lock().unwrap().push(script.to_path_buf());
            Err(MonodbError::SandboxNotFound("stopped already".to_string()))
        }
    }

    #[test]
    fn test_resolve_sandbox_dir() {
        let home = Path::new("/home/me/sandboxes");
        assert_eq!(
            resolve_sandbox_dir("group_msb_8_0_35", home),
            PathBuf::from("/home/me/sandboxes/group_msb_8_0_35")
        );
        assert_eq!(resolve_sandbox_dir("/tmp/sb", home), PathBuf::from("/tmp/sb"));
        assert_eq!(resolve_sandbox_dir("./sb", home), PathBuf::from("./sb"));
    }

    #[tokio::test]
    async fn test_remove_sandbox() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let sandbox_dir = dir.path().join("sb");
        fs::create_dir(&sandbox_dir).await?;
        fs::write(sandbox_dir.join(SCRIPT_STOP_ALL), "").await?;

        let catalog = SandboxCatalog::in_home(dir.path());
        let item = SandboxCatalogItem {
            origin: PathBuf::from("/opt/mysql/8.0.35"),
            sandbox_type: "group-multi-primary".to_string(),
            version: "8.0.35".to_string(),
            flavor: Flavor::Mysql,
            port: vec![20001],
            nodes: vec!["node1".to_string()],
            destination: sandbox_dir.clone(),
            log_directory: None,
        };
        catalog.update(&sandbox_dir, item.clone()).await?;

        // A failing stop script does not prevent the removal.
        let runner = RecordingRunner::default();
        let removed = remove_sandbox(&sandbox_dir, &catalog, &runner).await?;

        assert_eq!(removed, Some(item));
        assert_eq!(*runner.runs.lock().unwrap(), vec![sandbox_dir.join(SCRIPT_STOP_ALL)]);
        assert!(!sandbox_dir.exists());
        assert!(list_sandboxes(&catalog).await?.is_empty());

        assert!(matches!(
            remove_sandbox(&sandbox_dir, &catalog, &runner).await,
            Err(MonodbError::SandboxNotFound(_))
        ));
        Ok(())
    }
}
