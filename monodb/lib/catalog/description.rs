use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{config::Flavor, utils::DESCRIPTION_FILENAME, MonodbResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// What a sandbox directory contains, stored as `sbdescription.json` inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxDescription {
    /// The server binaries the sandbox runs.
    pub basedir: PathBuf,

    /// The sandbox type, e.g. `group-single-primary`.
    #[serde(rename = "type")]
    pub sandbox_type: String,

    /// The server version.
    pub version: String,

    /// The server flavor.
    pub flavor: Flavor,

    /// Every port of the sandbox.
    pub port: Vec<u16>,

    /// The number of nodes.
    pub nodes: usize,

    /// The node number. `0` for the sandbox as a whole.
    pub node_num: usize,

    /// The log file of the run that created the sandbox.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Writes `description` into `sandbox_dir`.
pub async fn write_description(
    sandbox_dir: impl AsRef<Path>,
    description: &SandboxDescription,
) -> MonodbResult<()> {
    let path = sandbox_dir.as_ref().join(DESCRIPTION_FILENAME);
    let contents = serde_json::to_string_pretty(description)?;
    monoutils::write_atomic(&path, contents).await?;

    tracing::debug!("wrote sandbox description {}", path.display());
    Ok(())
}

/// Reads the description of the sandbox in `sandbox_dir`.
pub async fn read_description(sandbox_dir: impl AsRef<Path>) -> MonodbResult<SandboxDescription> {
    let path = sandbox_dir.as_ref().join(DESCRIPTION_FILENAME);
    let contents = fs::read_to_string(&path).await?;
    Ok(serde_json::from_str(&contents)?)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_description_file_layout() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let description = SandboxDescription {
            basedir: PathBuf::from("/opt/mysql/8.0.35"),
            sandbox_type: "group-single-primary".to_string(),
            version: "8.0.35".to_string(),
            flavor: Flavor::Mysql,
            port: vec![20001, 20126],
            nodes: 3,
            node_num: 0,
            log_file: None,
        };

        write_description(dir.path(), &description).await?;

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(DESCRIPTION_FILENAME)).await?)?;
        assert_eq!(raw["type"], "group-single-primary");
        assert_eq!(raw["flavor"], "mysql");
        assert!(raw.get("log_file").is_none());

        assert_eq!(read_description(dir.path()).await?, description);
        Ok(())
    }

    #[tokio::test]
    async fn test_read_missing_description() {
        let dir = TempDir::new().unwrap();
        assert!(read_description(dir.path()).await.is_err());
    }
}
