//! The monodb configuration file.

use std::path::{Path, PathBuf};

use getset::Getters;
use monoutils::expand_home;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{utils::CONFIG_FILENAME, MonodbResult};

use super::{
    DEFAULT_ADMIN_PORT_DELTA, DEFAULT_CLUSTER_SHELL_PATH, DEFAULT_GROUP_PORT_DELTA,
    DEFAULT_GROUP_REPLICATION_BASE_PORT, DEFAULT_GROUP_REPLICATION_SP_BASE_PORT,
    DEFAULT_MASTER_ABBR, DEFAULT_MASTER_NAME, DEFAULT_MAX_ALLOWED_PORT, DEFAULT_MYSQLX_PORT_DELTA,
    DEFAULT_NODE_PREFIX, DEFAULT_SANDBOX_BINARY, DEFAULT_SANDBOX_HOME, DEFAULT_SHELL_PATH,
    DEFAULT_SLAVE_ABBR, DEFAULT_SLAVE_PREFIX,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Host-wide settings, read from `config.yaml` in the monodb home directory.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
#[serde(default)]
pub struct MonodbConfig {
    /// Where new sandboxes are created.
    pub(super) sandbox_home: PathBuf,

    /// Where unpacked server trees live, one directory per version.
    pub(super) sandbox_binary: PathBuf,

    /// Offset of multi-primary group base ports.
    pub(super) group_replication_base_port: u16,

    /// Offset of single-primary group base ports.
    pub(super) group_replication_sp_base_port: u16,

    /// Distance from the data block to the group-membership block.
    pub(super) group_port_delta: u16,

    /// Distance from the data block to the mysqlx block.
    pub(super) mysqlx_port_delta: u16,

    /// Distance from the data block to the admin block.
    pub(super) admin_port_delta: u16,

    /// Highest derived base port before folding.
    pub(super) max_allowed_port: u16,

    /// Node directory prefix.
    pub(super) node_prefix: String,

    /// Primary node label.
    pub(super) master_name: String,

    /// Primary node abbreviation.
    pub(super) master_abbr: String,

    /// Secondary node label.
    pub(super) slave_prefix: String,

    /// Secondary node abbreviation.
    pub(super) slave_abbr: String,

    /// Interpreter line of generated scripts.
    pub(super) shell_path: String,

    /// Cluster shell used to bootstrap managed clusters.
    pub(super) cluster_shell_path: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MonodbConfig {
    /// Loads the configuration from `home`, falling back to defaults when the file is absent.
    ///
    /// A leading `~` or `$HOME` in the directory settings is expanded.
    pub async fn load(home: impl AsRef<Path>) -> MonodbResult<Self> {
        let path = home.as_ref().join(CONFIG_FILENAME);
        if !fs::try_exists(&path).await? {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).await?;
        let mut config: Self = serde_yaml::from_str(&contents)?;
        config.sandbox_home = expand_home(config.sandbox_home.to_string_lossy())?;
        config.sandbox_binary = expand_home(config.sandbox_binary.to_string_lossy())?;
        tracing::debug!("loaded config from {}", path.display());

        Ok(config)
    }

    /// Writes the configuration to `home`, unless a config file already exists.
    ///
    /// Returns `true` if a file was written.
    pub async fn save_if_absent(&self, home: impl AsRef<Path>) -> MonodbResult<bool> {
        let path = home.as_ref().join(CONFIG_FILENAME);
        if fs::try_exists(&path).await? {
            return Ok(false);
        }

        fs::write(&path, serde_yaml::to_string(self)?).await?;
        Ok(true)
    }

    /// Sets the sandbox home directory.
    pub fn with_sandbox_home(mut self, sandbox_home: impl Into<PathBuf>) -> Self {
        self.sandbox_home = sandbox_home.into();
        self
    }

    /// Sets the server binaries directory.
    pub fn with_sandbox_binary(mut self, sandbox_binary: impl Into<PathBuf>) -> Self {
        self.sandbox_binary = sandbox_binary.into();
        self
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for MonodbConfig {
    fn default() -> Self {
        Self {
            sandbox_home: DEFAULT_SANDBOX_HOME.clone(),
            sandbox_binary: DEFAULT_SANDBOX_BINARY.clone(),
            group_replication_base_port: DEFAULT_GROUP_REPLICATION_BASE_PORT,
            group_replication_sp_base_port: DEFAULT_GROUP_REPLICATION_SP_BASE_PORT,
            group_port_delta: DEFAULT_GROUP_PORT_DELTA,
            mysqlx_port_delta: DEFAULT_MYSQLX_PORT_DELTA,
            admin_port_delta: DEFAULT_ADMIN_PORT_DELTA,
            max_allowed_port: DEFAULT_MAX_ALLOWED_PORT,
            node_prefix: DEFAULT_NODE_PREFIX.to_string(),
            master_name: DEFAULT_MASTER_NAME.to_string(),
            master_abbr: DEFAULT_MASTER_ABBR.to_string(),
            slave_prefix: DEFAULT_SLAVE_PREFIX.to_string(),
            slave_abbr: DEFAULT_SLAVE_ABBR.to_string(),
            shell_path: DEFAULT_SHELL_PATH.to_string(),
            cluster_shell_path: DEFAULT_CLUSTER_SHELL_PATH.to_string(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing_config_uses_defaults() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let config = MonodbConfig::load(home.path()).await?;
        assert_eq!(config, MonodbConfig::default());
        assert_eq!(*config.get_group_port_delta(), 125);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_partial_config() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        fs::write(
            home.path().join(CONFIG_FILENAME),
            "group_port_delta: 200\nnode_prefix: member\n",
        )
        .await?;

        let config = MonodbConfig::load(home.path()).await?;
        assert_eq!(*config.get_group_port_delta(), 200);
        assert_eq!(config.get_node_prefix(), "member");
        assert_eq!(*config.get_mysqlx_port_delta(), 10000);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_expands_home_in_directories() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        fs::write(
            home.path().join(CONFIG_FILENAME),
            "sandbox_home: ~/sb\nsandbox_binary: $HOME/opt/mysql\n",
        )
        .await?;

        let user_home = monoutils::home_dir()?;
        let config = MonodbConfig::load(home.path()).await?;
        assert_eq!(config.get_sandbox_home(), &user_home.join("sb"));
        assert_eq!(config.get_sandbox_binary(), &user_home.join("opt/mysql"));
        Ok(())
    }

    #[tokio::test]
    async fn test_save_if_absent_keeps_existing_file() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let config = MonodbConfig::default();

        assert!(config.save_if_absent(home.path()).await?);
        assert!(!config.save_if_absent(home.path()).await?);

        let reloaded = MonodbConfig::load(home.path()).await?;
        assert_eq!(reloaded, config);
        Ok(())
    }
}
