use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{config::Flavor, ports::PortSet, utils::CATALOG_FILENAME, MonodbError, MonodbResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The catalog entry of one installed sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxCatalogItem {
    /// The server binaries the sandbox was built from.
    pub origin: PathBuf,

    /// The sandbox type.
    #[serde(rename = "type")]
    pub sandbox_type: String,

    /// The server version.
    pub version: String,

    /// The server flavor.
    pub flavor: Flavor,

    /// Every port the sandbox holds.
    pub port: Vec<u16>,

    /// The node directory names.
    pub nodes: Vec<String>,

    /// The sandbox directory.
    pub destination: PathBuf,

    /// The directory of the run log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_directory: Option<PathBuf>,
}

/// The host-wide catalog file.
///
/// Every change rewrites the whole file through a temporary file and a rename, so a reader never
/// sees a partially written catalog.
#[derive(Debug, Clone)]
pub struct SandboxCatalog {
    path: PathBuf,
}

/// Catalog contents keyed by destination.
pub type CatalogEntries = BTreeMap<String, SandboxCatalogItem>;

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SandboxCatalog {
    /// Opens the catalog stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens the catalog of the monodb home directory `home`.
    pub fn in_home(home: impl AsRef<Path>) -> Self {
        Self::new(home.as_ref().join(CATALOG_FILENAME))
    }

    /// The catalog file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every entry. A missing file is an empty catalog.
    pub async fn read(&self) -> MonodbResult<CatalogEntries> {
        if !fs::try_exists(&self.path).await? {
            return Ok(CatalogEntries::new());
        }

        let contents = fs::read_to_string(&self.path).await?;
        if contents.trim().is_empty() {
            return Ok(CatalogEntries::new());
        }

        Ok(serde_json::from_str(&contents)?)
    }

    /// Returns the entry of `destination`, if any.
    pub async fn get(&self, destination: impl AsRef<Path>) -> MonodbResult<Option<SandboxCatalogItem>> {
        let mut entries = self.read().await?;
        Ok(entries.remove(&catalog_key(destination.as_ref())))
    }

    /// Inserts or replaces the entry of `destination`.
    ///
    /// Any failure is reported as [`MonodbError::CatalogWrite`].
    pub async fn update(
        &self,
        destination: impl AsRef<Path>,
        item: SandboxCatalogItem,
    ) -> MonodbResult<()> {
        let key = catalog_key(destination.as_ref());
        let result = async {
            let mut entries = self.read().await?;
            entries.insert(key.clone(), item);
            self.write(&entries).await
        }
        .await;

        result.map_err(|e| self.write_error(e))?;
        tracing::debug!("catalog {} updated with {}", self.path.display(), key);

        Ok(())
    }

    /// Removes the entry of `destination` and returns it.
    pub async fn remove(&self, destination: impl AsRef<Path>) -> MonodbResult<Option<SandboxCatalogItem>> {
        let key = catalog_key(destination.as_ref());
        let result = async {
            let mut entries = self.read().await?;
            let removed = entries.remove(&key);
            if removed.is_some() {
                self.write(&entries).await?;
            }

            Ok::<_, MonodbError>(removed)
        }
        .await;

        let removed = result.map_err(|e| self.write_error(e))?;
        if removed.is_some() {
            tracing::debug!("removed {} from catalog {}", key, self.path.display());
        }

        Ok(removed)
    }

    /// The ports of every installed sandbox.
    pub async fn installed_ports(&self) -> MonodbResult<PortSet> {
        Ok(self
            .read()
            .await?
            .values()
            .flat_map(|item| item.port.iter().copied())
            .collect())
    }

    async fn write(&self, entries: &CatalogEntries) -> MonodbResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        monoutils::write_atomic(&self.path, contents).await?;

        Ok(())
    }

    fn write_error(&self, error: MonodbError) -> MonodbError {
        match error {
            e @ MonodbError::CatalogWrite { .. } => e,
            e => MonodbError::CatalogWrite {
                path: self.path.clone(),
                source: Box::new(e),
            },
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn catalog_key(destination: &Path) -> String {
    destination.to_string_lossy().into_owned()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
