//! Server versions, flavors and the capabilities they gate.

use std::{fmt, str::FromStr};

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{MonodbError, MonodbResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The database server flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Oracle MySQL.
    #[default]
    Mysql,

    /// Percona Server.
    Percona,

    /// MariaDB.
    Mariadb,
}

/// A feature whose availability depends on flavor and version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Group replication plugin.
    GroupReplication,

    /// Managed clusters bootstrapped through the cluster shell.
    InnodbCluster,

    /// The X protocol listener is enabled by default.
    MysqlXDefault,

    /// The dedicated administrative connection interface.
    AdminAddress,

    /// `SOURCE`/`REPLICA` replication statements.
    SourceReplicaTerminology,
}

/// Answers whether a flavor and version support a capability.
pub trait CapabilityQuery: Send + Sync {
    /// Returns `true` if `flavor` at `version` supports `capability`.
    fn supports(&self, flavor: Flavor, capability: Capability, version: &Version) -> bool;
}

/// The built-in table of minimum versions per flavor and capability.
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable;

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl CapabilityTable {
    /// Returns the minimum version of `flavor` supporting `capability`, if any.
    pub fn minimum_version(flavor: Flavor, capability: Capability) -> Option<Version> {
        match flavor {
            Flavor::Mysql | Flavor::Percona => Some(match capability {
                Capability::GroupReplication => Version::new(5, 7, 17),
                Capability::InnodbCluster => Version::new(8, 0, 11),
                Capability::MysqlXDefault => Version::new(8, 0, 11),
                Capability::AdminAddress => Version::new(8, 0, 14),
                Capability::SourceReplicaTerminology => Version::new(8, 0, 23),
            }),
            Flavor::Mariadb => None,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Parses a `<major>.<minor>.<patch>` server version.
pub fn parse_version(version: &str) -> MonodbResult<Version> {
    let parts: Vec<&str> = version.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(MonodbError::InvalidVersion(version.to_string()));
    }

    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| MonodbError::InvalidVersion(version.to_string()))?;
    }

    Ok(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Returns the conventional single-sandbox port of a version, e.g. `8.0.35` -> `8035`.
pub fn version_to_port(version: &Version) -> u16 {
    let port = version.major * 1000 + version.minor * 100 + version.patch;
    u16::try_from(port).unwrap_or(u16::MAX)
}

/// Returns `true` for versions using the pre-8.4 option names (`8.0.x` and older).
pub fn uses_legacy_options(version: &Version) -> bool {
    (version.major, version.minor) < (8, 4)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl CapabilityQuery for CapabilityTable {
    fn supports(&self, flavor: Flavor, capability: Capability, version: &Version) -> bool {
        CapabilityTable::minimum_version(flavor, capability).is_some_and(|min| *version >= min)
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flavor::Mysql => "mysql",
            Flavor::Percona => "percona",
            Flavor::Mariadb => "mariadb",
        };

        write!(f, "{}", name)
    }
}

impl FromStr for Flavor {
    type Err = MonodbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Flavor::Mysql),
            "percona" => Ok(Flavor::Percona),
            "mariadb" => Ok(Flavor::Mariadb),
            other => Err(MonodbError::custom(anyhow::anyhow!(
                "unknown flavor '{}'",
                other
            ))),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
