use semver::Version;
use tokio::fs;

use crate::{
    config::{parse_version, CapabilityQuery, SandboxDefinition},
    MonodbResult, ValidationError,
};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Checks a definition before anything is touched and returns its parsed version.
///
/// An existing destination is only accepted when `force` is set; replacing it is up to the caller.
pub async fn validate(
    definition: &SandboxDefinition,
    capabilities: &dyn CapabilityQuery,
) -> MonodbResult<Version> {
    let version = parse_version(&definition.version)?;
    let topology = definition.topology;

    if !capabilities.supports(definition.flavor, topology.required_capability(), &version) {
        return Err(ValidationError::UnsupportedVersion {
            topology: topology.to_string(),
            flavor: definition.flavor.to_string(),
            version: definition.version.clone(),
        }
        .into());
    }

    if definition.nodes < topology.min_nodes() {
        return Err(ValidationError::TooFewNodes {
            topology: topology.to_string(),
            nodes: definition.nodes,
            minimum: topology.min_nodes(),
        }
        .into());
    }

    if definition.read_only || definition.super_read_only {
        return Err(ValidationError::ReadOnlyFlags(topology.to_string()).into());
    }

    if !definition.force && fs::try_exists(&definition.sandbox_dir).await? {
        return Err(ValidationError::DestinationExists(definition.sandbox_dir.clone()).into());
    }

    if !fs::try_exists(&definition.basedir).await? {
        return Err(ValidationError::BasedirNotFound(definition.basedir.clone()).into());
    }

    Ok(version)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        config::{CapabilityTable, Flavor, TopologyKind},
        MonodbError,
    };

    fn definition(dir: &TempDir, version: &str, topology: TopologyKind) -> SandboxDefinition {
        SandboxDefinition::builder()
            .version(version)
            .basedir(dir.path())
            .sandbox_dir(dir.path().join("sb"))
            .topology(topology)
            .build()
    }

    fn rejection(result: MonodbResult<Version>) -> ValidationError {
        match result {
            Err(MonodbError::Validation(e)) => e,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_accepts_supported_definition() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let def = definition(&dir, "8.0.35", TopologyKind::InnodbCluster);

        assert_eq!(validate(&def, &CapabilityTable).await?, Version::new(8, 0, 35));
        Ok(())
    }

    #[tokio::test]
    async fn test_rejects_old_versions() {
        let dir = TempDir::new().unwrap();

        let def = definition(&dir, "5.7.16", TopologyKind::GroupReplication);
        assert!(matches!(
            rejection(validate(&def, &CapabilityTable).await),
            ValidationError::UnsupportedVersion { .. }
        ));

        let def = definition(&dir, "5.7.40", TopologyKind::InnodbCluster);
        assert!(matches!(
            rejection(validate(&def, &CapabilityTable).await),
            ValidationError::UnsupportedVersion { .. }
        ));

        let mut def = definition(&dir, "10.6.0", TopologyKind::GroupReplication);
        def.flavor = Flavor::Mariadb;
        assert!(matches!(
            rejection(validate(&def, &CapabilityTable).await),
            ValidationError::UnsupportedVersion { .. }
        ));
    }

    #[tokio::test]
    async fn test_rejects_bad_requests() {
        let dir = TempDir::new().unwrap();

        let mut def = definition(&dir, "8.0.35", TopologyKind::GroupReplication);
        def.nodes = 2;
        assert_eq!(
            rejection(validate(&def, &CapabilityTable).await),
            ValidationError::TooFewNodes {
                topology: "group replication".to_string(),
                nodes: 2,
                minimum: 3
            }
        );

        let mut def = definition(&dir, "8.0.35", TopologyKind::InnodbCluster);
        def.super_read_only = true;
        assert!(matches!(
            rejection(validate(&def, &CapabilityTable).await),
            ValidationError::ReadOnlyFlags(_)
        ));

        let mut def = definition(&dir, "8.0.35", TopologyKind::GroupReplication);
        def.basedir = dir.path().join("missing");
        assert!(matches!(
            rejection(validate(&def, &CapabilityTable).await),
            ValidationError::BasedirNotFound(_)
        ));

        let def = definition(&dir, "eight", TopologyKind::GroupReplication);
        assert!(matches!(
            validate(&def, &CapabilityTable).await,
            Err(MonodbError::InvalidVersion(_))
        ));
    }

    #[tokio::test]
    async fn test_existing_destination_needs_force() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut def = definition(&dir, "8.0.35", TopologyKind::GroupReplication);
        fs::create_dir(&def.sandbox_dir).await?;

        assert!(matches!(
            rejection(validate(&def, &CapabilityTable).await),
            ValidationError::DestinationExists(_)
        ));

        def.force = true;
        assert!(validate(&def, &CapabilityTable).await.is_ok());
        Ok(())
    }
}
