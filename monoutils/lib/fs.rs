//! `monoutils::fs` contains filesystem helpers shared by the monodb crates.

use std::path::{Path, PathBuf};

use tokio::{fs, io::AsyncWriteExt};

use crate::{MonoutilsError, MonoutilsResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Permission bits used for generated scripts.
pub const EXECUTABLE_MODE: u32 = 0o755;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Replaces the contents of `path` atomically.
///
/// The data is written to a temporary file in the same directory, flushed to disk and then
/// renamed over the destination, so readers only ever observe the old or the new contents.
pub async fn write_atomic(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> MonoutilsResult<()> {
    let path = path.as_ref();
    let tmp_path = temporary_sibling(path)?;

    let result = async {
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(contents.as_ref()).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp_path, path).await
    }
    .await;

    if let Err(source) = result {
        // The rename never happened, so the temporary file is the only leftover.
        if let Err(e) = fs::remove_file(&tmp_path).await {
            tracing::debug!("error removing {}: {}", tmp_path.display(), e);
        }
        return Err(MonoutilsError::AtomicWrite {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

/// Writes `contents` to `path` and marks the file as executable.
pub async fn write_executable(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> MonoutilsResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let path = path.as_ref();
    fs::write(path, contents).await?;
    fs::set_permissions(path, std::fs::Permissions::from_mode(EXECUTABLE_MODE)).await?;

    Ok(())
}

fn temporary_sibling(path: &Path) -> MonoutilsResult<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        MonoutilsError::PathValidation(format!("{} has no file name", path.display()))
    })?;

    let tmp_name = format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4().simple()
    );

    Ok(path.with_file_name(tmp_name))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_atomic_replaces_contents() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sandboxes.json");

        write_atomic(&path, "{}").await?;
        write_atomic(&path, r#"{"a":1}"#).await?;

        assert_eq!(fs::read_to_string(&path).await?, r#"{"a":1}"#);

        // No temporary files are left behind.
        let mut entries = fs::read_dir(dir.path()).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["sandboxes.json".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_write_atomic_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("sandboxes.json");

        let result = write_atomic(&path, "{}").await;
        assert!(matches!(result, Err(MonoutilsError::AtomicWrite { .. })));
    }

    #[tokio::test]
    async fn test_write_executable_sets_mode() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("start_all");
        write_executable(&path, "#!/bin/bash\n").await?;

        let mode = fs::metadata(&path).await?.permissions().mode();
        assert_eq!(mode & 0o777, EXECUTABLE_MODE);

        Ok(())
    }
}
