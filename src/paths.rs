use std::path::{Path, PathBuf};

use stacked_errors::{bail_locationless, Result, StackableErr};
use tokio::fs;

/// Canonicalizes and checks the existence of a file path. Also adds on better
/// information to errors.
///
/// Note: this does not prevent TOCTOU bugs.
pub async fn acquire_file_path(file_path: impl AsRef<Path>) -> Result<PathBuf> {
    let file_path = file_path.as_ref();
    let path = fs::canonicalize(file_path)
        .await
        .stack_err_with_locationless(|| format!("acquire_file_path(file_path: {file_path:?})"))?;
    if path.is_file() {
        Ok(simplified(path))
    } else {
        bail_locationless!("acquire_file_path(file_path: {file_path:?}) -> is not a file")
    }
}

/// Canonicalizes and checks the existence of a directory path. Also adds on
/// better information to errors.
///
/// Note: this does not prevent TOCTOU bugs.
pub async fn acquire_dir_path(dir_path: impl AsRef<Path>) -> Result<PathBuf> {
    let dir_path = dir_path.as_ref();
    let path = fs::canonicalize(dir_path)
        .await
        .stack_err_with_locationless(|| format!("acquire_dir_path(dir_path: {dir_path:?})"))?;
    if path.is_dir() {
        Ok(simplified(path))
    } else {
        bail_locationless!("acquire_dir_path(dir_path: {dir_path:?}) -> is not a directory")
    }
}

/// Returns if the directory has no entries
pub async fn dir_is_empty(dir_path: impl AsRef<Path>) -> Result<bool> {
    let dir_path = dir_path.as_ref();
    let mut entries = fs::read_dir(dir_path)
        .await
        .stack_err_with_locationless(|| format!("dir_is_empty(dir_path: {dir_path:?})"))?;
    let first = entries
        .next_entry()
        .await
        .stack_err_with_locationless(|| format!("dir_is_empty(dir_path: {dir_path:?})"))?;
    Ok(first.is_none())
}

/// The string form of a path as it gets passed to the container runtime
/// client
pub fn path_arg(path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().into_owned()
}

// the runtime clients do not understand `\\?\` verbatim prefixes on Windows
fn simplified(path: PathBuf) -> PathBuf {
    dunce::simplified(&path).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_checks_kind() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "a").await.unwrap();
        assert!(acquire_dir_path(dir.path()).await.is_ok());
        assert!(acquire_dir_path(&file).await.is_err());
        assert!(acquire_file_path(&file).await.unwrap().is_absolute());
        assert!(acquire_file_path(dir.path()).await.is_err());
        assert!(acquire_dir_path(dir.path().join("missing")).await.is_err());
    }

    #[tokio::test]
    async fn emptiness() {
        let dir = tempfile::tempdir().unwrap();
        assert!(dir_is_empty(dir.path()).await.unwrap());
        fs::create_dir(dir.path().join("sub")).await.unwrap();
        assert!(!dir_is_empty(dir.path()).await.unwrap());
    }
}
