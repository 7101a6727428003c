//! Disk writer
//!
//! Creates the per-query target directory and persists downloaded bytes.
//! Both directories and files are created owner read/write/execute (0o744)
//! on Unix.

use crate::download::naming::escape_component;
use crate::{Result, TrawlError};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o744;

/// Creates `<root>/<escaped query>` and returns its path
///
/// The directory must not exist yet. Creation is not recursive, so a
/// missing `root` is an error as well.
pub async fn create_target_dir(root: &Path, query: &str) -> Result<PathBuf> {
    let path = root.join(escape_component(query));

    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    builder.mode(OUTPUT_MODE);

    builder
        .create(&path)
        .await
        .map_err(|source| TrawlError::TargetDir {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

/// Writes `bytes` to `path`, replacing any existing file
///
/// With `atomic` the bytes land in a sibling `.part` file first and are
/// renamed into place; the `.part` file is removed if anything fails.
/// Without it a failure can leave a truncated file behind.
pub async fn write_image(path: &Path, bytes: &[u8], atomic: bool) -> Result<()> {
    if !atomic {
        return write_file(path, bytes).await;
    }

    let part = part_path(path)?;
    let result = match write_file(&part, bytes).await {
        Ok(()) => fs::rename(&part, path)
            .await
            .map_err(|source| TrawlError::Write {
                path: path.to_path_buf(),
                source,
            }),
        Err(e) => Err(e),
    };

    if result.is_err() {
        if let Err(e) = fs::remove_file(&part).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::debug!("Could not remove {}: {}", part.display(), e);
            }
        }
    }

    result
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let to_write_error = |source: std::io::Error| TrawlError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(OUTPUT_MODE);

    let mut file = options.open(path).await.map_err(to_write_error)?;
    file.write_all(bytes).await.map_err(to_write_error)?;
    file.flush().await.map_err(to_write_error)?;

    Ok(())
}

fn part_path(path: &Path) -> Result<PathBuf> {
    let Some(name) = path.file_name() else {
        return Err(TrawlError::Write {
            path: path.to_path_buf(),
            source: std::io::Error::new(ErrorKind::InvalidInput, "path has no file name"),
        });
    };

    let mut part_name = OsString::from(name);
    part_name.push(".part");
    Ok(path.with_file_name(part_name))
}
