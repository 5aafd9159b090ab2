//! Upload and download plumbing for file payloads.
//!
//! Downloads are staged in a named temporary file and persisted into the
//! destination directory, so a failed write never leaves a partial file
//! under the final name.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Read a local file for upload, returning its display name and payload.
pub async fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let payload = tokio::fs::read(path).await?;
    Ok((filename, payload))
}

/// Where downloads land: the platform download directory, falling back to
/// the current working directory.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Persist a downloaded payload into `dir`, never clobbering an existing
/// file. Returns the final destination path.
pub fn persist_download(dir: &Path, filename: &str, payload: &[u8]) -> Result<PathBuf> {
    let dest = available_name(dir, filename);

    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(payload)?;
    staged.flush()?;
    staged.persist(&dest).map_err(|e| e.error)?;

    debug!("persisted download to {}", dest.display());
    Ok(dest)
}

/// First non-existing variant of `filename` in `dir`: `name.ext`,
/// `name (1).ext`, `name (2).ext`, ...
fn available_name(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    };

    for n in 1.. {
        let name = match ext {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_download_writes_payload() {
        let dir = tempfile::tempdir().unwrap();
        let dest = persist_download(dir.path(), "a.txt", b"hello").unwrap();
        assert_eq!(dest, dir.path().join("a.txt"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");
    }

    #[test]
    fn test_persist_download_avoids_clobbering() {
        let dir = tempfile::tempdir().unwrap();
        let first = persist_download(dir.path(), "a.txt", b"one").unwrap();
        let second = persist_download(dir.path(), "a.txt", b"two").unwrap();
        assert_eq!(first, dir.path().join("a.txt"));
        assert_eq!(second, dir.path().join("a (1).txt"));
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }

    #[test]
    fn test_available_name_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README"), b"x").unwrap();
        assert_eq!(
            available_name(dir.path(), "README"),
            dir.path().join("README (1)")
        );
    }

    #[tokio::test]
    async fn test_read_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        std::fs::write(&path, b"data").unwrap();

        let (filename, payload) = read_upload(&path).await.unwrap();
        assert_eq!(filename, "payload.bin");
        assert_eq!(payload, b"data");
    }
}
