//! Filesystem gateway used by the download pipeline and path resolver.
//!
//! Everything the manager does to disk or the network goes through
//! [`FileSystem`], which keeps the pipeline testable against a temp directory
//! with canned downloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::ComponentResult;
use crate::hash_utils::encode_base64;

/// One directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub is_directory: bool,
}

/// Transport result of a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadResult {
    pub status_code: u16,
    pub bytes_written: u64,
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;

    async fn read_file_text(&self, path: &Path) -> ComponentResult<String>;

    /// File contents as standard base64 text.
    async fn read_file_base64(&self, path: &Path) -> ComponentResult<String>;

    async fn read_dir(&self, path: &Path) -> ComponentResult<Vec<DirEntryInfo>>;

    /// Remove a file or a whole directory tree. Missing paths are not an error.
    async fn unlink(&self, path: &Path) -> ComponentResult<()>;

    /// Rename `from` to `to`, creating `to`'s parent if needed.
    async fn move_file(&self, from: &Path, to: &Path) -> ComponentResult<()>;

    /// Fetch `url` into `dest`. The body is only written for 2xx responses.
    async fn download_file(&self, url: &str, dest: &Path) -> ComponentResult<DownloadResult>;
}

/// [`FileSystem`] backed by `tokio::fs` and a `reqwest` client.
pub struct LocalFileSystem {
    client: Client,
}

impl LocalFileSystem {
    pub fn new(timeout: Duration) -> ComponentResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("notes-components/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read_file_text(&self, path: &Path) -> ComponentResult<String> {
        Ok(fs::read_to_string(path).await?)
    }

    async fn read_file_base64(&self, path: &Path) -> ComponentResult<String> {
        let bytes = fs::read(path).await?;
        Ok(encode_base64(&bytes))
    }

    async fn read_dir(&self, path: &Path) -> ComponentResult<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(path).await?;
        while let Some(entry) = dir.next_entry().await? {
            let is_directory = entry.file_type().await?.is_dir();
            entries.push(DirEntryInfo {
                path: entry.path(),
                is_directory,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn unlink(&self, path: &Path) -> ComponentResult<()> {
        let metadata = match fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            fs::remove_dir_all(path).await?;
        } else {
            fs::remove_file(path).await?;
        }
        debug!(path = %path.display(), "Removed");
        Ok(())
    }

    async fn move_file(&self, from: &Path, to: &Path) -> ComponentResult<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(from, to).await?;
        debug!(from = %from.display(), to = %to.display(), "Moved");
        Ok(())
    }

    async fn download_file(&self, url: &str, dest: &Path) -> ComponentResult<DownloadResult> {
        debug!(url = %url, dest = %dest.display(), "Downloading");
        let mut response = self.client.get(url).send().await?;
        let status_code = response.status().as_u16();

        if !response.status().is_success() {
            warn!(url = %url, status = status_code, "Download returned non-success status");
            return Ok(DownloadResult {
                status_code,
                bytes_written: 0,
            });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(dest).await?;
        let mut bytes_written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        file.flush().await?;

        info!(url = %url, size = bytes_written, "Download complete");
        Ok(DownloadResult {
            status_code,
            bytes_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gateway() -> LocalFileSystem {
        LocalFileSystem::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_read_dir_reports_directories() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("dist")).unwrap();
        std::fs::write(temp.path().join("package.json"), "{}").unwrap();

        let entries = gateway().read_dir(temp.path()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].path.ends_with("dist"));
        assert!(entries[0].is_directory);
        assert!(!entries[1].is_directory);
    }

    #[tokio::test]
    async fn test_unlink_handles_files_dirs_and_missing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("component");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("nested/file.txt"), "x").unwrap();
        let file = temp.path().join("archive.zip");
        std::fs::write(&file, "zip").unwrap();

        let fs = gateway();
        fs.unlink(&dir).await.unwrap();
        fs.unlink(&file).await.unwrap();
        fs.unlink(&temp.path().join("missing")).await.unwrap();

        assert!(!fs.exists(&dir).await);
        assert!(!fs.exists(&file).await);
    }

    #[tokio::test]
    async fn test_move_creates_parent_and_base64_read() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("a.bin");
        std::fs::write(&from, b"hello").unwrap();
        let to = temp.path().join("deep/dir/b.bin");

        let fs = gateway();
        fs.move_file(&from, &to).await.unwrap();
        assert!(!fs.exists(&from).await);
        assert_eq!(fs.read_file_base64(&to).await.unwrap(), "aGVsbG8=");
    }

    #[test]
    fn test_download_result_success_range() {
        let ok = DownloadResult {
            status_code: 204,
            bytes_written: 0,
        };
        let redirect = DownloadResult {
            status_code: 302,
            bytes_written: 0,
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
