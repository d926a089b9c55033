//! Shared fixtures for notes-components integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use notes_components::fs::{DirEntryInfo, DownloadResult, FileSystem, LocalFileSystem};
use notes_components::hash_utils::archive_checksum;
use notes_components::{AlertService, ComponentResult, ConfirmRequest, FeatureRegistry};
use zip::write::FileOptions;

/// Real local filesystem with canned network responses.
pub struct CannedNetworkFs {
    local: LocalFileSystem,
    responses: Mutex<HashMap<String, (u16, Vec<u8>)>>,
    pub downloads: AtomicUsize,
}

impl CannedNetworkFs {
    pub fn new() -> Self {
        Self {
            local: LocalFileSystem::new(Duration::from_secs(5)).unwrap(),
            responses: Mutex::new(HashMap::new()),
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn respond(&self, url: &str, status: u16, body: Vec<u8>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body));
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileSystem for CannedNetworkFs {
    async fn exists(&self, path: &Path) -> bool {
        self.local.exists(path).await
    }

    async fn read_file_text(&self, path: &Path) -> ComponentResult<String> {
        self.local.read_file_text(path).await
    }

    async fn read_file_base64(&self, path: &Path) -> ComponentResult<String> {
        self.local.read_file_base64(path).await
    }

    async fn read_dir(&self, path: &Path) -> ComponentResult<Vec<DirEntryInfo>> {
        self.local.read_dir(path).await
    }

    async fn unlink(&self, path: &Path) -> ComponentResult<()> {
        self.local.unlink(path).await
    }

    async fn move_file(&self, from: &Path, to: &Path) -> ComponentResult<()> {
        self.local.move_file(from, to).await
    }

    async fn download_file(&self, url: &str, dest: &Path) -> ComponentResult<DownloadResult> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or((404, Vec::new()));

        if !(200..300).contains(&status) {
            return Ok(DownloadResult {
                status_code: status,
                bytes_written: 0,
            });
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &body).await?;
        Ok(DownloadResult {
            status_code: status,
            bytes_written: body.len() as u64,
        })
    }
}

/// Zip bytes holding `entries` as `(name, body)` pairs.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        for (name, body) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

pub fn component_zip(version: &str) -> Vec<u8> {
    zip_bytes(&[
        ("package.json", &format!(r#"{{"version": "{version}"}}"#)),
        ("dist/index.html", "<html><body>editor</body></html>"),
    ])
}

/// Registry with one first-party editor whose checksum is `checksum`.
pub fn registry_with(identifier: &str, url: &str, version: &str, checksum: &str) -> Arc<FeatureRegistry> {
    let features = format!(
        r#"[{{
            "identifier": "{identifier}",
            "name": "Example Editor",
            "download_url": "{url}",
            "version": "{version}",
            "index_path": "dist/index.html"
        }}]"#
    );
    let checksums = format!(r#"{{"{identifier}": "{checksum}"}}"#);
    Arc::new(FeatureRegistry::from_json(&features, &checksums).unwrap())
}

/// Registry whose checksum matches `archive`.
pub fn registry_for_archive(identifier: &str, url: &str, version: &str, archive: &[u8]) -> Arc<FeatureRegistry> {
    registry_with(identifier, url, version, &archive_checksum(archive))
}

pub fn write_manifest(install_dir: &Path, body: &str) -> PathBuf {
    std::fs::create_dir_all(install_dir).unwrap();
    let path = install_dir.join("package.json");
    std::fs::write(&path, body).unwrap();
    path
}

/// Alert service that records alerts and answers confirms with `approve`.
#[derive(Default)]
pub struct RecordingAlerts {
    pub approve: bool,
    pub alerts: Mutex<Vec<(String, String)>>,
}

impl RecordingAlerts {
    pub fn alert_count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

#[async_trait]
impl AlertService for RecordingAlerts {
    async fn alert(&self, title: &str, text: &str) {
        self.alerts
            .lock()
            .unwrap()
            .push((title.to_string(), text.to_string()));
    }

    async fn confirm(&self, _request: &ConfirmRequest) -> ComponentResult<bool> {
        Ok(self.approve)
    }
}
