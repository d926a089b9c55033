//! Zip extraction for downloaded component archives.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::ComponentResult;

#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Unpack `archive` into `dest`, creating `dest` if needed.
    async fn unzip(&self, archive: &Path, dest: &Path) -> ComponentResult<()>;
}

/// Extracts `.zip` archives on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

#[async_trait]
impl ArchiveExtractor for ZipExtractor {
    async fn unzip(&self, archive: &Path, dest: &Path) -> ComponentResult<()> {
        let archive: PathBuf = archive.to_path_buf();
        let dest: PathBuf = dest.to_path_buf();
        let extracted =
            tokio::task::spawn_blocking(move || extract_zip_to_dir(&archive, &dest)).await??;
        debug!(entries = extracted, "Archive extracted");
        Ok(())
    }
}

/// Extract every entry of `zip_path` under `dst_dir`; returns the number of
/// files written. Entries whose names would land outside `dst_dir` are skipped.
pub fn extract_zip_to_dir(zip_path: &Path, dst_dir: &Path) -> ComponentResult<usize> {
    let file = fs::File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;
    fs::create_dir_all(dst_dir)?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let Some(rel) = entry.enclosed_name().map(|p| p.to_owned()) else {
            warn!(entry = %entry.name(), "Skipping archive entry outside the destination");
            continue;
        };

        let out_path = dst_dir.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out_file = fs::File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out_file)?;
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_extracts_nested_entries() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("component.zip");
        write_zip(
            &zip_path,
            &[
                ("package.json", r#"{"version":"1.0.0"}"#),
                ("dist/index.html", "<html></html>"),
            ],
        );

        let dest = temp.path().join("out");
        let count = extract_zip_to_dir(&zip_path, &dest).unwrap();
        assert_eq!(count, 2);
        assert!(dest.join("package.json").is_file());
        assert_eq!(
            fs::read_to_string(dest.join("dist/index.html")).unwrap(),
            "<html></html>"
        );
    }

    #[test]
    fn test_skips_entries_escaping_destination() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("evil.zip");
        write_zip(&zip_path, &[("../escaped.txt", "x"), ("ok.txt", "y")]);

        let dest = temp.path().join("out");
        let count = extract_zip_to_dir(&zip_path, &dest).unwrap();
        assert_eq!(count, 1);
        assert!(!temp.path().join("escaped.txt").exists());
        assert!(dest.join("ok.txt").exists());
    }

    #[test]
    fn test_corrupt_archive_is_an_error() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("broken.zip");
        fs::write(&zip_path, b"definitely not a zip").unwrap();
        assert!(extract_zip_to_dir(&zip_path, &temp.path().join("out")).is_err());
    }

    #[tokio::test]
    async fn test_async_unzip() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("component.zip");
        write_zip(&zip_path, &[("index.html", "hi")]);

        let dest = temp.path().join("installed");
        ZipExtractor.unzip(&zip_path, &dest).await.unwrap();
        assert_eq!(fs::read_to_string(dest.join("index.html")).unwrap(), "hi");
    }
}
