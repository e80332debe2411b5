//! Local filesystem ledger.
//!
//! Saves go to a sibling temp file that is then renamed over the ledger, so
//! a crash mid-write leaves the previous ledger intact. Older ledgers that
//! are a bare JSON array of identities still load.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::SeenSet;
use crate::storage::{LedgerData, SeenStore};

/// JSON file ledger.
#[derive(Debug, Clone)]
pub struct LocalLedger {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LedgerFile {
    Current(LedgerData),
    Legacy(SeenSet),
}

impl LocalLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the ledger, distinguishing absence (`None`) from failure.
    pub async fn read(&self) -> Result<Option<SeenSet>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::Io(e)),
        };

        let seen = match serde_json::from_slice::<LedgerFile>(&bytes)? {
            LedgerFile::Current(data) => data.seen,
            LedgerFile::Legacy(seen) => seen,
        };
        Ok(Some(seen))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SeenStore for LocalLedger {
    async fn load(&self) -> SeenSet {
        match self.read().await {
            Ok(Some(seen)) => {
                log::info!(
                    "Loaded {} seen postings from {}",
                    seen.len(),
                    self.path.display()
                );
                seen
            }
            Ok(None) => {
                log::info!("No ledger at {}, starting empty", self.path.display());
                SeenSet::new()
            }
            Err(e) => {
                log::warn!(
                    "Ledger at {} is unreadable ({}), starting empty",
                    self.path.display(),
                    e
                );
                SeenSet::new()
            }
        }
    }

    async fn save(&self, seen: &SeenSet) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&LedgerData::new(seen.clone()))?;
        self.write_bytes(&bytes).await?;
        log::info!("Saved {} seen postings to {}", seen.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostingIdentity;
    use tempfile::TempDir;

    fn id(s: &str) -> PostingIdentity {
        PostingIdentity::from(s.to_string())
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let ledger = LocalLedger::new(tmp.path().join("history.json"));

        assert!(ledger.read().await.unwrap().is_none());
        assert!(ledger.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        std::fs::write(&path, b"{\"seen\": [tru").unwrap();
        let ledger = LocalLedger::new(&path);

        assert!(ledger.read().await.is_err());
        assert!(ledger.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let ledger = LocalLedger::new(tmp.path().join("history.json"));
        let seen: SeenSet = [id("Acme::QA Analyst"), id("Globex::Support Lead")]
            .into_iter()
            .collect();

        ledger.save(&seen).await.unwrap();
        let first = ledger.load().await;
        ledger.save(&first).await.unwrap();
        let second = LocalLedger::new(ledger.path()).load().await;

        assert_eq!(first, seen);
        assert_eq!(second, seen);
        assert!(!tmp.path().join("history.tmp").exists());
    }

    #[tokio::test]
    async fn save_overwrites_previous_content() {
        let tmp = TempDir::new().unwrap();
        let ledger = LocalLedger::new(tmp.path().join("nested/dir/history.json"));

        ledger.save(&[id("a"), id("b")].into_iter().collect()).await.unwrap();
        ledger.save(&[id("c")].into_iter().collect()).await.unwrap();

        let loaded = ledger.load().await;
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains(&id("c")));
    }

    #[tokio::test]
    async fn legacy_array_ledger_loads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        std::fs::write(&path, br#"["Acme::QA Analyst", "Acme::Support Lead"]"#).unwrap();

        let loaded = LocalLedger::new(&path).load().await;
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains(&id("Acme::Support Lead")));
    }
}
