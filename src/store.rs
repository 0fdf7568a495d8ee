use std::path::PathBuf;

use thiserror::Error;

use crate::types::Story;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no cache directory available on this platform")]
    NoCacheDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistent story cache: one JSON file per story id.
///
/// A record is written once on first fetch and then only rewritten when the
/// story is hidden. There is no expiry and no migration; a schema change
/// requires wiping the directory (`clear`, surfaced as `--clear-cache`).
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// XDG-compatible cache directory: ~/.cache/hnbest/ (Linux) or
    /// ~/Library/Caches/hnbest/ (macOS).
    pub fn open_default() -> Result<Self, StoreError> {
        let root = dirs::cache_dir().ok_or(StoreError::NoCacheDir)?.join("hnbest");
        Self::open(root)
    }

    pub fn open(root: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path(&self, id: u64) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    /// Read a cached story. Returns None when the record is missing,
    /// unreadable, or fails to parse; a bad record reads as a miss so the
    /// caller refetches and overwrites it.
    pub fn get(&self, id: u64) -> Option<Story> {
        let data = std::fs::read_to_string(self.path(id)).ok()?;
        serde_json::from_str(&data).ok()
    }

    pub fn put(&self, story: &Story) -> Result<(), StoreError> {
        let data = serde_json::to_string(story)?;
        std::fs::write(self.path(story.id), data)?;
        Ok(())
    }

    /// Wipe every cached record.
    pub fn clear(&self) -> Result<(), StoreError> {
        std::fs::remove_dir_all(&self.root)?;
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }
}
