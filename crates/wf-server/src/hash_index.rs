//! Content-hash index for uploaded images.
//!
//! Maps the hex MD5 of an image's bytes to the file name it was stored
//! under, so re-uploading identical bytes returns the existing URL. The map
//! is persisted as a flat JSON object next to the uploads.

use std::collections::BTreeMap;
use std::path::PathBuf;

use md5::{Digest, Md5};

use crate::error::Result;

/// Hex-encoded MD5 digest of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes).as_slice())
}

/// hash → stored file name, backed by a JSON file.
#[derive(Debug, Default)]
pub struct ImageHashIndex {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ImageHashIndex {
    /// Load the index from `path`. A missing file is created empty; an
    /// unreadable one is logged and treated as empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(entries) => {
                    log::info!("loaded image hash map from {}", path.display());
                    entries
                }
                Err(err) => {
                    log::warn!("ignoring unreadable image hash map {}: {err}", path.display());
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, "{}")?;
                log::info!("created image hash map at {}", path.display());
                BTreeMap::new()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn get(&self, hash: &str) -> Option<&str> {
        self.entries.get(hash).map(String::as_str)
    }

    pub fn insert(&mut self, hash: String, file_name: String) -> Option<String> {
        self.entries.insert(hash, file_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the index back to its file (temp file + rename).
    pub async fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        log::debug!("saved image hash map ({} entries)", self.entries.len());
        Ok(())
    }
}
