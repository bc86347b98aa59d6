//! Durable discovery progress.
//!
//! On disk the checkpoint is `{ "page": n, "taken_down": [item, ...] }` where
//! each item is the catalog payload with `id` set.

use crate::catalog::CatalogItem;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("failed to read checkpoint {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("checkpoint {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write checkpoint {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode checkpoint: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A confirmed takedown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogItem", into = "CatalogItem")]
pub struct TakedownRecord {
    pub identifier: u64,
    pub item: CatalogItem,
}

impl TakedownRecord {
    pub fn new(identifier: u64, item: CatalogItem) -> Self {
        Self {
            identifier,
            item: item.with_id(identifier),
        }
    }
}

impl TryFrom<CatalogItem> for TakedownRecord {
    type Error = String;

    fn try_from(item: CatalogItem) -> Result<Self, Self::Error> {
        let identifier = item
            .id()
            .ok_or_else(|| "flagged item has no numeric id".to_string())?;
        Ok(Self { identifier, item })
    }
}

impl From<TakedownRecord> for CatalogItem {
    fn from(record: TakedownRecord) -> Self {
        record.item.with_id(record.identifier)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checkpoint {
    /// Next page to process, 1-based.
    pub page: u64,
    pub taken_down: Vec<TakedownRecord>,
}

impl Default for Checkpoint {
    fn default() -> Self {
        Self {
            page: 1,
            taken_down: Vec::new(),
        }
    }
}

impl Checkpoint {
    pub fn is_flagged(&self, identifier: u64) -> bool {
        self.flagged(identifier).is_some()
    }

    pub fn flagged(&self, identifier: u64) -> Option<&TakedownRecord> {
        self.taken_down.iter().find(|r| r.identifier == identifier)
    }

    /// Append `record` unless its identifier is already flagged. Returns
    /// whether it was added.
    pub fn record(&mut self, record: TakedownRecord) -> bool {
        if self.is_flagged(record.identifier) {
            return false;
        }
        self.taken_down.push(record);
        true
    }

    pub fn advance(&mut self) {
        self.page += 1;
    }

    fn normalize(mut self) -> Self {
        self.page = self.page.max(1);
        let mut seen = std::collections::HashSet::new();
        self.taken_down.retain(|r| seen.insert(r.identifier));
        self
    }
}

/// JSON file holding a [`Checkpoint`].
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the checkpoint; a missing file yields the default.
    pub fn load(&self) -> Result<Checkpoint, CheckpointError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no checkpoint, starting fresh");
                return Ok(Checkpoint::default());
            }
            Err(source) => {
                return Err(CheckpointError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let checkpoint: Checkpoint =
            serde_json::from_slice(&raw).map_err(|source| CheckpointError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(checkpoint.normalize())
    }

    /// Write the checkpoint through a temp file in the same directory, then
    /// rename over the old one.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let encoded = serde_json::to_vec_pretty(checkpoint).map_err(CheckpointError::Encode)?;
        let write_err = |source| CheckpointError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&encoded).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::debug!(
            page = checkpoint.page,
            flagged = checkpoint.taken_down.len(),
            "checkpoint saved"
        );
        Ok(())
    }
}
