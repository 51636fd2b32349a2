//! Durable feedback storage
//!
//! The store is an append-only JSON array on disk: one file holding every
//! [`FeedbackRecord`] in arrival order. Appends are serialized behind an
//! in-process mutex (two concurrent submissions must not lose a write) and
//! land via write-temp-then-rename so a crash mid-write can never corrupt
//! previously persisted records.

pub mod legacy;
pub mod voice;

use crate::error::{AtelierError, Result};
use crate::types::FeedbackRecord;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

/// File-backed feedback record store
pub struct FeedbackStore {
    path: PathBuf,
    /// Serializes the read-modify-write append cycle for this file
    write_lock: Mutex<()>,
}

impl FeedbackStore {
    /// Create a store over the given backing file
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and an empty array file if absent
    pub async fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AtelierError::Storage(format!(
                    "Failed to create data directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        if fs::metadata(&self.path).await.is_err() {
            self.write_atomic(b"[]").await?;
        }
        Ok(())
    }

    /// Append one record, persisting the whole updated collection
    ///
    /// Never fails silently: any read, serialize, or write failure surfaces
    /// to the caller and leaves the existing file untouched.
    pub async fn append(&self, record: &FeedbackRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        // Raw values, not typed records: legacy items must be written back
        // byte-for-byte in their stored shape, never their upgraded one.
        let mut items = self.read_items_strict().await?;
        items.push(serde_json::to_value(record)?);

        let serialized = serde_json::to_string_pretty(&items)?;
        self.write_atomic(serialized.as_bytes()).await
    }

    /// Load the full ordered record sequence, legacy items upgraded
    ///
    /// Missing backing file yields an empty sequence. Malformed content is
    /// logged and treated as empty so read paths stay available in a
    /// degraded mode.
    pub async fn load_all(&self) -> Result<Vec<FeedbackRecord>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AtelierError::Storage(format!(
                    "Failed to read feedback file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let items: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                warn!(
                    "Feedback file {} does not hold a JSON array, treating as empty",
                    self.path.display()
                );
                Vec::new()
            }
            Err(e) => {
                warn!(
                    "Feedback file {} is not valid JSON, treating as empty: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        };

        Ok(items.iter().map(legacy::normalize).collect())
    }

    /// Read raw stored items for the append cycle
    ///
    /// Unlike [`load_all`], malformed content is an error here: silently
    /// replacing an unreadable file with a one-element array would discard
    /// whatever it held.
    async fn read_items_strict(&self) -> Result<Vec<Value>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AtelierError::Storage(format!(
                    "Failed to read feedback file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str(&raw) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => Err(AtelierError::Storage(format!(
                "Feedback file {} does not hold a JSON array",
                self.path.display()
            ))),
            Err(e) => Err(AtelierError::Storage(format!(
                "Feedback file {} is not valid JSON: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Write the full file contents via a sibling temp file and rename
    async fn write_atomic(&self, contents: &[u8]) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, contents).await.map_err(|e| {
            AtelierError::Storage(format!(
                "Failed to write feedback file {}: {}",
                tmp.display(),
                e
            ))
        })?;

        fs::rename(&tmp, &self.path).await.map_err(|e| {
            AtelierError::Storage(format!(
                "Failed to replace feedback file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}
