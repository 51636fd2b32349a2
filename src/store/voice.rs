//! Voice clip blob storage
//!
//! Uploaded `.webm` clips live in a flat directory next to the feedback
//! file. Standalone clips are named `voice_{unix_millis}.webm`; clips
//! attached to a submission answer are named
//! `{feedbackId}_{sectionId}_{questionIndex}.webm`.

use crate::error::{AtelierError, Result};
use crate::types::FeedbackId;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Only standalone clip names are retrievable over the API. This pattern is
/// also the path-traversal guard: no separators, no dots beyond the
/// extension.
static RETRIEVABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^voice_\d+\.webm$").expect("valid clip name pattern"));

/// Directory-backed voice clip store
pub struct VoiceStore {
    dir: PathBuf,
}

impl VoiceStore {
    /// Create a store over the given clip directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Clip directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the clip directory if absent
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            AtelierError::Storage(format!(
                "Failed to create voice directory {}: {}",
                self.dir.display(),
                e
            ))
        })
    }

    /// Persist a standalone clip, returning its generated file name
    pub async fn save_clip(&self, bytes: &[u8]) -> Result<String> {
        let file_name = format!("voice_{}.webm", Utc::now().timestamp_millis());
        self.write_clip(&file_name, bytes).await?;
        Ok(file_name)
    }

    /// Persist a clip belonging to one submission answer
    ///
    /// Returns the URL path recorded in the section's `audio` reference.
    pub async fn save_answer_clip(
        &self,
        feedback_id: &FeedbackId,
        section_id: &str,
        question_index: u32,
        bytes: &[u8],
    ) -> Result<String> {
        let file_name = format!("{feedback_id}_{section_id}_{question_index}.webm");
        self.write_clip(&file_name, bytes).await?;
        Ok(format!("/data/voice/{file_name}"))
    }

    /// Resolve a retrievable clip name to its on-disk path
    ///
    /// Names outside the `voice_{digits}.webm` pattern are rejected as
    /// invalid input; valid names that do not exist yield NotFound.
    pub async fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        if !RETRIEVABLE_NAME.is_match(file_name) {
            return Err(AtelierError::Validation(
                "Invalid or missing filename".to_string(),
            ));
        }

        let path = self.dir.join(file_name);
        if fs::metadata(&path).await.is_err() {
            return Err(AtelierError::NotFound(
                "Voice recording not found".to_string(),
            ));
        }
        Ok(path)
    }

    async fn write_clip(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        self.init().await?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes).await.map_err(|e| {
            AtelierError::Storage(format!(
                "Failed to write voice clip {}: {}",
                path.display(),
                e
            ))
        })
    }
}
