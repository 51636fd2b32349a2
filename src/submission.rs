//! Submission handling: validate, normalize, score, persist
//!
//! One handler serves both ingestion shapes: JSON bodies carrying a ready
//! section map, and multipart forms using the
//! `{sectionId}_{questionIndex}_{kind}` field-name grammar. Section ids may
//! themselves contain underscores, so field names parse from the right.
//!
//! A successful submission performs exactly one store append; any
//! validation failure rejects the whole payload with nothing persisted.

use crate::error::{AtelierError, Result};
use crate::sentiment;
use crate::store::{voice::VoiceStore, FeedbackStore};
use crate::types::{
    AudioRef, FeedbackId, FeedbackRecord, FeedbackType, SectionAnswer, SubmissionMetadata,
};
use chrono::Utc;
use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Answer kind carried by a multipart field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Voice,
}

/// Parsed multipart field name: section id, question index, kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    pub section_id: String,
    pub question_index: u32,
    pub kind: FieldKind,
}

/// Parse a `{sectionId}_{questionIndex}_{kind}` field name
///
/// The section id is everything left of the last two underscore-separated
/// parts, so `brand_image_0_text` yields section `brand_image`.
pub fn parse_field_key(name: &str) -> Result<FieldKey> {
    let mut parts = name.rsplitn(3, '_');
    let kind = parts.next();
    let index = parts.next();
    let section = parts.next();

    let (Some(kind), Some(index), Some(section)) = (kind, index, section) else {
        return Err(AtelierError::Validation(format!(
            "Malformed field name: {name}"
        )));
    };

    let kind = match kind {
        "text" => FieldKind::Text,
        "voice" => FieldKind::Voice,
        other => {
            return Err(AtelierError::Validation(format!(
                "Unknown answer kind '{other}' in field name: {name}"
            )))
        }
    };

    let question_index: u32 = index.parse().map_err(|_| {
        AtelierError::Validation(format!("Non-numeric question index in field name: {name}"))
    })?;

    if section.is_empty() {
        return Err(AtelierError::Validation(format!(
            "Empty section id in field name: {name}"
        )));
    }

    Ok(FieldKey {
        section_id: section.to_string(),
        question_index,
        kind,
    })
}

/// One section's incoming answer, before persistence
#[derive(Debug, Default, Clone)]
pub struct SectionInput {
    pub text: Option<String>,
    /// URL of an already-stored clip (JSON path)
    pub audio_url: Option<String>,
    /// Raw clip bytes plus question index (multipart path)
    pub clip: Option<(u32, Vec<u8>)>,
}

/// Normalized submission: one entry per section actually answered
#[derive(Debug, Default, Clone)]
pub struct SubmissionPayload {
    pub feedback_type: Option<FeedbackType>,
    pub sections: IndexMap<String, SectionInput>,
}

impl SubmissionPayload {
    /// Add one multipart field; the name decides text vs voice
    pub fn add_field(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        let key = parse_field_key(name)?;
        let entry = self.sections.entry(key.section_id).or_default();
        match key.kind {
            FieldKind::Text => {
                let text = String::from_utf8(data).map_err(|_| {
                    AtelierError::Validation(format!("Field {name} is not valid UTF-8"))
                })?;
                entry.text = Some(text);
            }
            FieldKind::Voice => {
                entry.clip = Some((key.question_index, data));
            }
        }
        Ok(())
    }
}

/// JSON body shape for POST /feedback
#[derive(Debug, Deserialize)]
pub struct JsonSubmission {
    #[serde(rename = "type", default)]
    pub feedback_type: Option<FeedbackType>,
    #[serde(default)]
    pub sections: IndexMap<String, JsonSection>,
}

/// One section answer as sent in a JSON body
#[derive(Debug, Deserialize)]
pub struct JsonSection {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub audio: Option<AudioRef>,
}

impl From<JsonSubmission> for SubmissionPayload {
    fn from(body: JsonSubmission) -> Self {
        let sections = body
            .sections
            .into_iter()
            .map(|(id, section)| {
                (
                    id,
                    SectionInput {
                        text: section.text,
                        audio_url: section.audio.map(|a| a.url),
                        clip: None,
                    },
                )
            })
            .collect();
        Self {
            feedback_type: body.feedback_type,
            sections,
        }
    }
}

/// Turns validated payloads into persisted feedback records
pub struct SubmissionHandler {
    store: Arc<FeedbackStore>,
    voice: Arc<VoiceStore>,
}

impl SubmissionHandler {
    pub fn new(store: Arc<FeedbackStore>, voice: Arc<VoiceStore>) -> Self {
        Self { store, voice }
    }

    /// Persist one submission: voice clips first, then the scored record
    pub async fn submit(
        &self,
        payload: SubmissionPayload,
        metadata: Option<SubmissionMetadata>,
    ) -> Result<FeedbackRecord> {
        let id = FeedbackId::generate();
        let timestamp = Utc::now();

        let mut sections: IndexMap<String, SectionAnswer> = IndexMap::new();
        for (section_id, input) in payload.sections {
            let audio = if let Some((question_index, bytes)) = input.clip {
                let url = self
                    .voice
                    .save_answer_clip(&id, &section_id, question_index, &bytes)
                    .await?;
                Some(AudioRef { url })
            } else {
                input.audio_url.map(|url| AudioRef { url })
            };

            sections.insert(
                section_id.clone(),
                SectionAnswer {
                    id: section_id,
                    text: input.text,
                    audio,
                },
            );
        }

        let record = FeedbackRecord {
            id,
            timestamp,
            feedback_type: Some(payload.feedback_type.unwrap_or(FeedbackType::Text)),
            sections,
            sentiment: None,
            metadata,
        };

        // Score once, on the concatenation of all text answers
        let joined = record.joined_text();
        let record = FeedbackRecord {
            sentiment: Some(sentiment::analyze(&joined)),
            ..record
        };

        debug!(
            "Submitting feedback {} with {} section(s)",
            record.id,
            record.sections.len()
        );
        self.store.append(&record).await?;
        info!("Stored feedback {}", record.id);

        Ok(record)
    }
}
