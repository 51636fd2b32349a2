//! Legacy-record detection and one-way upgrade
//!
//! Early deployments persisted flat records: `{id, timestamp, <section>:
//! <text>, ...}` with no `sections` map and no stored sentiment. Those
//! records are upgraded to the current shape on every read, never rewritten
//! on disk, so old files stay inspectable by older tooling.

use crate::sentiment;
use crate::types::{FeedbackId, FeedbackRecord, FeedbackType, SectionAnswer, Sentiment};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;

/// Fields of a legacy record that are not free-text answers
const RESERVED_FIELDS: [&str; 2] = ["id", "timestamp"];

/// Whether a raw stored item already matches the current record shape
pub fn is_current(value: &Value) -> bool {
    value.get("sections").is_some()
        && value
            .pointer("/sentiment/label")
            .is_some_and(|label| !label.is_null())
}

/// Upgrade a legacy-shape item to a current-shape record
///
/// Every non-reserved string field with non-blank content becomes a text
/// section keyed by the field name; sentiment is recomputed from the joined
/// section texts. Pure: the stored form is never mutated.
pub fn upgrade(value: &Value) -> FeedbackRecord {
    let mut sections: IndexMap<String, SectionAnswer> = IndexMap::new();

    if let Some(object) = value.as_object() {
        for (key, field) in object {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            if let Some(text) = field.as_str() {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    sections.insert(
                        key.clone(),
                        SectionAnswer {
                            id: key.clone(),
                            text: Some(trimmed.to_string()),
                            audio: None,
                        },
                    );
                }
            }
        }
    }

    let joined = sections
        .values()
        .filter_map(|s| s.text.as_deref())
        .collect::<Vec<_>>()
        .join(" ");
    let sentiment = if joined.is_empty() {
        sentiment::analyze("neutral")
    } else {
        sentiment::analyze(&joined)
    };

    FeedbackRecord {
        id: legacy_id(value),
        timestamp: legacy_timestamp(value),
        feedback_type: Some(FeedbackType::Text),
        sections,
        sentiment: Some(sentiment),
        metadata: None,
    }
}

/// Normalize one raw stored item to the current shape
///
/// Current-shape items pass through; legacy items are upgraded; items that
/// fit neither shape collapse to an empty neutral record rather than
/// failing the whole read.
pub fn normalize(value: &Value) -> FeedbackRecord {
    if is_current(value) {
        match serde_json::from_value::<FeedbackRecord>(value.clone()) {
            Ok(record) => return record,
            Err(e) => {
                tracing::warn!("Malformed current-shape feedback item, using empty record: {e}");
                return empty_record();
            }
        }
    }
    upgrade(value)
}

fn legacy_id(value: &Value) -> FeedbackId {
    match value.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => FeedbackId(id.to_string()),
        _ => FeedbackId(Utc::now().timestamp_millis().to_string()),
    }
}

fn legacy_timestamp(value: &Value) -> DateTime<Utc> {
    value
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

fn empty_record() -> FeedbackRecord {
    FeedbackRecord {
        id: FeedbackId(Utc::now().timestamp_millis().to_string()),
        timestamp: Utc::now(),
        feedback_type: Some(FeedbackType::Text),
        sections: IndexMap::new(),
        sentiment: Some(Sentiment::neutral_default()),
        metadata: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentLabel;
    use serde_json::json;

    #[test]
    fn test_is_current_detection() {
        let current = json!({
            "id": "feedback_1",
            "timestamp": "2024-03-01T10:00:00Z",
            "sections": {},
            "sentiment": {"label": "neutral", "score": 0.5, "confidence": 0.5}
        });
        assert!(is_current(&current));

        let legacy = json!({
            "id": "old_1",
            "timestamp": "2024-03-01T10:00:00Z",
            "brand_image": "I love the new collection"
        });
        assert!(!is_current(&legacy));

        // Sections alone are not enough; a stored sentiment label is required
        let partial = json!({"id": "x", "sections": {}});
        assert!(!is_current(&partial));
    }

    #[test]
    fn test_upgrade_maps_fields_to_text_sections() {
        let legacy = json!({
            "id": "old_7",
            "timestamp": "2024-03-01T10:00:00+01:00",
            "brand_image": "I love the amazing craftsmanship",
            "store_visit": "  staff were helpful  ",
            "empty_field": "   "
        });

        let record = upgrade(&legacy);
        assert_eq!(record.id.0, "old_7");
        assert_eq!(record.feedback_type, Some(FeedbackType::Text));
        assert_eq!(record.sections.len(), 2);
        assert_eq!(
            record.sections["store_visit"].text.as_deref(),
            Some("staff were helpful")
        );
        // Blank fields are dropped entirely
        assert!(!record.sections.contains_key("empty_field"));

        let sentiment = record.sentiment.unwrap();
        assert_eq!(sentiment.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_upgrade_without_content_defaults_neutral() {
        let legacy = json!({"id": "old_2", "timestamp": "2024-03-01T10:00:00Z"});
        let record = upgrade(&legacy);
        assert!(record.sections.is_empty());
        assert_eq!(record.sentiment.unwrap().label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_upgrade_matches_fresh_submission_label() {
        // Round-trip property: upgrading then re-scoring the joined text
        // gives the same label a fresh submission with that text would get.
        let text = "the service was terrible and disappointing";
        let legacy = json!({"id": "old_3", "timestamp": "2024-03-01T10:00:00Z", "service": text});

        let upgraded = upgrade(&legacy);
        let fresh = crate::sentiment::analyze(text);
        assert_eq!(upgraded.sentiment.unwrap().label, fresh.label);
    }

    #[test]
    fn test_normalize_passes_current_records_through() {
        let current = json!({
            "id": "feedback_9",
            "timestamp": "2024-03-01T10:00:00Z",
            "type": "voice",
            "sections": {
                "brand_image": {"id": "brand_image", "text": "good"}
            },
            "sentiment": {"label": "positive", "score": 1.0, "confidence": 0.9}
        });

        let record = normalize(&current);
        assert_eq!(record.id.0, "feedback_9");
        assert_eq!(record.feedback_type, Some(FeedbackType::Voice));
        assert_eq!(record.sentiment.unwrap().score, 1.0);
    }

    #[test]
    fn test_normalize_tolerates_garbage_items() {
        let record = normalize(&json!(42));
        assert!(record.sections.is_empty());
        assert_eq!(record.sentiment.unwrap().label, SentimentLabel::Neutral);
    }
}
