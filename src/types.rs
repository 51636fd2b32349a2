//! Core data types for the Atelier feedback service
//!
//! This module defines the fundamental data structures used throughout
//! atelier: feedback records, section answers, sentiment scores, and the
//! derived analytics snapshot. Wire names are camelCase to stay compatible
//! with existing `feedback.json` data files and dashboard clients.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Unique identifier for feedback records
///
/// Wraps the `feedback_{unix_millis}` string format used in persisted data.
/// The millisecond timestamp makes ids monotonic-enough for ordering;
/// collision-proof uniqueness is not a requirement of the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackId(pub String);

impl FeedbackId {
    /// Generate a new id from the current wall clock
    pub fn generate() -> Self {
        Self(format!("feedback_{}", Utc::now().timestamp_millis()))
    }
}

impl std::fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse sentiment classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// Sentiment derived once at submission time and never recomputed
///
/// `score` lives in [0, 1] with 0.5 as the zero-information midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
    pub confidence: f64,
}

impl Sentiment {
    /// The score/confidence returned when the scorer sees no signal at all
    pub fn neutral_default() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.5,
            confidence: 0.5,
        }
    }
}

/// Nominal submission channel tag
///
/// Informational only: a record tagged `text` may still carry voice answers
/// in its sections, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Text,
    Voice,
}

/// Reference to a stored voice clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioRef {
    pub url: String,
}

/// A single question-area's response within a feedback record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionAnswer {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioRef>,
}

impl SectionAnswer {
    /// Whether this section carries an actual answer
    ///
    /// Non-blank text or a voice clip counts; an empty string does not.
    pub fn has_content(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty()) || self.audio.is_some()
    }
}

/// Informational request metadata captured at submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// One user submission: per-section answers plus derived sentiment
///
/// `type` and `sentiment` are optional on the wire because legacy data may
/// lack them; the submission path always fills both, and the analytics
/// aggregator applies explicit defaults (`text`, neutral) when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: FeedbackId,

    pub timestamp: DateTime<Utc>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub feedback_type: Option<FeedbackType>,

    /// Section id to answer, in submission order. Unknown keys are preserved.
    pub sections: IndexMap<String, SectionAnswer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SubmissionMetadata>,
}

impl FeedbackRecord {
    /// All non-empty text answers joined by single spaces
    pub fn joined_text(&self) -> String {
        self.sections
            .values()
            .filter_map(|s| s.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Response counts per nominal submission channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsesByType {
    pub text: u64,
    pub voice: u64,
}

/// Record counts per sentiment label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

/// Per-section rollup: how many records answered it and at what sentiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStat {
    pub section_id: String,
    pub response_count: u64,
    pub average_sentiment: f64,
}

/// One calendar day in the trailing 7-day trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: u64,
    pub average_sentiment: f64,
}

/// Fully-recomputed aggregate view over all feedback records
///
/// Derived, never persisted: a pure function of the store contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_responses: u64,
    pub average_sentiment: f64,
    pub responses_by_type: ResponsesByType,
    pub sentiment_distribution: SentimentDistribution,
    pub top_sections: Vec<SectionStat>,
    pub recent_trends: Vec<TrendPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(id: &str, text: Option<&str>) -> SectionAnswer {
        SectionAnswer {
            id: id.to_string(),
            text: text.map(String::from),
            audio: None,
        }
    }

    #[test]
    fn test_feedback_id_format() {
        let id = FeedbackId::generate();
        assert!(id.0.starts_with("feedback_"));
        assert!(id.0["feedback_".len()..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_has_content() {
        assert!(answer("a", Some("lovely")).has_content());
        assert!(!answer("a", Some("   ")).has_content());
        assert!(!answer("a", None).has_content());

        let voice_only = SectionAnswer {
            id: "a".to_string(),
            text: None,
            audio: Some(AudioRef {
                url: "/data/voice/voice_1.webm".to_string(),
            }),
        };
        assert!(voice_only.has_content());
    }

    #[test]
    fn test_joined_text_skips_blanks() {
        let mut sections = IndexMap::new();
        sections.insert("a".to_string(), answer("a", Some("first")));
        sections.insert("b".to_string(), answer("b", Some("")));
        sections.insert("c".to_string(), answer("c", Some("  second  ")));

        let record = FeedbackRecord {
            id: FeedbackId("feedback_1".to_string()),
            timestamp: Utc::now(),
            feedback_type: Some(FeedbackType::Text),
            sections,
            sentiment: None,
            metadata: None,
        };
        assert_eq!(record.joined_text(), "first second");
    }

    #[test]
    fn test_record_wire_shape() {
        let mut sections = IndexMap::new();
        sections.insert("brand_image".to_string(), answer("brand_image", Some("ok")));

        let record = FeedbackRecord {
            id: FeedbackId("feedback_42".to_string()),
            timestamp: Utc::now(),
            feedback_type: Some(FeedbackType::Voice),
            sections,
            sentiment: Some(Sentiment::neutral_default()),
            metadata: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], "feedback_42");
        assert_eq!(value["type"], "voice");
        assert_eq!(value["sentiment"]["label"], "neutral");
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_snapshot_wire_names() {
        let snapshot = AnalyticsSnapshot::default();
        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value.get("totalResponses").is_some());
        assert!(value.get("averageSentiment").is_some());
        assert!(value.get("responsesByType").is_some());
        assert!(value.get("sentimentDistribution").is_some());
        assert!(value.get("topSections").is_some());
        assert!(value.get("recentTrends").is_some());
    }
}
