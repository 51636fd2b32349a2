//! Atelier - Luxury-Brand Customer Feedback Service
//!
//! A small Rust service collecting multi-section questionnaire answers
//! (typed text and recorded voice), persisting them to a flat JSON file
//! plus audio blobs on disk, and serving a dashboard analytics view.
//!
//! # Architecture
//!
//! - **Types**: core data structures (FeedbackRecord, SectionAnswer,
//!   AnalyticsSnapshot)
//! - **Sentiment**: keyword-count scorer, computed once at submission
//! - **Store**: append-only JSON array with legacy-record upgrade on read,
//!   plus voice clip blobs
//! - **Submission**: validation, normalization, scoring, persistence
//! - **Analytics**: full-scan aggregation for the dashboard
//! - **Api**: the unified axum HTTP surface
//!
//! # Example
//!
//! ```ignore
//! use atelier_core::{api::ApiServer, config::AtelierConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AtelierConfig::resolve(None, None)?;
//!     ApiServer::new(config).serve().await
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod sentiment;
pub mod store;
pub mod submission;
pub mod types;

// Re-export commonly used types
pub use config::AtelierConfig;
pub use error::{AtelierError, Result};
pub use store::{voice::VoiceStore, FeedbackStore};
pub use submission::{SubmissionHandler, SubmissionPayload};
pub use types::{
    AnalyticsSnapshot, AudioRef, FeedbackId, FeedbackRecord, FeedbackType, SectionAnswer,
    SectionStat, Sentiment, SentimentLabel, SubmissionMetadata, TrendPoint,
};
