//! End-to-end flow tests: submit, list, aggregate
//!
//! Exercises the submission handler, store, and API handlers together over
//! a temp-directory data dir, the way the server wires them.

use atelier_core::{
    api::{feedback, AppState},
    config::AtelierConfig,
    submission::SubmissionPayload,
    types::{FeedbackType, SentimentLabel},
};
use axum::extract::State;
use chrono::Utc;
use tempfile::TempDir;

async fn app_state(dir: &TempDir) -> AppState {
    let config = AtelierConfig {
        data_dir: dir.path().to_path_buf(),
        addr: ([127, 0, 0, 1], 0).into(),
    };
    let state = AppState::new(&config);
    state.store.init().await.unwrap();
    state.voice.init().await.unwrap();
    state
}

#[tokio::test]
async fn test_submit_then_list_includes_record_last() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir).await;

    let mut first = SubmissionPayload::default();
    first.add_field("brand_image_0_text", b"fine".to_vec()).unwrap();
    let first = state.submissions.submit(first, None).await.unwrap();

    let mut second = SubmissionPayload::default();
    second.add_field("service_0_text", b"fine".to_vec()).unwrap();
    let second = state.submissions.submit(second, None).await.unwrap();

    let response = feedback::list_feedback(State(state)).await.unwrap();
    assert!(response.0.success);
    let records = response.0.data;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, first.id);
    assert_eq!(records.last().unwrap().id, second.id);
}

#[tokio::test]
async fn test_empty_store_analytics_snapshot() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir).await;

    let response = feedback::analytics(State(state)).await.unwrap();
    let snapshot = response.0.data;

    assert_eq!(snapshot.total_responses, 0);
    assert_eq!(snapshot.average_sentiment, 0.0);
    assert_eq!(snapshot.responses_by_type.text, 0);
    assert_eq!(snapshot.responses_by_type.voice, 0);
    assert_eq!(snapshot.sentiment_distribution.positive, 0);
    assert_eq!(snapshot.sentiment_distribution.neutral, 0);
    assert_eq!(snapshot.sentiment_distribution.negative, 0);
    assert!(snapshot.top_sections.is_empty());
    assert_eq!(snapshot.recent_trends.len(), 7);
    assert!(snapshot.recent_trends.iter().all(|t| t.count == 0));
    assert_eq!(
        snapshot.recent_trends.last().unwrap().date,
        Utc::now().date_naive()
    );
}

#[tokio::test]
async fn test_positive_submission_reaches_dashboard() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir).await;

    let mut payload = SubmissionPayload::default();
    payload
        .add_field("brand_image_0_text", b"I love this amazing brand".to_vec())
        .unwrap();
    let record = state.submissions.submit(payload, None).await.unwrap();

    let sentiment = record.sentiment.unwrap();
    assert_eq!(sentiment.label, SentimentLabel::Positive);
    assert_eq!(sentiment.score, 1.0);

    let response = feedback::analytics(State(state)).await.unwrap();
    let snapshot = response.0.data;
    assert_eq!(snapshot.total_responses, 1);
    assert_eq!(snapshot.sentiment_distribution.positive, 1);
    assert_eq!(snapshot.average_sentiment, 1.0);
    assert_eq!(snapshot.top_sections.len(), 1);
    assert_eq!(snapshot.top_sections[0].section_id, "brand_image");
    assert_eq!(snapshot.recent_trends.last().unwrap().count, 1);
}

#[tokio::test]
async fn test_blank_section_not_counted_in_top_sections() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir).await;

    let mut payload = SubmissionPayload::default();
    payload.add_field("brand_image_0_text", b"lovely".to_vec()).unwrap();
    payload.add_field("service_0_text", b"".to_vec()).unwrap();
    state.submissions.submit(payload, None).await.unwrap();

    let response = feedback::analytics(State(state)).await.unwrap();
    let snapshot = response.0.data;
    // Exactly one section earned a response count from this record
    assert_eq!(snapshot.top_sections.len(), 1);
    assert_eq!(snapshot.top_sections[0].section_id, "brand_image");
    assert_eq!(snapshot.top_sections[0].response_count, 1);
}

#[tokio::test]
async fn test_total_responses_matches_store_length() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir).await;

    for i in 0..5 {
        let mut payload = SubmissionPayload::default();
        payload
            .add_field("service_0_text", format!("visit {i}").into_bytes())
            .unwrap();
        state.submissions.submit(payload, None).await.unwrap();
    }

    let stored = state.store.load_all().await.unwrap().len() as u64;
    let response = feedback::analytics(State(state)).await.unwrap();
    assert_eq!(response.0.data.total_responses, stored);
    assert_eq!(stored, 5);
}

#[tokio::test]
async fn test_voice_submission_tags_and_counts() {
    let dir = TempDir::new().unwrap();
    let state = app_state(&dir).await;

    let mut payload = SubmissionPayload::default();
    payload
        .add_field("materials_2_voice", b"webm-bytes".to_vec())
        .unwrap();
    payload.feedback_type = Some(FeedbackType::Voice);
    let record = state.submissions.submit(payload, None).await.unwrap();

    // The clip landed on disk under the record's id
    let clip = dir
        .path()
        .join("voice")
        .join(format!("{}_materials_2.webm", record.id));
    assert!(clip.exists());

    let response = feedback::analytics(State(state)).await.unwrap();
    let snapshot = response.0.data;
    assert_eq!(snapshot.responses_by_type.voice, 1);
    // Voice-only answers still count as section responses
    assert_eq!(snapshot.top_sections[0].section_id, "materials");
}
