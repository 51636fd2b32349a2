//! Feedback submission, listing, and analytics endpoints

use super::response::ApiResponse;
use super::server::AppState;
use crate::analytics;
use crate::error::AtelierError;
use crate::submission::{JsonSubmission, SubmissionPayload};
use crate::types::{AnalyticsSnapshot, FeedbackRecord, SubmissionMetadata};
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use chrono::Utc;
use tracing::debug;

/// POST /feedback
///
/// Accepts either a JSON body or a multipart form using the
/// `{sectionId}_{questionIndex}_{kind}` field grammar. One record is
/// appended per successful call; any validation failure persists nothing.
pub async fn submit_feedback(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ApiResponse<FeedbackRecord>>, AtelierError> {
    let metadata = metadata_from_headers(request.headers());

    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let payload = if content_type.starts_with("multipart/form-data") {
        payload_from_multipart(request).await?
    } else {
        let Json(body) = Json::<JsonSubmission>::from_request(request, &())
            .await
            .map_err(|e| AtelierError::Validation(format!("Invalid JSON body: {e}")))?;
        body.into()
    };

    let record = state.submissions.submit(payload, Some(metadata)).await?;
    Ok(ApiResponse::ok(record))
}

/// GET /feedback
///
/// All records in arrival order, legacy items upgraded for the response
/// only (the stored form is never rewritten).
pub async fn list_feedback(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<FeedbackRecord>>>, AtelierError> {
    let records = state.store.load_all().await?;
    debug!("Listing {} feedback record(s)", records.len());
    Ok(ApiResponse::ok(records))
}

/// GET /analytics
///
/// Full snapshot recomputed from one consistent read of the store.
pub async fn analytics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AnalyticsSnapshot>>, AtelierError> {
    let records = state.store.load_all().await?;
    let snapshot = analytics::aggregate(&records, Utc::now().date_naive());
    Ok(ApiResponse::ok(snapshot))
}

async fn payload_from_multipart(request: Request) -> Result<SubmissionPayload, AtelierError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AtelierError::Validation(format!("Invalid multipart body: {e}")))?;

    let mut payload = SubmissionPayload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AtelierError::Validation(format!("Unreadable multipart field: {e}")))?
    {
        let name = field
            .name()
            .map(ToString::to_string)
            .ok_or_else(|| AtelierError::Validation("Unnamed multipart field".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AtelierError::Validation(format!("Unreadable field {name}: {e}")))?;
        payload.add_field(&name, data.to_vec())?;
    }
    Ok(payload)
}

/// Informational request metadata from standard headers
pub fn metadata_from_headers(headers: &HeaderMap) -> SubmissionMetadata {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };
    SubmissionMetadata {
        browser: header("user-agent"),
        platform: header("sec-ch-ua-platform"),
        user_agent: header("user-agent"),
        ip_address: header("x-forwarded-for"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_static("TestBrowser/1.0"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));

        let metadata = metadata_from_headers(&headers);
        assert_eq!(metadata.browser.as_deref(), Some("TestBrowser/1.0"));
        assert_eq!(metadata.user_agent.as_deref(), Some("TestBrowser/1.0"));
        assert_eq!(metadata.ip_address.as_deref(), Some("203.0.113.7"));
        assert!(metadata.platform.is_none());
    }
}
