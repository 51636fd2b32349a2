//! Standalone voice clip upload and streaming endpoints

use super::response::ApiResponse;
use super::server::AppState;
use crate::error::AtelierError;
use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{
        header::{ACCEPT_RANGES, CONTENT_DISPOSITION, CONTENT_RANGE, CONTENT_TYPE, RANGE},
        HeaderMap, StatusCode,
    },
    response::Response,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

/// Response body for a stored standalone clip
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceClipUpload {
    pub audio_url: String,
    pub timestamp: DateTime<Utc>,
    /// Always 0: duration extraction would need audio decoding
    pub duration: u64,
}

/// POST /feedback/voice
///
/// Multipart form with an `audio` part holding the webm bytes. The body is
/// extracted by hand so a non-multipart request still gets the structured
/// error envelope instead of the extractor's plain-text rejection.
pub async fn upload_clip(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ApiResponse<VoiceClipUpload>>, AtelierError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AtelierError::Validation(format!("Invalid multipart body: {e}")))?;

    let mut audio: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AtelierError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("audio") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AtelierError::Validation(format!("Unreadable audio field: {e}")))?;
            audio = Some(bytes.to_vec());
        }
    }

    let audio = audio
        .ok_or_else(|| AtelierError::Validation("No audio file provided".to_string()))?;

    let file_name = state.voice.save_clip(&audio).await?;
    debug!("Stored standalone voice clip {file_name}");

    Ok(ApiResponse::ok(VoiceClipUpload {
        audio_url: format!("/feedback/voice/{file_name}"),
        timestamp: Utc::now(),
        duration: 0,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VoiceQuery {
    pub file: Option<String>,
}

/// GET /feedback/voice?file=voice_{ts}.webm
pub async fn get_clip(
    State(state): State<AppState>,
    Query(query): Query<VoiceQuery>,
    headers: HeaderMap,
) -> Result<Response, AtelierError> {
    let file_name = query
        .file
        .ok_or_else(|| AtelierError::Validation("Invalid or missing filename".to_string()))?;
    stream_clip(&state, &file_name, &headers).await
}

/// GET /feedback/voice/{file}
pub async fn get_clip_by_path(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AtelierError> {
    stream_clip(&state, &file_name, &headers).await
}

/// Outcome of parsing a `Range` header against the file length
#[derive(Debug, PartialEq, Eq)]
enum ByteRange {
    /// No usable range: serve the whole file with 200
    Full,
    /// Inclusive byte window, end already clamped to the file length
    Partial(u64, u64),
    /// Syntactically valid but starting at or beyond EOF: 416
    Unsatisfiable,
}

/// Stream a clip, honoring a single `Range: bytes=S-[E]` header with 206
async fn stream_clip(
    state: &AppState,
    file_name: &str,
    headers: &HeaderMap,
) -> Result<Response, AtelierError> {
    let path = state.voice.resolve(file_name).await?;
    let total = tokio::fs::metadata(&path).await?.len();

    let range = headers
        .get(RANGE)
        .and_then(|v| v.to_str().ok())
        .map_or(ByteRange::Full, |raw| parse_range(raw, total));

    let builder = Response::builder()
        .header(CONTENT_TYPE, "audio/webm")
        .header(ACCEPT_RANGES, "bytes")
        .header(
            CONTENT_DISPOSITION,
            format!("inline; filename=\"{file_name}\""),
        );

    let response = match range {
        ByteRange::Partial(start, end) => {
            let mut file = tokio::fs::File::open(&path).await?;
            file.seek(std::io::SeekFrom::Start(start)).await?;
            let length = end - start + 1;
            let mut buffer = vec![0u8; length as usize];
            file.read_exact(&mut buffer).await?;

            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(CONTENT_RANGE, format!("bytes {start}-{end}/{total}"))
                .body(Body::from(buffer))
        }
        ByteRange::Unsatisfiable => builder
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(CONTENT_RANGE, format!("bytes */{total}"))
            .body(Body::empty()),
        ByteRange::Full => {
            let bytes = tokio::fs::read(&path).await?;
            builder.status(StatusCode::OK).body(Body::from(bytes))
        }
    };

    response.map_err(|e| AtelierError::Other(format!("Failed to build response: {e}")))
}

/// Parse a single byte range against the file length
///
/// Malformed headers are ignored and the whole file is served with 200; a
/// well-formed range starting at or beyond EOF is unsatisfiable and gets
/// 416 with `Content-Range: bytes */{total}`.
fn parse_range(header: &str, total: u64) -> ByteRange {
    let Some(range) = header.strip_prefix("bytes=") else {
        return ByteRange::Full;
    };
    let Some((start_raw, end_raw)) = range.split_once('-') else {
        return ByteRange::Full;
    };
    let Ok(start) = start_raw.parse::<u64>() else {
        return ByteRange::Full;
    };

    let Some(last) = total.checked_sub(1) else {
        return ByteRange::Unsatisfiable;
    };
    if start > last {
        return ByteRange::Unsatisfiable;
    }

    let end = if end_raw.is_empty() {
        last
    } else {
        match end_raw.parse::<u64>() {
            Ok(end) => end.min(last),
            Err(_) => return ByteRange::Full,
        }
    };

    if start > end {
        return ByteRange::Full;
    }
    ByteRange::Partial(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_open_ended() {
        assert_eq!(parse_range("bytes=100-", 1000), ByteRange::Partial(100, 999));
    }

    #[test]
    fn test_parse_range_bounded() {
        assert_eq!(parse_range("bytes=0-499", 1000), ByteRange::Partial(0, 499));
    }

    #[test]
    fn test_parse_range_end_clamped_to_length() {
        assert_eq!(parse_range("bytes=900-5000", 1000), ByteRange::Partial(900, 999));
    }

    #[test]
    fn test_parse_range_malformed_serves_full_file() {
        assert_eq!(parse_range("bytes=abc-", 1000), ByteRange::Full);
        assert_eq!(parse_range("items=0-10", 1000), ByteRange::Full);
        assert_eq!(parse_range("bytes=", 1000), ByteRange::Full);
        assert_eq!(parse_range("bytes=5-2", 1000), ByteRange::Full);
    }

    #[test]
    fn test_parse_range_unsatisfiable() {
        // Start at or beyond the end of the file
        assert_eq!(parse_range("bytes=1000-", 1000), ByteRange::Unsatisfiable);
        assert_eq!(parse_range("bytes=2000-2100", 1000), ByteRange::Unsatisfiable);
        // Empty file has no satisfiable range
        assert_eq!(parse_range("bytes=0-", 0), ByteRange::Unsatisfiable);
    }
}
