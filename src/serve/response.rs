//! HTTP responses for map artifacts and pipeline errors.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use impact_zone::export::Artifact;
use impact_zone::MapError;

/// Status code for a pipeline error
pub fn status_for(err: &MapError) -> StatusCode {
    match err {
        MapError::NotFound(_) => StatusCode::NOT_FOUND,
        MapError::Ambiguous { .. } => StatusCode::CONFLICT,
        e if e.is_selection_error() => StatusCode::BAD_REQUEST,
        e if e.is_data_error() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log and convert a pipeline error for the client
pub fn error_response(err: MapError) -> (StatusCode, String) {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!("Map request failed: {:?}", err);
    } else {
        tracing::debug!("Rejected map request: {}", err);
    }
    (status, describe(&err))
}

/// Error message followed by its causes
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
pub fn content_disposition(file_name: &str, download: bool) -> String {
    let kind = if download { "attachment" } else { "inline" };
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        kind,
        fallback,
        percent_encode(file_name)
    )
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Serve an artifact inline or as a download
pub fn artifact_response(artifact: Artifact, download: bool) -> Response {
    let disposition = content_disposition(&artifact.file_name, download);
    (
        [
            (header::CONTENT_TYPE, artifact.mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response()
}
