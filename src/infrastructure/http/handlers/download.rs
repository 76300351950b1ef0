//! 导出产物的 HTTP 响应

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};

use crate::application::ExportArtifact;
use crate::infrastructure::http::error::ApiError;

/// 把导出产物转换成下载（或内联展示）响应
pub(super) fn artifact_response(artifact: ExportArtifact) -> Result<Response, ApiError> {
    let disposition = content_disposition(&artifact.filename, artifact.attachment);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, artifact.media_type)
        .header(header::CONTENT_LENGTH, artifact.bytes.len())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(artifact.bytes))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// `filename` 只放 ASCII 回退名，完整文件名放在 RFC 5987 的 `filename*`
fn content_disposition(filename: &str, attachment: bool) -> String {
    let kind = if attachment { "attachment" } else { "inline" };
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
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
        percent_encode(filename)
    )
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
