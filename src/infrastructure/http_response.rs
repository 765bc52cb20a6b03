// HTTP response utilities for JSON/text bodies with optional Brotli encoding
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Response, StatusCode, header},
};
use serde::Serialize;
use tokio::io::AsyncReadExt;

/// Whether the client listed `br` in `Accept-Encoding`.
pub fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false)
}

pub async fn brotli_compress(bytes: Vec<u8>) -> std::io::Result<Vec<u8>> {
    let mut encoder = BrotliEncoder::new(std::io::Cursor::new(bytes));
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await?;
    Ok(compressed)
}

async fn encoded_response(
    bytes: Vec<u8>,
    content_type: &'static str,
    attachment: Option<&str>,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    let (body_bytes, content_encoding) = if compress {
        let original = bytes.len();
        let compressed = brotli_compress(bytes).await.map_err(|e| {
            tracing::error!("Brotli compression error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        tracing::debug!("Compressed {} -> {} bytes", original, compressed.len());
        (compressed, Some("br"))
    } else {
        (bytes, None)
    };

    let mut response_builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, HeaderValue::from(body_bytes.len()));

    if let Some(encoding) = content_encoding {
        response_builder = response_builder.header(header::CONTENT_ENCODING, encoding);
    }
    if let Some(filename) = attachment {
        response_builder = response_builder.header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", sanitize_filename(filename)),
        );
    }

    response_builder.body(Body::from(body_bytes)).map_err(|e| {
        tracing::error!("Response build error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Serialize `data` as JSON, Brotli-compressed when `compress` is set.
pub async fn json_response<T: Serialize>(
    data: &T,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    let bytes = serde_json::to_vec(data).map_err(|e| {
        tracing::error!("JSON serialization error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    encoded_response(bytes, "application/json", None, compress).await
}

/// Plain-text download offered under `filename`.
pub async fn text_attachment_response(
    body: String,
    filename: &str,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    encoded_response(
        body.into_bytes(),
        "text/plain; charset=utf-8",
        Some(filename),
        compress,
    )
    .await
}

/// Keep the filename to characters that are safe in a quoted header value.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_compression::tokio::bufread::BrotliDecoder;

    async fn body_bytes(response: Response<Body>) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_accepts_brotli() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_brotli(&headers));

        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
        assert!(accepts_brotli(&headers));

        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        assert!(!accepts_brotli(&headers));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("THOR_2025-02-10_report.txt"), "THOR_2025-02-10_report.txt");
        assert_eq!(sanitize_filename("a\"b\r\n/c.txt"), "a_b___c.txt");
    }

    #[tokio::test]
    async fn test_json_response_uncompressed() {
        let response = json_response(&serde_json::json!({"avgSpeed": 110}), false)
            .await
            .unwrap();

        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
        assert_eq!(body_bytes(response).await, br#"{"avgSpeed":110}"#);
    }

    #[tokio::test]
    async fn test_json_response_brotli() {
        let response = json_response(&vec!["THOR"; 64], true).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "br");

        let compressed = body_bytes(response).await;
        let mut decoder = BrotliDecoder::new(std::io::Cursor::new(compressed));
        let mut plain = Vec::new();
        decoder.read_to_end(&mut plain).await.unwrap();

        let decoded: Vec<String> = serde_json::from_slice(&plain).unwrap();
        assert_eq!(decoded.len(), 64);
    }

    #[tokio::test]
    async fn test_text_attachment_response() {
        let response = text_attachment_response("report".to_string(), "THOR_x.txt", false)
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"THOR_x.txt\""
        );
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "6");
        assert_eq!(body_bytes(response).await, b"report");
    }
}
