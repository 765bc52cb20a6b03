// Chunked JSON streaming utilities
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use serde::Serialize;

pub const FRAME_CONTENT_TYPE: &str = "application/x-ndframe+json";

/// Create a streaming response of length-prefixed JSON frames
pub fn chunked_json_stream<S, T>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + Sync + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_frame(&msg, compress).await });

    // Frames are compressed individually, so no Content-Encoding here
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, FRAME_CONTENT_TYPE)
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize one message to a frame: 4-byte big-endian length, then payload
pub async fn serialize_frame<T: Serialize>(msg: &T, compress: bool) -> std::io::Result<Bytes> {
    let json = serde_json::to_vec(msg)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let length = u32::try_from(payload.len())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "frame too large"))?;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver
pub fn stream_from_receiver<T>(
    mut rx: tokio::sync::mpsc::Receiver<T>,
    compress: bool,
) -> impl IntoResponse
where
    T: Serialize + Send + Sync + 'static,
{
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield msg;
        }
    };

    match chunked_json_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Buf;

    /// Split a body back into its JSON frames.
    fn frames(mut body: Bytes) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        while body.has_remaining() {
            let len = body.get_u32() as usize;
            let payload = body.split_to(len);
            out.push(serde_json::from_slice(&payload).unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_frame_layout() {
        let frame = serialize_frame(&serde_json::json!({"type": "complete"}), false)
            .await
            .unwrap();

        let payload = br#"{"type":"complete"}"#;
        assert_eq!(&frame[..4], &(payload.len() as u32).to_be_bytes());
        assert_eq!(&frame[4..], payload);
    }

    #[tokio::test]
    async fn test_stream_from_receiver() {
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        tx.send(serde_json::json!({"n": 1})).await.unwrap();
        tx.send(serde_json::json!({"n": 2})).await.unwrap();
        drop(tx);

        let response = stream_from_receiver(rx, false).into_response();
        assert_eq!(response.headers()[header::CONTENT_TYPE], FRAME_CONTENT_TYPE);
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let decoded = frames(body);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1]["n"], 2);
    }

    #[tokio::test]
    async fn test_compressed_frame_is_smaller() {
        let msg = serde_json::json!({"points": vec![110; 200]});
        let plain = serialize_frame(&msg, false).await.unwrap();
        let compressed = serialize_frame(&msg, true).await.unwrap();

        assert!(compressed.len() < plain.len());
        let len = u32::from_be_bytes([compressed[0], compressed[1], compressed[2], compressed[3]]);
        assert_eq!(len as usize, compressed.len() - 4);
    }
}
