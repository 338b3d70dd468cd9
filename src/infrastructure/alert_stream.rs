// Chunked NDJSON streaming of published alerts
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use tokio::sync::{broadcast, watch};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Turn a stream of serialized alerts into a chunked NDJSON response
pub fn ndjson_stream<S>(stream: S) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = Bytes> + Send + 'static,
{
    let byte_stream = stream.map(|payload| Ok::<_, std::io::Error>(frame_line(&payload)));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// One JSON document per line
fn frame_line(payload: &[u8]) -> Bytes {
    let mut line = BytesMut::with_capacity(payload.len() + 1);
    line.put_slice(payload);
    line.put_u8(b'\n');
    line.freeze()
}

/// Stream everything published after subscription until the feed closes or
/// `shutdown` flips to true. A subscriber that falls behind skips the alerts
/// it missed and keeps going.
pub fn stream_from_broadcast(
    mut rx: broadcast::Receiver<Bytes>,
    mut shutdown: watch::Receiver<bool>,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        if *shutdown.borrow() {
            return;
        }
        loop {
            let received = tokio::select! {
                received = rx.recv() => received,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            };

            match received {
                Ok(payload) => yield payload,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Alert stream subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    match ndjson_stream(stream) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
