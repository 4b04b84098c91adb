//! Byte-range video delivery.
//!
//! [`serve_resource`] turns a resolved [`ResourceLocation`] and an optional
//! `Range` header into a 200, 206 or 416 response. The body is produced by a
//! per-request task that owns the file handle and runs [`copy::copy_span`]
//! into a [`copy::ChannelSink`]; the handle is released whenever that task
//! ends, whether the copy completed, the client went away or the source ran
//! short.

pub mod copy;
pub mod mime;
pub mod range;

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::fs::File;
use tokio::io::AsyncSeekExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

use rh_core::{Error, Result};

use crate::catalog::ResourceLocation;
use self::copy::{copy_span, ChannelSink, CopyOutcome};
use self::range::{decide_range, RangeDecision};

pub use self::copy::CHUNK_SIZE;

const CACHE_CONTROL: &str = "no-cache, must-revalidate";

/// Open `path` read-only and position it at `start`.
///
/// A file that disappeared or became unreadable since resolution is
/// reported as [`Error::FileUnavailable`].
pub async fn open_at(path: &Path, start: u64) -> Result<File> {
    let mut file = File::open(path).await.map_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "Failed to open video file");
        Error::file_unavailable(path)
    })?;
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }
    Ok(file)
}

/// Answer a request for `location`, honouring `range_header`.
///
/// Unsatisfiable ranges are returned as [`Error::RangeNotSatisfiable`]
/// before any file handle is opened.
pub async fn serve_resource(
    location: &ResourceLocation,
    range_header: Option<&str>,
) -> Result<Response> {
    let size = location.size_bytes;
    let content_type = mime::content_type_for(&location.path);

    match decide_range(range_header, size) {
        RangeDecision::Unsatisfiable => {
            tracing::debug!(
                path = %location.path.display(),
                range = range_header.unwrap_or_default(),
                size,
                "Range not satisfiable"
            );
            Err(Error::RangeNotSatisfiable { size })
        }
        RangeDecision::Partial(range) => {
            let length = range.len();
            let file = open_at(&location.path, range.start).await?;
            tracing::debug!(
                path = %location.path.display(),
                start = range.start,
                end = range.end,
                length,
                "Streaming partial content"
            );

            Ok((
                StatusCode::PARTIAL_CONTENT,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_LENGTH, length.to_string()),
                    (header::CONTENT_RANGE, range.content_range(size)),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                    (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
                ],
                stream_body(file, length, location.path.clone()),
            )
                .into_response())
        }
        RangeDecision::Full => {
            let file = open_at(&location.path, 0).await?;
            tracing::debug!(path = %location.path.display(), size, "Streaming full file");

            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_LENGTH, size.to_string()),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                    (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
                ],
                stream_body(file, size, location.path.clone()),
            )
                .into_response())
        }
    }
}

/// Spawn the copy task for one response and return its body.
///
/// The channel holds a single chunk, so at most two chunks of a response
/// are in memory at any time: one queued and one being read.
fn stream_body(mut file: File, length: u64, path: PathBuf) -> Body {
    if length == 0 {
        return Body::empty();
    }

    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(
        async move {
            let mut sink = ChannelSink::new(tx);
            let outcome = copy_span(&mut file, length, &mut sink).await;
            drop(file);
            log_outcome(&path, &outcome);
        }
        .in_current_span(),
    );

    Body::from_stream(ReceiverStream::new(rx))
}

fn log_outcome(path: &Path, outcome: &CopyOutcome) {
    match outcome {
        CopyOutcome::Complete { sent } => {
            tracing::trace!(path = %path.display(), sent, "Stream complete");
        }
        CopyOutcome::ClientGone { sent } => {
            tracing::debug!(path = %path.display(), sent, "Client disconnected mid-stream");
        }
        CopyOutcome::SourceExhausted { sent, expected } => {
            tracing::warn!(
                path = %path.display(),
                sent,
                expected,
                "Video file shorter than expected; response truncated"
            );
        }
        CopyOutcome::ReadFailed { sent, error } => {
            tracing::warn!(path = %path.display(), sent, error = %error, "Read failed mid-stream");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn fixture(len: usize, name: &str) -> (tempfile::TempDir, ResourceLocation, Vec<u8>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let data: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
        std::fs::write(&path, &data).unwrap();
        let location = ResourceLocation {
            path,
            size_bytes: len as u64,
        };
        (dir, location, data)
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    fn header<'a>(response: &'a Response, name: header::HeaderName) -> &'a str {
        response.headers().get(name).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn partial_middle_span() {
        let (_dir, location, data) = fixture(1000, "movie.mp4");

        let response = serve_resource(&location, Some("bytes=100-199")).await.unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&response, header::CONTENT_RANGE), "bytes 100-199/1000");
        assert_eq!(header(&response, header::CONTENT_LENGTH), "100");
        assert_eq!(header(&response, header::CONTENT_TYPE), "video/mp4");
        assert_eq!(header(&response, header::ACCEPT_RANGES), "bytes");
        assert_eq!(header(&response, header::CACHE_CONTROL), CACHE_CONTROL);
        assert_eq!(body_bytes(response).await, &data[100..200]);
    }

    #[tokio::test]
    async fn partial_open_end() {
        let (_dir, location, data) = fixture(1000, "movie.webm");

        let response = serve_resource(&location, Some("bytes=900-")).await.unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&response, header::CONTENT_RANGE), "bytes 900-999/1000");
        assert_eq!(header(&response, header::CONTENT_LENGTH), "100");
        assert_eq!(body_bytes(response).await, &data[900..]);
    }

    #[tokio::test]
    async fn full_body_without_range() {
        let (_dir, location, data) = fixture(CHUNK_SIZE * 2 + 17, "movie.mkv");

        let response = serve_resource(&location, None).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header(&response, header::CONTENT_LENGTH),
            data.len().to_string()
        );
        assert_eq!(header(&response, header::CONTENT_TYPE), "video/x-matroska");
        assert!(response.headers().get(header::CONTENT_RANGE).is_none());
        assert_eq!(body_bytes(response).await, data);
    }

    #[tokio::test]
    async fn malformed_range_serves_full_body() {
        let (_dir, location, data) = fixture(500, "clip.avi");

        let response = serve_resource(&location, Some("bytes=abc-")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, data);
    }

    #[tokio::test]
    async fn unsatisfiable_range_opens_nothing() {
        // The path does not exist: an open attempt would surface as
        // FileUnavailable instead of RangeNotSatisfiable.
        let location = ResourceLocation {
            path: PathBuf::from("/nonexistent/reelhouse/movie.mp4"),
            size_bytes: 1000,
        };

        let err = serve_resource(&location, Some("bytes=1000-1010")).await.unwrap_err();

        assert!(matches!(err, Error::RangeNotSatisfiable { size: 1000 }));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let location = ResourceLocation {
            path: PathBuf::from("/nonexistent/reelhouse/movie.mp4"),
            size_bytes: 1000,
        };

        let err = serve_resource(&location, None).await.unwrap_err();

        assert!(matches!(err, Error::FileUnavailable { .. }));
    }

    #[tokio::test]
    async fn empty_file_full_body() {
        let (_dir, location, _) = fixture(0, "empty.mp4");

        let response = serve_resource(&location, None).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, header::CONTENT_LENGTH), "0");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn unknown_extension_is_octet_stream() {
        let (_dir, location, _) = fixture(10, "movie.bin");

        let response = serve_resource(&location, None).await.unwrap();

        assert_eq!(
            header(&response, header::CONTENT_TYPE),
            mime::DEFAULT_CONTENT_TYPE
        );
    }

    #[tokio::test]
    async fn split_spans_concatenate_to_whole() {
        let (_dir, location, _) = fixture(CHUNK_SIZE + 4321, "movie.mp4");
        let (start, end) = (10u64, (CHUNK_SIZE + 4000) as u64);

        let whole = body_bytes(
            serve_resource(&location, Some(&format!("bytes={start}-{end}")))
                .await
                .unwrap(),
        )
        .await;

        for split in [start, start + 1, CHUNK_SIZE as u64, end - 1] {
            let left = body_bytes(
                serve_resource(&location, Some(&format!("bytes={start}-{split}")))
                    .await
                    .unwrap(),
            )
            .await;
            let right = body_bytes(
                serve_resource(&location, Some(&format!("bytes={}-{end}", split + 1)))
                    .await
                    .unwrap(),
            )
            .await;
            assert_eq!([left, right].concat(), whole, "split at {split}");
        }
    }

    #[tokio::test]
    async fn repeated_requests_are_identical() {
        let (_dir, location, _) = fixture(3000, "movie.mp4");

        let first = body_bytes(serve_resource(&location, Some("bytes=5-2500")).await.unwrap()).await;
        let second = body_bytes(serve_resource(&location, Some("bytes=5-2500")).await.unwrap()).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn open_at_positions_handle() {
        use tokio::io::AsyncReadExt;
        let (_dir, location, data) = fixture(100, "movie.mp4");

        let mut file = open_at(&location.path, 40).await.unwrap();
        let mut buf = [0u8; 10];
        file.read_exact(&mut buf).await.unwrap();

        assert_eq!(&buf, &data[40..50]);
    }

    /// Records each event's message with the names of its enclosing spans.
    #[derive(Clone, Default)]
    struct ScopeRecorder(std::sync::Arc<std::sync::Mutex<Vec<(String, Vec<String>)>>>);

    struct MessageVisitor(String);

    impl tracing::field::Visit for MessageVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S> tracing_subscriber::Layer<S> for ScopeRecorder
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            let spans = ctx
                .event_scope(event)
                .map(|scope| scope.map(|span| span.name().to_string()).collect())
                .unwrap_or_default();
            self.0.lock().unwrap().push((visitor.0, spans));
        }
    }

    #[tokio::test]
    async fn copy_task_logs_inside_request_span() {
        use tracing_subscriber::layer::SubscriberExt;

        let recorder = ScopeRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let (_dir, location, data) = fixture(CHUNK_SIZE + 10, "movie.mp4");
        let span = tracing::info_span!("request", request_id = "abc");
        let response = serve_resource(&location, None)
            .instrument(span)
            .await
            .unwrap();
        assert_eq!(body_bytes(response).await, data);

        let events = recorder.0.lock().unwrap();
        let (_, spans) = events
            .iter()
            .find(|(message, _)| message == "Stream complete")
            .expect("copy task logged its outcome");
        assert!(spans.iter().any(|name| name == "request"), "spans: {spans:?}");
    }
}
