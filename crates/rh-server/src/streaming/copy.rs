//! Chunked, flush-per-chunk copy from a file handle into a response sink.
//!
//! The sink's failure contract doubles as cancellation: once the receiving
//! side of a response goes away, the next `send_chunk` or `flush` fails and
//! the copy stops without reading further.

use std::io;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;

/// Size of one read/forward step of the copy loop.
pub const CHUNK_SIZE: usize = 256 * 1024;

/// Destination of a streamed response body.
#[async_trait]
pub trait ChunkSink: Send {
    /// Hand one chunk to the transport. Fails if the peer has gone away.
    async fn send_chunk(&mut self, chunk: Bytes) -> io::Result<()>;

    /// Wait until everything sent so far has left this sink.
    async fn flush(&mut self) -> io::Result<()>;
}

/// Sink feeding a bounded channel whose receiver is the HTTP response body.
///
/// The receiver is dropped by hyper when the client disconnects, which
/// turns every later send into `BrokenPipe`.
pub struct ChannelSink {
    tx: mpsc::Sender<io::Result<Bytes>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<io::Result<Bytes>>) -> Self {
        Self { tx }
    }
}

fn peer_closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "response body receiver dropped")
}

#[async_trait]
impl ChunkSink for ChannelSink {
    async fn send_chunk(&mut self, chunk: Bytes) -> io::Result<()> {
        self.tx.send(Ok(chunk)).await.map_err(|_| peer_closed())
    }

    async fn flush(&mut self) -> io::Result<()> {
        // A free slot means the body has taken the previous chunk.
        self.tx.reserve().await.map(drop).map_err(|_| peer_closed())
    }
}

/// How a copy loop ended. Every variant means the source handle is done.
#[derive(Debug)]
pub enum CopyOutcome {
    /// All requested bytes were delivered.
    Complete { sent: u64 },
    /// The source hit EOF early, e.g. the file shrank after resolution.
    SourceExhausted { sent: u64, expected: u64 },
    /// The sink failed: the client disconnected or the transport closed.
    ClientGone { sent: u64 },
    /// Reading the source failed mid-stream.
    ReadFailed { sent: u64, error: io::Error },
}

impl CopyOutcome {
    /// Bytes handed to the sink before the loop ended.
    pub fn sent(&self) -> u64 {
        match self {
            CopyOutcome::Complete { sent }
            | CopyOutcome::SourceExhausted { sent, .. }
            | CopyOutcome::ClientGone { sent }
            | CopyOutcome::ReadFailed { sent, .. } => *sent,
        }
    }
}

/// Read into `buf` until it is full or the source reports EOF.
///
/// Returns the number of bytes filled and the read error that stopped it,
/// if any.
async fn fill_chunk<R>(source: &mut R, buf: &mut [u8]) -> (usize, Option<io::Error>)
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (filled, Some(e)),
        }
    }
    (filled, None)
}

/// Copy `length` bytes from the current position of `source` into `sink`.
///
/// Bytes are forwarded in order, at most [`CHUNK_SIZE`] at a time, with a
/// flush after every chunk. At most one chunk is held in memory here.
pub async fn copy_span<R, S>(source: &mut R, length: u64, sink: &mut S) -> CopyOutcome
where
    R: AsyncRead + Unpin + ?Sized,
    S: ChunkSink + ?Sized,
{
    let mut sent = 0u64;

    while sent < length {
        let want = (length - sent).min(CHUNK_SIZE as u64) as usize;
        let mut buf = BytesMut::zeroed(want);
        let (filled, read_error) = fill_chunk(source, &mut buf).await;

        if filled > 0 {
            buf.truncate(filled);
            if sink.send_chunk(buf.freeze()).await.is_err() {
                return CopyOutcome::ClientGone { sent };
            }
            sent += filled as u64;
            if sink.flush().await.is_err() {
                return CopyOutcome::ClientGone { sent };
            }
        }

        if let Some(error) = read_error {
            return CopyOutcome::ReadFailed { sent, error };
        }
        if filled < want {
            return CopyOutcome::SourceExhausted {
                sent,
                expected: length,
            };
        }
    }

    CopyOutcome::Complete { sent }
}
