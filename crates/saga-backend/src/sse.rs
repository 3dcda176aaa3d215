//! Server-sent event decoding for the task event subscription.
//!
//! Frames are `data: {json}\n\n`; each data line carries one JSON
//! `RawEvent`. Malformed frames are skipped — the stream only fails
//! when the underlying connection does.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;
use saga_core::RawEvent;
use tracing::debug;

use crate::error::BackendError;

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BackendError>> + Send>>;

pub struct SseStream {
    stream: ByteStream,
    buffer: String,
    done: bool,
}

impl SseStream {
    pub fn new(stream: ByteStream) -> Self {
        Self {
            stream,
            buffer: String::new(),
            done: false,
        }
    }

    /// Pop the next complete frame's event out of the buffer, if any.
    fn next_buffered_event(&mut self) -> Option<RawEvent> {
        while let Some(end) = self.buffer.find("\n\n") {
            let frame = self.buffer[..end].to_string();
            self.buffer.drain(..end + 2);
            if let Some(event) = parse_frame(&frame) {
                return Some(event);
            }
        }
        None
    }
}

/// Extract the `data:` payload of one SSE frame and decode it.
fn parse_frame(frame: &str) -> Option<RawEvent> {
    for line in frame.lines() {
        let Some(data) = line
            .strip_prefix("data: ")
            .or_else(|| line.strip_prefix("data:"))
        else {
            continue; // comment lines, event names, retry hints
        };
        match serde_json::from_str::<RawEvent>(data.trim()) {
            Ok(event) => return Some(event),
            Err(e) => {
                debug!(error = %e, "skipping undecodable SSE frame");
            }
        }
    }
    None
}

impl Stream for SseStream {
    type Item = Result<RawEvent, BackendError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        loop {
            if let Some(event) = self.next_buffered_event() {
                return Poll::Ready(Some(Ok(event)));
            }

            match self.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    self.buffer.push_str(&String::from_utf8_lossy(&bytes));
                }
                Poll::Ready(Some(Err(e))) => {
                    self.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    // A final unterminated frame is not a valid event.
                    self.done = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
