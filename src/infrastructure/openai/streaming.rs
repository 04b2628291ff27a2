//! Server-Sent Events parsing for streamed chat completions.
//!
//! The API returns `data: {json}` frames separated by blank lines and
//! terminated by a `data: [DONE]` marker. This module turns the raw byte
//! stream into a stream of text deltas.

use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::warn;

use super::error::ChatApiError;
use super::types::ChatCompletionChunk;

/// What one SSE frame contributed.
enum Frame {
    Delta(String),
    Done,
    Skip,
}

/// Adapts a reqwest byte stream into a stream of response text deltas.
pub struct SseDeltaStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    buffer: String,
    done: bool,
}

impl SseDeltaStream {
    pub fn new(stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
            buffer: String::new(),
            done: false,
        }
    }

    /// Parse one blank-line-delimited SSE frame.
    fn parse_frame(frame: &str) -> Result<Frame, ChatApiError> {
        for line in frame.lines() {
            let trimmed = line.trim();
            // Skip blanks and SSE comments.
            if trimmed.is_empty() || trimmed.starts_with(':') {
                continue;
            }
            let Some(data) = trimmed.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            if data.is_empty() {
                continue;
            }
            if data == "[DONE]" {
                return Ok(Frame::Done);
            }
            let chunk: ChatCompletionChunk = serde_json::from_str(data)?;
            return Ok(match chunk.delta_text() {
                Some(text) if !text.is_empty() => Frame::Delta(text.to_string()),
                _ => Frame::Skip,
            });
        }
        Ok(Frame::Skip)
    }
}

impl Stream for SseDeltaStream {
    type Item = Result<String, ChatApiError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.done {
                return Poll::Ready(None);
            }

            // Drain complete frames from the buffer first. Servers delimit
            // frames with either LF or CRLF blank lines.
            let lf = self.buffer.find("\n\n");
            let crlf = self.buffer.find("\r\n\r\n");
            let boundary = match (lf, crlf) {
                (Some(l), Some(c)) if c < l => Some((c, 4)),
                (Some(l), _) => Some((l, 2)),
                (None, Some(c)) => Some((c, 4)),
                (None, None) => None,
            };
            if let Some((frame_end, delimiter_len)) = boundary {
                let frame = self.buffer[..frame_end].to_string();
                self.buffer.drain(..frame_end + delimiter_len);

                match Self::parse_frame(&frame) {
                    Ok(Frame::Delta(text)) => return Poll::Ready(Some(Ok(text))),
                    Ok(Frame::Done) => {
                        self.done = true;
                        return Poll::Ready(None);
                    }
                    Ok(Frame::Skip) => continue,
                    Err(err) => {
                        warn!("failed to parse SSE frame: {err}");
                        return Poll::Ready(Some(Err(err)));
                    }
                }
            }

            // Need more data.
            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    self.buffer.push_str(&text);
                }
                Poll::Ready(Some(Err(err))) => {
                    return Poll::Ready(Some(Err(ChatApiError::NetworkError(err))));
                }
                Poll::Ready(None) => {
                    // Stream ended; a trailing frame may lack the blank line.
                    if self.buffer.trim().is_empty() {
                        return Poll::Ready(None);
                    }
                    let frame = std::mem::take(&mut self.buffer);
                    match Self::parse_frame(&frame) {
                        Ok(Frame::Delta(text)) => return Poll::Ready(Some(Ok(text))),
                        Ok(Frame::Done | Frame::Skip) => return Poll::Ready(None),
                        Err(err) => return Poll::Ready(Some(Err(err))),
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
