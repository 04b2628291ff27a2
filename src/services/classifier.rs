//! Streaming response classification and throttled partial projection.
//!
//! The classifier consumes one round's text fragments as they arrive,
//! decides valid / model-rejected / undetermined from the accumulated
//! buffer's prefix, and produces throttled "answer so far" projections for
//! the display while the round looks valid.

use std::time::Duration;
use tokio::time::Instant;

use crate::domain::models::RoundOutcome;

/// Classification state while fragments are still arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Undetermined,
    Valid,
    Invalid,
}

/// Per-round stream classifier.
///
/// Feed fragments with [`push_fragment`](Self::push_fragment); each call may
/// return a partial projection to show on the display. Terminate with
/// [`finish`](Self::finish) on normal completion or
/// [`fail`](Self::fail) on a stream-level error.
pub struct StreamClassifier {
    buffer: String,
    verdict: Verdict,
    min_interval: Duration,
    last_emit: Option<Instant>,
}

impl StreamClassifier {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            buffer: String::new(),
            verdict: Verdict::Undetermined,
            min_interval,
            last_emit: None,
        }
    }

    /// Accumulate one fragment. Returns a header-stripped partial projection
    /// when the round is tentatively valid, the projection is non-blank, and
    /// the throttle interval has elapsed (the first emission is always
    /// allowed).
    pub fn push_fragment(&mut self, fragment: &str) -> Option<String> {
        if fragment.is_empty() {
            return None;
        }
        self.buffer.push_str(fragment);

        if self.verdict == Verdict::Undetermined {
            let head = self.buffer.trim().to_lowercase();
            if !head.is_empty() {
                if head.starts_with("valid") {
                    self.verdict = Verdict::Valid;
                } else if head.starts_with("invalid") {
                    self.verdict = Verdict::Invalid;
                }
                // Anything else stays undetermined and is re-evaluated on
                // the next fragment.
            }
        }

        if self.verdict != Verdict::Valid {
            return None;
        }

        let projection = strip_valid_header(&self.buffer);
        if projection.trim().is_empty() {
            return None;
        }
        let now = Instant::now();
        let due = match self.last_emit {
            None => true,
            Some(last) => now.duration_since(last) >= self.min_interval,
        };
        if !due {
            return None;
        }
        self.last_emit = Some(now);
        Some(projection.to_string())
    }

    /// Classify after the stream completed normally.
    pub fn finish(self) -> RoundOutcome {
        match self.verdict {
            Verdict::Invalid => RoundOutcome::Rejected {
                reason: self.buffer.trim().to_string(),
            },
            Verdict::Undetermined => RoundOutcome::Failed {
                message: "cannot determine valid/invalid from stream".to_string(),
            },
            Verdict::Valid => {
                let display_text = strip_valid_header(&self.buffer).trim().to_string();
                if display_text.is_empty() {
                    // The model signaled validity but produced nothing worth
                    // committing; keep presentation consistent with the
                    // commit contract.
                    RoundOutcome::Failed {
                        message: "empty assistant output".to_string(),
                    }
                } else {
                    RoundOutcome::Valid {
                        display_text,
                        raw_text: self.buffer,
                    }
                }
            }
        }
    }

    /// Classify after a stream-level error. Buffered content is discarded;
    /// no assistant message is ever built from an errored stream.
    pub fn fail(self, description: impl Into<String>) -> RoundOutcome {
        RoundOutcome::Failed {
            message: description.into(),
        }
    }
}

/// Strip the leading `valid request` header the model emits before the
/// actual answer. Handles variations like `valid`, `Valid Request:` and
/// `valid request-`; the keyword must end at a word boundary so text such
/// as `validity` is left alone.
pub fn strip_valid_header(text: &str) -> &str {
    let t = text.trim_start();
    let Some(after_valid) = strip_keyword(t, "valid") else {
        return t;
    };
    let mut rest = after_valid;
    let ws_stripped = rest.trim_start();
    if ws_stripped.len() < rest.len() {
        if let Some(after_request) = strip_keyword(ws_stripped, "request") {
            rest = after_request;
        }
    }
    let rest = rest.strip_prefix([':', '-']).unwrap_or(rest);
    rest.trim_start()
}

/// Case-insensitive keyword strip with a trailing word-boundary check.
///
/// The prefix comparison is done on bytes: an ASCII match of the whole
/// keyword guarantees `keyword.len()` falls on a char boundary, so the
/// slice below cannot panic on multibyte text after the header.
fn strip_keyword<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    if s.len() < keyword.len()
        || !s.as_bytes()[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
    {
        return None;
    }
    let rest = &s[keyword.len()..];
    match rest.chars().next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => None,
        _ => Some(rest),
    }
}
