//! Outcome of a single capture/stream round.

/// Result of streaming one round's response through the classifier.
///
/// Exactly one of three disjoint cases holds. `Valid` carries both the
/// display projection (header stripped) and the untouched raw buffer; the
/// raw text is what gets committed to history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Model signaled a usable answer.
    Valid {
        /// Final header-stripped, trimmed text for the display.
        display_text: String,
        /// Raw accumulated response, committed verbatim as the assistant
        /// message.
        raw_text: String,
    },
    /// Model answered with the invalid-request token; the round is rolled
    /// back and retried sooner.
    Rejected {
        /// The model's rejection text, shown as the countdown prefix.
        reason: String,
    },
    /// Transport failure, undetermined classification, or an empty committed
    /// answer. The round is rolled back.
    Failed {
        /// Human-readable description for the log.
        message: String,
    },
}

impl RoundOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
