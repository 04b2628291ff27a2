//! Conversation messages and the bounded, transactional history log.

use serde::{Deserialize, Serialize};

/// Maximum number of User/Assistant rounds retained in history.
pub const MAX_ROUNDS: usize = 5;

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single conversation message. Immutable once created.
///
/// `image` carries an inline `data:image/jpeg;base64,...` URL when the
/// message includes a captured photo; the wire adapter turns it into a
/// multimodal content part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            image: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            image: None,
        }
    }

    pub fn user_with_image(content: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            image: Some(image_url.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            image: None,
        }
    }
}

/// Opaque copy of the history taken before a round, used for rollback.
#[derive(Debug, Clone)]
pub struct HistorySnapshot(Vec<Message>);

/// Ordered message log with a pinned leading system message.
///
/// Mutated only through `begin_round` / `commit_round` / `rollback`, so after
/// any round the log is in exactly one of two states: the pre-round snapshot,
/// or the snapshot plus one complete User/Assistant pair, trimmed to the last
/// [`MAX_ROUNDS`] rounds.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    max_rounds: usize,
}

impl ConversationHistory {
    /// Create a history seeded with the given system prompt at index 0.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self::with_max_rounds(system_prompt, MAX_ROUNDS)
    }

    pub fn with_max_rounds(system_prompt: impl Into<String>, max_rounds: usize) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            max_rounds,
        }
    }

    /// O(n) copy of the current message sequence.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot(self.messages.clone())
    }

    /// Append the round's provisional user message. No trimming happens here;
    /// the message is either committed (with its assistant reply) or rolled
    /// back before the next round observes the log.
    pub fn begin_round(&mut self, user_message: Message) {
        self.messages.push(user_message);
    }

    /// Append the assistant reply completing the current round, then trim to
    /// the last `2 * max_rounds` non-system messages, oldest dropped first.
    pub fn commit_round(&mut self, assistant_message: Message) {
        self.messages.push(assistant_message);
        self.trim();
    }

    /// Replace the whole sequence with the snapshot, discarding any
    /// uncommitted provisional message.
    pub fn rollback(&mut self, snapshot: HistorySnapshot) {
        self.messages = snapshot.0;
    }

    /// Current messages, system prompt first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn trim(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        let system_count = usize::from(self.messages[0].role == Role::System);
        let keep = 2 * self.max_rounds;
        let rest = self.messages.len() - system_count;
        if rest > keep {
            let drop = rest - keep;
            self.messages.drain(system_count..system_count + drop);
        }
    }
}
