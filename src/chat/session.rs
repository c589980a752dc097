//! Conversation state for an interactive chat session.
//!
//! [`ChatSession`] owns the transcript, enforces the token budget before
//! each request, and drives the transport. Transcript entries carry a
//! stable identifier assigned at creation; truncation always removes a
//! contiguous prefix, so entries are dropped by position and identifiers
//! survive unchanged — there is no content-based matching anywhere.

use crate::chat::tokens::{count_message_tokens, truncate_messages};
use crate::chat::transport::{AssistantReply, ChatTransport};
use crate::chat::ChatMessage;
use crate::error::Result;

/// Static reply shown when both delivery modes fail.
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again.";

/// A transcript entry: a message plus its stable identifier.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    /// Identifier assigned when the entry was created; survives truncation
    pub id: u64,
    /// The message itself
    pub message: ChatMessage,
}

/// Interactive conversation state backed by a [`ChatTransport`].
pub struct ChatSession {
    transport: ChatTransport,
    entries: Vec<TranscriptEntry>,
    next_id: u64,
    token_limit: usize,
}

impl ChatSession {
    /// Create a session with the given transport and token budget.
    pub fn new(transport: ChatTransport, token_limit: usize) -> Self {
        Self {
            transport,
            entries: Vec::new(),
            next_id: 1,
            token_limit,
        }
    }

    /// The transcript in order, oldest first.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Current conversation cost in tokens, including framing overhead.
    ///
    /// Uses the same counter truncation uses, so the displayed usage
    /// always matches what the budget check sees.
    pub fn usage(&self) -> usize {
        let messages: Vec<ChatMessage> =
            self.entries.iter().map(|e| e.message.clone()).collect();
        count_message_tokens(&messages)
    }

    /// The configured token budget.
    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    /// Whether the next `send` will attempt streaming delivery.
    pub fn streaming_enabled(&self) -> bool {
        self.transport.streaming_enabled()
    }

    /// Switch the transport to buffered mode for the rest of the session.
    pub fn disable_streaming(&self) {
        self.transport.disable_streaming();
    }

    /// Submit a user message and return the assistant's reply handle.
    ///
    /// The message joins the transcript first; if the conversation then
    /// exceeds the budget, the oldest entries are dropped (the kept
    /// history is a contiguous suffix, so dropping `len - kept` entries
    /// from the front reconciles transcript and request exactly).
    ///
    /// Any previous reply stream must have been consumed or dropped by
    /// the caller before submitting again; ownership of [`AssistantReply`]
    /// makes overlapping streams impossible from a single session.
    pub async fn submit(&mut self, text: impl Into<String>) -> Result<AssistantReply> {
        self.push(ChatMessage::user(text.into()));

        let mut history: Vec<ChatMessage> =
            self.entries.iter().map(|e| e.message.clone()).collect();

        if count_message_tokens(&history) > self.token_limit {
            let kept = truncate_messages(&history, self.token_limit);
            let dropped = history.len() - kept.len();
            tracing::debug!(
                "Truncated {} old message(s) to fit the {}-token budget",
                dropped,
                self.token_limit
            );
            self.entries.drain(..dropped);
            history = kept;
        }

        self.transport.send(&history).await
    }

    /// Record the assistant's final reply text in the transcript.
    pub fn push_assistant(&mut self, text: impl Into<String>) -> u64 {
        self.push(ChatMessage::assistant(text.into()))
    }

    /// Record the static failure reply and return it for display.
    pub fn record_failure(&mut self) -> &'static str {
        self.push(ChatMessage::assistant(FALLBACK_REPLY));
        FALLBACK_REPLY
    }

    fn push(&mut self, message: ChatMessage) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(TranscriptEntry { id, message });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::tokens::SYSTEM_PROMPT_TOKENS;
    use crate::config::{ApiConfig, ChatConfig};

    fn session(token_limit: usize) -> ChatSession {
        let api = ApiConfig {
            base_url: "http://localhost:9".to_string(),
            timeout_seconds: 1,
        };
        let chat = ChatConfig {
            token_limit,
            stream: false,
        };
        let transport = ChatTransport::new(&api, &chat).unwrap();
        ChatSession::new(transport, token_limit)
    }

    #[test]
    fn test_empty_session_usage_is_system_overhead() {
        let session = session(3800);
        assert_eq!(session.usage(), SYSTEM_PROMPT_TOKENS);
        assert!(session.entries().is_empty());
    }

    #[test]
    fn test_push_assistant_assigns_increasing_ids() {
        let mut session = session(3800);
        let first = session.push_assistant("one");
        let second = session.push_assistant("two");
        assert!(second > first);
        assert_eq!(session.entries().len(), 2);
    }

    #[test]
    fn test_record_failure_appends_fallback_reply() {
        let mut session = session(3800);
        let reply = session.record_failure();
        assert_eq!(reply, FALLBACK_REPLY);
        assert_eq!(session.entries()[0].message.content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_submit_truncates_transcript_and_keeps_ids() {
        // A tight budget forces truncation on every submission. The
        // transport call fails (nothing listens), which is fine: the
        // transcript bookkeeping under test happens before the request.
        let mut session = session(160);

        let filler = "some words that cost a handful of tokens each time";
        let _ = session.submit(filler).await;
        session.push_assistant(filler);
        let _ = session.submit(filler).await;
        session.push_assistant(filler);

        let before: Vec<u64> = session.entries().iter().map(|e| e.id).collect();
        let _ = session.submit(filler).await;

        let after: Vec<u64> = session.entries().iter().map(|e| e.id).collect();
        assert!(session.entries().len() <= before.len() + 1);
        // Surviving entries kept their original identifiers.
        for id in &after[..after.len() - 1] {
            assert!(before.contains(id));
        }
        // The newest entry is the just-submitted user message.
        let last = session.entries().last().unwrap();
        assert!(last.message.is_user());
        assert_eq!(last.message.content, filler);
    }
}
