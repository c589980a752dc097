//! Chat subsystem: messages, token budgeting, transport, and streaming.
//!
//! The flow mirrors what the site's chat widget does: count the
//! conversation's token cost, truncate history that no longer fits the
//! budget, send the request stream-first, and reassemble streamed deltas
//! into progressively growing reply text.

pub mod message;
pub mod session;
pub mod stream;
pub mod tokens;
pub mod transport;

pub use message::ChatMessage;
pub use session::{ChatSession, TranscriptEntry, FALLBACK_REPLY};
pub use stream::{ReplyStream, DONE_SENTINEL};
pub use transport::{AssistantReply, ChatTransport, CHAT_ROUTE};
