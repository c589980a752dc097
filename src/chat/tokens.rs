//! Token counting and conversation truncation.
//!
//! The conversation budget is enforced client-side before a request is
//! sent: `count_message_tokens` reports the cost of a conversation
//! (including the fixed framing overhead the completion endpoint adds),
//! and `truncate_messages` shrinks the history to fit the budget while
//! always preserving the newest message.
//!
//! Counting goes through the `cl100k` tokenizer; if the tokenizer cannot
//! be constructed the counter degrades to a characters/4 estimate. Both
//! paths are used consistently for display and truncation, which is all
//! the budget logic requires.

use crate::chat::ChatMessage;
use std::sync::OnceLock;
use tiktoken_rs::CoreBPE;

/// Approximate token cost of the server-side system prompt.
pub const SYSTEM_PROMPT_TOKENS: usize = 100;

/// Per-message overhead for role tagging and formatting.
pub const MESSAGE_OVERHEAD: usize = 4;

/// Default conversation budget; leaves room for response generation.
pub const DEFAULT_TOKEN_LIMIT: usize = 3800;

fn encoder() -> Option<&'static CoreBPE> {
    static ENCODER: OnceLock<Option<CoreBPE>> = OnceLock::new();
    ENCODER
        .get_or_init(|| match tiktoken_rs::cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(err) => {
                tracing::warn!("Tokenizer unavailable, using character estimate: {}", err);
                None
            }
        })
        .as_ref()
}

/// Estimates token count from character length (1 token per ~4 characters).
fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() + 3) / 4
}

/// Count tokens in a text string.
///
/// Never fails: tokenizer problems fall back to the character estimate.
///
/// # Examples
///
/// ```
/// use levrok::chat::tokens::count_tokens;
///
/// assert_eq!(count_tokens(""), 0);
/// assert!(count_tokens("hello world") > 0);
/// ```
pub fn count_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    match encoder() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => estimate_tokens(text),
    }
}

/// Count total tokens in a conversation, including the system prompt
/// overhead and per-message framing overhead.
///
/// An empty conversation still costs [`SYSTEM_PROMPT_TOKENS`].
pub fn count_message_tokens(messages: &[ChatMessage]) -> usize {
    let mut total = SYSTEM_PROMPT_TOKENS;
    for message in messages {
        total += count_tokens(&message.content) + MESSAGE_OVERHEAD;
    }
    total
}

/// Truncate a conversation to stay within a token budget.
///
/// The newest message is always kept, even when it alone exceeds the
/// budget (best-effort truncation, not rejection). Older messages are
/// considered newest-first; the scan stops at the first message that no
/// longer fits, so the result is a contiguous suffix of the input rather
/// than a best-fit packing. Original order is preserved.
///
/// Pure function: the input is not mutated and the result is
/// deterministic for identical input.
///
/// # Examples
///
/// ```
/// use levrok::chat::tokens::truncate_messages;
/// use levrok::chat::ChatMessage;
///
/// let history = vec![
///     ChatMessage::user("first question"),
///     ChatMessage::assistant("first answer"),
///     ChatMessage::user("second question"),
/// ];
/// let kept = truncate_messages(&history, 4000);
/// assert_eq!(kept, history); // fits the budget untouched
/// ```
pub fn truncate_messages(messages: &[ChatMessage], max_tokens: usize) -> Vec<ChatMessage> {
    let Some((last, rest)) = messages.split_last() else {
        return Vec::new();
    };

    // The newest message and the system prompt are non-negotiable.
    let mut current_tokens = SYSTEM_PROMPT_TOKENS + count_tokens(&last.content) + MESSAGE_OVERHEAD;
    let mut kept: Vec<ChatMessage> = Vec::new();

    // Walk backwards from most recent to oldest, keeping as many as fit.
    for message in rest.iter().rev() {
        let message_tokens = count_tokens(&message.content) + MESSAGE_OVERHEAD;
        if current_tokens + message_tokens <= max_tokens {
            current_tokens += message_tokens;
            kept.push(message.clone());
        } else {
            // An older message that does not fit ends the scan; we do not
            // skip past it to pick up smaller ones.
            break;
        }
    }

    kept.reverse();
    kept.push(last.clone());
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(contents: &[&str]) -> Vec<ChatMessage> {
        contents
            .iter()
            .enumerate()
            .map(|(i, content)| {
                if i % 2 == 0 {
                    ChatMessage::user(*content)
                } else {
                    ChatMessage::assistant(*content)
                }
            })
            .collect()
    }

    #[test]
    fn test_count_tokens_empty() {
        assert_eq!(count_tokens(""), 0);
    }

    #[test]
    fn test_count_tokens_nonzero() {
        assert!(count_tokens("hello") >= 1);
        assert!(count_tokens("a much longer sentence with many words") > count_tokens("hi"));
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens("test"), 1);
        assert_eq!(estimate_tokens("hello world"), 3);
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_empty_conversation_still_pays_system_overhead() {
        assert_eq!(count_message_tokens(&[]), SYSTEM_PROMPT_TOKENS);
    }

    #[test]
    fn test_message_tokens_include_overhead() {
        let messages = conversation(&["hi"]);
        let total = count_message_tokens(&messages);
        assert_eq!(
            total,
            SYSTEM_PROMPT_TOKENS + count_tokens("hi") + MESSAGE_OVERHEAD
        );
    }

    #[test]
    fn test_truncate_empty_stays_empty() {
        assert!(truncate_messages(&[], 1000).is_empty());
    }

    #[test]
    fn test_truncate_under_budget_is_identity() {
        let messages = conversation(&["one", "two", "three"]);
        let total = count_message_tokens(&messages);
        assert_eq!(truncate_messages(&messages, total), messages);
        assert_eq!(truncate_messages(&messages, total + 500), messages);
    }

    #[test]
    fn test_truncate_always_keeps_last_message() {
        let messages = conversation(&["one", "two", "three"]);
        let kept = truncate_messages(&messages, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0], messages[2]);
    }

    #[test]
    fn test_truncate_oversized_last_message_is_best_effort() {
        let huge = "word ".repeat(2000);
        let messages = vec![ChatMessage::user(huge.clone())];
        let kept = truncate_messages(&messages, 100);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].content, huge);
    }

    #[test]
    fn test_truncate_result_is_contiguous_suffix() {
        let contents: Vec<String> = (0..20).map(|i| format!("message number {}", i)).collect();
        let refs: Vec<&str> = contents.iter().map(|s| s.as_str()).collect();
        let messages = conversation(&refs);

        let total = count_message_tokens(&messages);
        let kept = truncate_messages(&messages, total / 2);

        assert!(!kept.is_empty());
        assert_eq!(kept.last(), messages.last());
        // A contiguous suffix: the kept slice equals the input's tail.
        let suffix_start = messages.len() - kept.len();
        assert_eq!(&messages[suffix_start..], kept.as_slice());
    }

    #[test]
    fn test_truncate_is_idempotent() {
        let contents: Vec<String> = (0..30).map(|i| format!("turn {} with some words", i)).collect();
        let refs: Vec<&str> = contents.iter().map(|s| s.as_str()).collect();
        let messages = conversation(&refs);

        let budget = count_message_tokens(&messages) / 3;
        let once = truncate_messages(&messages, budget);
        let twice = truncate_messages(&once, budget);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_truncate_does_not_skip_oversized_middle_message() {
        // Newest-first scan must stop at the big message instead of
        // reaching past it for the small old ones.
        let messages = vec![
            ChatMessage::user("tiny"),
            ChatMessage::assistant("tiny"),
            ChatMessage::user("long message ".repeat(200)),
            ChatMessage::assistant("small answer"),
            ChatMessage::user("newest"),
        ];

        let newest_cost = SYSTEM_PROMPT_TOKENS
            + count_tokens("newest")
            + count_tokens("small answer")
            + 2 * MESSAGE_OVERHEAD;
        let kept = truncate_messages(&messages, newest_cost + 10);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].content, "small answer");
        assert_eq!(kept[1].content, "newest");
    }

    #[test]
    fn test_truncate_long_conversation_fits_budget() {
        // Fifty short messages whose cumulative cost exceeds the budget
        // truncate to a suffix that fits, still ending with the newest.
        let contents: Vec<String> = (0..50)
            .map(|i| {
                format!(
                    "exchange number {}: {}",
                    i,
                    "planning discussion notes ".repeat(30)
                )
            })
            .collect();
        let refs: Vec<&str> = contents.iter().map(|s| s.as_str()).collect();
        let messages = conversation(&refs);

        let budget = DEFAULT_TOKEN_LIMIT;
        let total = count_message_tokens(&messages);
        assert!(total > budget, "scenario requires an over-budget history");

        let kept = truncate_messages(&messages, budget);
        assert!(count_message_tokens(&kept) <= budget);
        assert_eq!(kept.last(), messages.last());
        assert!(kept.len() < messages.len());
    }
}
