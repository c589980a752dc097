//! Progressive reassembly of streamed chat replies.
//!
//! The completion endpoint streams its reply as newline-delimited
//! event frames:
//!
//! ```text
//! data: {"content":"Hel"}
//! data: {"content":"lo"}
//! data: [DONE]
//! ```
//!
//! Only `data:`-prefixed records carry payload; anything else (blank
//! lines, comments, pings) is ignored, which keeps the parser
//! forward-compatible. A malformed payload is skipped with a log line
//! rather than aborting the stream. The literal `[DONE]` sentinel ends
//! the stream cleanly.
//!
//! [`ReplyStream`] turns the raw byte stream into a lazy sequence of
//! accumulated-text snapshots: after each delta the *full text so far* is
//! yielded, so a renderer can repaint progressively. The sequence is
//! finite and append-only; a terminated or errored stream cannot be
//! resumed. Dropping the stream releases the underlying connection, so a
//! consumer that stops reading cancels the transfer.

use crate::error::{LevrokError, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Sentinel payload marking the clean end of a reply stream.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_PREFIX: &str = "data:";

/// A single streamed delta payload.
#[derive(Debug, Deserialize)]
struct DeltaFrame {
    #[serde(default)]
    content: Option<String>,
}

/// Outcome of parsing one record line.
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    /// A text fragment to append to the accumulator
    Delta(String),
    /// The terminal sentinel
    Done,
    /// Nothing to apply (non-data line, empty delta, malformed payload)
    Skip,
}

/// Parse one newline-delimited record into a frame.
fn parse_frame(line: &str) -> Frame {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Frame::Skip;
    };
    let payload = payload.trim();

    if payload == DONE_SENTINEL {
        return Frame::Done;
    }

    match serde_json::from_str::<DeltaFrame>(payload) {
        Ok(DeltaFrame {
            content: Some(fragment),
        }) if !fragment.is_empty() => Frame::Delta(fragment),
        Ok(_) => Frame::Skip,
        Err(err) => {
            tracing::debug!("Skipping malformed stream frame: {}", err);
            Frame::Skip
        }
    }
}

/// A streamed assistant reply, yielded as accumulated-text snapshots.
///
/// Each item is the full reply text received so far (`"Hel"`, `"Hello"`,
/// ...). The final snapshot is the complete reply. A read error surfaces
/// as an `Err` item after the snapshots that preceded it; partial text is
/// never discarded, only marked incomplete by the trailing error.
#[derive(Debug)]
pub struct ReplyStream {
    rx: ReceiverStream<Result<String>>,
}

impl ReplyStream {
    /// Build a reply stream from a stream of raw byte chunks.
    ///
    /// Chunk boundaries need not align with record boundaries; partial
    /// lines are buffered until their trailing newline arrives. Tests can
    /// feed a synthetic chunk sequence instead of a live HTTP body.
    pub fn new<S, E>(byte_stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            reassemble(byte_stream, tx).await;
        });
        Self {
            rx: ReceiverStream::new(rx),
        }
    }

    /// Drain the stream and return the final accumulated text.
    ///
    /// # Errors
    ///
    /// Returns the stream's error if the read failed mid-way; text
    /// accumulated before the failure is lost to the caller, which should
    /// consume snapshots directly when partial output matters.
    pub async fn final_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(snapshot) = self.next().await {
            text = snapshot?;
        }
        Ok(text)
    }
}

impl Stream for ReplyStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}

/// Consume the byte stream, emitting an accumulated snapshot per delta.
///
/// Frames are applied strictly in arrival order and the accumulator is
/// append-only. Returns when the sentinel arrives, the byte stream ends,
/// the receiver is dropped (cancellation), or a read error is forwarded.
async fn reassemble<S, E>(byte_stream: S, tx: mpsc::Sender<Result<String>>)
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut buffer = String::new();
    let mut accumulated = String::new();

    tokio::pin!(byte_stream);

    while let Some(chunk_result) = byte_stream.next().await {
        let chunk = match chunk_result {
            Ok(chunk) => chunk,
            Err(err) => {
                tracing::warn!("Reply stream read failed: {}", err);
                let _ = tx
                    .send(Err(
                        LevrokError::Stream(format!("stream read failed: {}", err)).into()
                    ))
                    .await;
                return;
            }
        };

        let text = match std::str::from_utf8(&chunk) {
            Ok(text) => text,
            Err(_) => continue,
        };
        buffer.push_str(text);

        // Records are newline-delimited; keep any partial trailing line.
        while let Some(pos) = buffer.find('\n') {
            let line: String = buffer.drain(..=pos).collect();
            match parse_frame(line.trim_end_matches(&['\n', '\r'][..])) {
                Frame::Delta(fragment) => {
                    accumulated.push_str(&fragment);
                    if tx.send(Ok(accumulated.clone())).await.is_err() {
                        // Consumer went away; stop reading the network.
                        return;
                    }
                }
                Frame::Done => return,
                Frame::Skip => {}
            }
        }
    }

    // A final record without a trailing newline still counts.
    if !buffer.is_empty() {
        if let Frame::Delta(fragment) = parse_frame(buffer.trim_end_matches('\r')) {
            accumulated.push_str(&fragment);
            let _ = tx.send(Ok(accumulated.clone())).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn chunks(parts: &[&str]) -> Vec<std::result::Result<Bytes, io::Error>> {
        parts
            .iter()
            .map(|p| Ok(Bytes::from(p.to_string())))
            .collect()
    }

    async fn collect_snapshots(
        parts: Vec<std::result::Result<Bytes, io::Error>>,
    ) -> Vec<Result<String>> {
        let stream = ReplyStream::new(futures::stream::iter(parts));
        stream.collect::<Vec<_>>().await
    }

    #[test]
    fn test_parse_frame_delta() {
        assert_eq!(
            parse_frame(r#"data: {"content":"Hel"}"#),
            Frame::Delta("Hel".to_string())
        );
    }

    #[test]
    fn test_parse_frame_done_sentinel() {
        assert_eq!(parse_frame("data: [DONE]"), Frame::Done);
    }

    #[test]
    fn test_parse_frame_ignores_non_data_lines() {
        assert_eq!(parse_frame(""), Frame::Skip);
        assert_eq!(parse_frame(": keep-alive comment"), Frame::Skip);
        assert_eq!(parse_frame("event: ping"), Frame::Skip);
    }

    #[test]
    fn test_parse_frame_skips_malformed_payload() {
        assert_eq!(parse_frame("data: not-json"), Frame::Skip);
    }

    #[test]
    fn test_parse_frame_skips_empty_delta() {
        assert_eq!(parse_frame(r#"data: {"content":""}"#), Frame::Skip);
        assert_eq!(parse_frame(r#"data: {"other":"field"}"#), Frame::Skip);
    }

    #[tokio::test]
    async fn test_snapshot_sequence_accumulates() {
        let parts = chunks(&[
            "data: {\"content\":\"Hel\"}\n",
            "data: {\"content\":\"lo\"}\n",
            "data: [DONE]\n",
        ]);
        let snapshots = collect_snapshots(parts).await;
        let texts: Vec<String> = snapshots.into_iter().map(|s| s.unwrap()).collect();
        assert_eq!(texts, vec!["Hel".to_string(), "Hello".to_string()]);
    }

    #[tokio::test]
    async fn test_nothing_after_done_sentinel() {
        let parts = chunks(&[
            "data: {\"content\":\"done\"}\n",
            "data: [DONE]\n",
            "data: {\"content\":\"ignored\"}\n",
        ]);
        let snapshots = collect_snapshots(parts).await;
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].as_ref().unwrap(), "done");
    }

    #[tokio::test]
    async fn test_malformed_frame_between_valid_frames_is_skipped() {
        let parts = chunks(&[
            "data: {\"content\":\"a\"}\n",
            "data: not-json\n",
            "data: {\"content\":\"b\"}\n",
            "data: [DONE]\n",
        ]);
        let snapshots = collect_snapshots(parts).await;
        let texts: Vec<String> = snapshots.into_iter().map(|s| s.unwrap()).collect();
        assert_eq!(texts, vec!["a".to_string(), "ab".to_string()]);
    }

    #[tokio::test]
    async fn test_record_split_across_chunks() {
        let parts = chunks(&[
            "data: {\"con",
            "tent\":\"Hel\"}\ndata: {\"content\":\"lo\"}",
            "\ndata: [DONE]\n",
        ]);
        let snapshots = collect_snapshots(parts).await;
        let texts: Vec<String> = snapshots.into_iter().map(|s| s.unwrap()).collect();
        assert_eq!(texts, vec!["Hel".to_string(), "Hello".to_string()]);
    }

    #[tokio::test]
    async fn test_crlf_delimited_records() {
        let parts = chunks(&[
            "data: {\"content\":\"Hi\"}\r\n",
            "data: [DONE]\r\n",
        ]);
        let snapshots = collect_snapshots(parts).await;
        let texts: Vec<String> = snapshots.into_iter().map(|s| s.unwrap()).collect();
        assert_eq!(texts, vec!["Hi".to_string()]);
    }

    #[tokio::test]
    async fn test_read_error_surfaces_after_partial_snapshots() {
        let parts: Vec<std::result::Result<Bytes, io::Error>> = vec![
            Ok(Bytes::from_static(b"data: {\"content\":\"part\"}\n")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ];
        let snapshots = collect_snapshots(parts).await;
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].as_ref().unwrap(), "part");
        assert!(snapshots[1].is_err());
    }

    #[tokio::test]
    async fn test_trailing_record_without_newline() {
        let parts = chunks(&["data: {\"content\":\"tail\"}"]);
        let snapshots = collect_snapshots(parts).await;
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].as_ref().unwrap(), "tail");
    }

    #[tokio::test]
    async fn test_final_text_returns_complete_reply() {
        let parts = chunks(&[
            "data: {\"content\":\"Hel\"}\n",
            "data: {\"content\":\"lo\"}\n",
            "data: [DONE]\n",
        ]);
        let stream = ReplyStream::new(futures::stream::iter(parts));
        assert_eq!(stream.final_text().await.unwrap(), "Hello");
    }
}
