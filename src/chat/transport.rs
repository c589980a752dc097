//! Chat HTTP transport with stream-first delivery and buffered fallback.
//!
//! The transport POSTs the conversation to the site's completion endpoint.
//! Two delivery modes exist:
//!
//! - **streamed** (`?stream=true`): the reply arrives as a
//!   `text/event-stream` body consumed through [`ReplyStream`]
//! - **buffered**: the reply is a single JSON object `{"message": ...}`
//!
//! Streaming is attempted first when enabled. If the streaming request
//! cannot be established (connection error, non-success status), the same
//! conversation is transparently retried once in buffered mode and a
//! transport-level flag skips the streaming attempt on subsequent calls.
//! A streaming request answered with a non-SSE content type is not a
//! failure: the body is parsed as the buffered shape directly and the
//! reassembler never runs.

use crate::chat::stream::ReplyStream;
use crate::chat::ChatMessage;
use crate::config::{ApiConfig, ChatConfig};
use crate::error::{LevrokError, Result};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// API route serving chat completions.
pub const CHAT_ROUTE: &str = "/api/chat";

/// Request body for the completion endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

/// Buffered reply shape.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: String,
}

/// Error reply shape.
#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: String,
}

/// An assistant reply, in whichever mode the endpoint delivered it.
#[derive(Debug)]
pub enum AssistantReply {
    /// One complete text block
    Buffered(String),
    /// A progressive stream of accumulated-text snapshots
    Streaming(ReplyStream),
}

/// HTTP client for the chat completion endpoint.
///
/// # Examples
///
/// ```no_run
/// use levrok::config::{ApiConfig, ChatConfig};
/// use levrok::chat::{ChatMessage, ChatTransport};
///
/// # async fn example() -> levrok::error::Result<()> {
/// let transport = ChatTransport::new(&ApiConfig::default(), &ChatConfig::default())?;
/// let reply = transport.send(&[ChatMessage::user("Hello!")]).await?;
/// # Ok(())
/// # }
/// ```
pub struct ChatTransport {
    client: reqwest::Client,
    chat_url: String,
    bearer_token: Option<String>,
    /// Set after a failed streaming handshake so later calls skip straight
    /// to buffered mode. Soft optimization, not a correctness requirement.
    streaming_disabled: AtomicBool,
}

impl ChatTransport {
    /// Create a new transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(api: &ApiConfig, chat: &ChatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_seconds))
            .user_agent(concat!("levrok/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LevrokError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            chat_url: api.route(CHAT_ROUTE),
            bearer_token: api.bearer_token(),
            streaming_disabled: AtomicBool::new(!chat.stream),
        })
    }

    /// Whether the next `send` will attempt streaming delivery.
    pub fn streaming_enabled(&self) -> bool {
        !self.streaming_disabled.load(Ordering::Relaxed)
    }

    /// Permanently switch this transport to buffered mode.
    ///
    /// Called by consumers that hit a mid-stream read error, so the next
    /// request skips the handshake that is likely to fail again.
    pub fn disable_streaming(&self) {
        self.streaming_disabled.store(true, Ordering::Relaxed);
    }

    /// Send a conversation and return the assistant's reply.
    ///
    /// Streaming is attempted first when enabled; any failure to establish
    /// the stream falls back to one buffered retry of the same
    /// conversation, invisibly to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error only when the buffered mode also fails; callers
    /// map it to a single user-visible failure message and the underlying
    /// cause stays in the logs.
    pub async fn send(&self, messages: &[ChatMessage]) -> Result<AssistantReply> {
        if self.streaming_enabled() {
            match self.try_streaming(messages).await {
                Ok(reply) => return Ok(reply),
                Err(err) => {
                    tracing::warn!("Streaming request failed, falling back to buffered: {}", err);
                    self.disable_streaming();
                }
            }
        }

        let text = self.send_buffered(messages).await?;
        Ok(AssistantReply::Buffered(text))
    }

    /// Issue a streaming request.
    ///
    /// A non-SSE response content type is handled here by parsing the body
    /// as the buffered shape; only connection-level and status failures
    /// propagate as errors (which trigger the buffered fallback).
    async fn try_streaming(&self, messages: &[ChatMessage]) -> Result<AssistantReply> {
        let url = format!("{}?stream=true", self.chat_url);
        let response = self
            .request(&url)
            .json(&ChatRequest { messages })
            .send()
            .await
            .map_err(|e| LevrokError::Transport(format!("Streaming request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.upstream_error(response).await.into());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.contains("text/event-stream") {
            Ok(AssistantReply::Streaming(ReplyStream::new(
                response.bytes_stream(),
            )))
        } else {
            // The endpoint answered in buffered mode despite the stream
            // request; use the JSON body as the final reply.
            let reply: ChatResponse = response
                .json()
                .await
                .map_err(|e| LevrokError::Transport(format!("Invalid chat reply: {}", e)))?;
            Ok(AssistantReply::Buffered(reply.message))
        }
    }

    /// Issue a buffered request and parse the single JSON reply.
    async fn send_buffered(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self
            .request(&self.chat_url)
            .json(&ChatRequest { messages })
            .send()
            .await
            .map_err(|e| LevrokError::Transport(format!("Chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.upstream_error(response).await.into());
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| LevrokError::Transport(format!("Invalid chat reply: {}", e)))?;
        Ok(reply.message)
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.post(url);
        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Turn a non-success response into an upstream error, salvaging the
    /// error payload's message when the body has the documented shape.
    async fn upstream_error(&self, response: reqwest::Response) -> LevrokError {
        let status = response.status().as_u16();
        let message = match response.json::<ChatErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => "request rejected by the chat endpoint".to_string(),
        };
        LevrokError::Upstream { status, message }
    }
}
