//! Levrok - site assistant and scheduling client library
//!
//! This library backs the `levrok` CLI: a conversational assistant and
//! meeting-scheduling client for the Levrok Labs site.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `chat`: messages, token budgeting, transport, and reply streaming
//! - `scheduling`: availability lookups (cached), booking, and the wizard
//! - `commands`: CLI command handlers
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use levrok::chat::{ChatMessage, ChatTransport};
//! use levrok::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let transport = ChatTransport::new(&config.api, &config.chat)?;
//!     let _reply = transport.send(&[ChatMessage::user("Hello!")]).await?;
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod scheduling;

// Re-export commonly used types
pub use chat::{AssistantReply, ChatMessage, ChatSession, ChatTransport, ReplyStream};
pub use config::Config;
pub use error::{LevrokError, Result};
pub use scheduling::{AvailabilityCache, AvailabilityClient, BookingClient, BookingWizard};
