//! Command handlers invoked by the CLI entrypoint.
//!
//! Each handler is intentionally small and composes the library
//! components: the chat session and transport, the availability client,
//! and the booking wizard.

pub mod book;
pub mod chat;
pub mod slots;
