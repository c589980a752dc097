//! Command-line interface definition for Levrok
//!
//! Defines the CLI structure using clap's derive API. The binary exposes
//! three subcommands: `chat` (interactive assistant), `slots` (availability
//! lookup), and `book` (meeting scheduling wizard).

use clap::{Parser, Subcommand};

/// Levrok - site assistant and scheduling client
#[derive(Debug, Parser)]
#[command(
    name = "levrok",
    about = "Conversational assistant and meeting-scheduling client for the Levrok Labs site",
    version
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Base URL of the site API (overrides the configuration file)
    #[arg(long, global = true, env = "LEVROK_BASE_URL")]
    pub base_url: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an interactive chat session with the site assistant
    Chat {
        /// Disable streaming responses and use buffered replies only
        #[arg(long)]
        no_stream: bool,
    },

    /// Show available meeting slots for a date
    Slots {
        /// Date to check, in YYYY-MM-DD format
        #[arg(long)]
        date: String,

        /// IANA timezone for displayed times (defaults to configuration)
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Schedule a meeting through the interactive booking wizard
    Book {
        /// IANA timezone for the booking (defaults to configuration)
        #[arg(long)]
        timezone: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments from the process environment
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse from an explicit argument list (used by tests)
    pub fn parse_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(args)
    }
}
