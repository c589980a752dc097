//! Interactive chat command.
//!
//! Runs a readline loop against the site assistant. Streamed replies are
//! rendered progressively; a token meter in the prompt header shows the
//! conversation cost against the budget, colored by how close it is.

use crate::chat::{AssistantReply, ChatSession, ChatTransport};
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use futures::StreamExt;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write as _;

/// Start the interactive chat session.
///
/// # Arguments
///
/// * `config` - Validated application configuration
/// * `no_stream` - Force buffered replies regardless of configuration
pub async fn run_chat(config: Config, no_stream: bool) -> Result<()> {
    let mut chat_config = config.chat.clone();
    if no_stream {
        chat_config.stream = false;
    }

    let transport = ChatTransport::new(&config.api, &chat_config)?;
    let mut session = ChatSession::new(transport, chat_config.token_limit);

    let mut rl = DefaultEditor::new()?;

    println!("{}", "Levrok Labs AI".bold());
    println!("Ask about our services, or type /quit to leave.\n");

    loop {
        println!("{}", usage_meter(&session));
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                rl.add_history_entry(trimmed)?;

                match session.submit(trimmed).await {
                    Ok(AssistantReply::Buffered(text)) => {
                        session.push_assistant(text.clone());
                        println!("\n{}\n", text);
                    }
                    Ok(AssistantReply::Streaming(stream)) => {
                        render_stream(&mut session, stream).await;
                    }
                    Err(err) => {
                        tracing::warn!("Chat request failed: {:#}", err);
                        let reply = session.record_failure();
                        println!("\n{}\n", reply.yellow());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Render a streamed reply progressively, printing only each snapshot's
/// new suffix. The accumulator is append-only, so the previously rendered
/// text is always a prefix of the next snapshot.
async fn render_stream(
    session: &mut ChatSession,
    mut stream: crate::chat::ReplyStream,
) {
    let mut rendered = String::new();
    print!("\n");

    while let Some(item) = stream.next().await {
        match item {
            Ok(snapshot) => {
                print!("{}", &snapshot[rendered.len()..]);
                let _ = std::io::stdout().flush();
                rendered = snapshot;
            }
            Err(err) => {
                tracing::warn!("Reply stream failed mid-way: {:#}", err);
                // Later requests skip the handshake that just broke.
                session.disable_streaming();
                if rendered.is_empty() {
                    let reply = session.record_failure();
                    println!("{}\n", reply.yellow());
                } else {
                    // Keep the partial text; it is real assistant output.
                    session.push_assistant(rendered.clone());
                    println!("\n{}\n", "(connection lost mid-reply)".dimmed());
                }
                return;
            }
        }
    }

    if rendered.is_empty() {
        let reply = session.record_failure();
        println!("{}\n", reply.yellow());
    } else {
        session.push_assistant(rendered);
        println!("\n");
    }
}

/// Token meter shown above each prompt, colored by budget pressure.
fn usage_meter(session: &ChatSession) -> String {
    let used = session.usage();
    let limit = session.token_limit();
    let text = format!("{}/{} tokens", used, limit);

    let colored = if used * 10 < limit * 8 {
        text.green()
    } else if used * 20 < limit * 19 {
        text.yellow()
    } else {
        text.red()
    };
    colored.to_string()
}
