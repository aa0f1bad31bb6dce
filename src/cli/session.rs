//! Interactive chat session.
//!
//! Each line of input is streamed as one question, carrying the
//! conversation so far. Only exchanges that produced an answer are added to
//! the history.

use std::io::{BufRead, Write};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{render, stream_answer};
use crate::client::BrainClient;
use crate::error::BrainResult;
use crate::models::Conversation;
use crate::traits::HttpClient;

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInput<'a> {
    Blank,
    /// `exit`, `quit` or `salir`
    Exit,
    /// `clear`: forget the history
    Clear,
    Message(&'a str),
}

impl<'a> SessionInput<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => SessionInput::Blank,
            "exit" | "quit" | "salir" => SessionInput::Exit,
            "clear" => SessionInput::Clear,
            _ => SessionInput::Message(line),
        }
    }
}

/// State at the end of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEnd {
    pub conversation: Conversation,
    /// Ended by cancellation rather than `exit` or end of input
    pub interrupted: bool,
}

/// Read stdin lines on a plain thread.
///
/// A blocking read cannot be cancelled, so it stays off the runtime and the
/// process can exit while the thread waits.
pub fn spawn_stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run questions from `input` until `exit`, end of input, or `cancel`.
///
/// Request failures are printed and the session goes on.
pub async fn run_session<C: HttpClient>(
    client: &BrainClient<C>,
    mut input: mpsc::UnboundedReceiver<String>,
    quiet: bool,
    cancel: CancellationToken,
) -> BrainResult<SessionEnd> {
    let mut conversation = Conversation::new();

    render::print_header("BRAIN CHAT");
    render::print_step_line(
        "💬",
        "Type 'exit', 'quit' or 'salir' to leave, 'clear' to reset the history",
    );

    loop {
        prompt();
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Ok(SessionEnd { conversation, interrupted: true });
            }
            line = input.recv() => line,
        };
        let Some(line) = line else { break };

        let message = match SessionInput::parse(&line) {
            SessionInput::Blank => continue,
            SessionInput::Exit => break,
            SessionInput::Clear => {
                conversation.clear();
                render::print_step_line(render::icons::SUCCESS, "History cleared");
                continue;
            }
            SessionInput::Message(message) => message,
        };

        let request = conversation.request(message);
        match stream_answer(client, &request, quiet, cancel.clone()).await {
            Ok((outcome, _)) if outcome.is_cancelled() => {
                return Ok(SessionEnd {
                    conversation,
                    interrupted: true,
                });
            }
            Ok((_, progress)) => match progress.response {
                Some(answer) if !progress.is_failed() => {
                    conversation.record_exchange(message, answer);
                }
                _ => debug!("Exchange left out of the history"),
            },
            Err(err) => render::print_error(&err),
        }
    }

    Ok(SessionEnd {
        conversation,
        interrupted: false,
    })
}

fn prompt() {
    print!("\n> ");
    let _ = std::io::stdout().flush();
}
