//! Line input from the terminal.

use std::thread;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

const PROMPT: &str = "> ";

/// What the user asked for with one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    /// Username before login, message afterwards.
    Line(String),
    Leave,
    Quit,
}

pub fn parse_intent(line: &str) -> UserIntent {
    match line.trim() {
        "/leave" => UserIntent::Leave,
        "/quit" | "/exit" => UserIntent::Quit,
        _ => UserIntent::Line(line.to_string()),
    }
}

/// Read lines on a dedicated thread and forward them as intents.
///
/// rustyline blocks, so it cannot run on the async runtime. EOF, Ctrl-C and
/// editor errors all end the input with [`UserIntent::Quit`].
pub fn spawn_reader(intents: mpsc::UnboundedSender<UserIntent>) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("agora-input".to_string())
        .spawn(move || {
            let mut editor = match DefaultEditor::new() {
                Ok(editor) => editor,
                Err(e) => {
                    tracing::warn!("Cannot open line editor: {}", e);
                    let _ = intents.send(UserIntent::Quit);
                    return;
                }
            };

            loop {
                let intent = match editor.readline(PROMPT) {
                    Ok(line) => {
                        if !line.trim().is_empty() {
                            let _ = editor.add_history_entry(line.as_str());
                        }
                        parse_intent(&line)
                    }
                    Err(ReadlineError::Interrupted | ReadlineError::Eof) => UserIntent::Quit,
                    Err(e) => {
                        tracing::warn!("Input error: {}", e);
                        UserIntent::Quit
                    }
                };

                let quit = intent == UserIntent::Quit;
                if intents.send(intent).is_err() || quit {
                    break;
                }
            }
        })
}
