//! The interactive prompt (§6 "CLI prompt"): multi-line input accumulation
//! terminated by `;`, with in-memory history via `rustyline`. The
//! accumulation logic itself is a pure function over strings so it can be
//! tested without a live terminal (§2a "test tooling").

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::engine::Engine;

const EXIT_COMMAND: &str = "exit";

/// Feeds one line into a pending multi-line buffer. Returns the complete
/// statement (without its trailing `;`) once a line ends the statement,
/// or `None` if more input is still needed. Empty lines outside a pending
/// query are ignored by the caller, not by this function.
pub fn accumulate(buffer: &mut String, line: &str) -> Option<String> {
    if !buffer.is_empty() {
        buffer.push(' ');
    }
    buffer.push_str(line.trim());
    if let Some(stripped) = buffer.strip_suffix(';') {
        let statement = stripped.trim().to_string();
        buffer.clear();
        Some(statement)
    } else {
        None
    }
}

pub fn run(engine: &mut Engine) -> rustyline::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "sql> " } else { "...> " };
        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if buffer.is_empty() && trimmed.eq_ignore_ascii_case(EXIT_COMMAND) {
                    break;
                }
                if trimmed.is_empty() && buffer.is_empty() {
                    continue;
                }
                editor.add_history_entry(line.as_str())?;
                if let Some(statement) = accumulate(&mut buffer, &line) {
                    if !statement.is_empty() {
                        println!("{}", engine.execute(&statement));
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
