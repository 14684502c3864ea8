//! Interactive questions asked while gathering operation parameters.
//!
//! Operations depend only on [`Prompter`]; the terminal implementation is the
//! one wired up by the binary, tests use a scripted one.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

/// Asks a human for a yes/no answer or a line of text.
pub trait Prompter {
    /// Ask a yes/no question. Returns `default` when no usable answer is given.
    fn ask_confirm(&mut self, prompt: &str, default: bool) -> bool;

    /// Ask for a line of text. Returns `default` when the answer is empty.
    fn ask_text(&mut self, prompt: &str, default: &str) -> String;
}

/// Line-based prompter over any reader/writer pair (stdin/stdout in the binary).
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one line. `None` on EOF or read error.
    fn read_answer(&mut self, question: &str) -> Option<String> {
        if let Err(err) = write!(self.output, "? {question} ").and_then(|()| self.output.flush()) {
            warn!(err = %err, "failed to write prompt");
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                debug!("prompt input closed");
                None
            }
            Ok(_) => Some(line.trim().to_string()),
            Err(err) => {
                warn!(err = %err, "failed to read prompt answer");
                None
            }
        }
    }
}

impl TerminalPrompter<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompter over the process's stdin and stdout.
    ///
    /// Stdin is read through the shared buffered handle, so each answer takes
    /// one line but input typed ahead of later prompts may already sit in that
    /// buffer. Bytes buffered here never reach a child process that inherits
    /// stdin, such as git asking for credentials during `push`; answer git's
    /// own prompts only once they appear.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask_confirm(&mut self, prompt: &str, default: bool) -> bool {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        let answer = self.read_answer(&format!("{prompt} {hint}"));
        match answer.as_deref().map(str::to_lowercase).as_deref() {
            Some("y" | "yes") => true,
            Some("n" | "no") => false,
            _ => default,
        }
    }

    fn ask_text(&mut self, prompt: &str, default: &str) -> String {
        let question = if default.is_empty() {
            prompt.to_string()
        } else {
            format!("{prompt} ({default})")
        };
        match self.read_answer(&question) {
            Some(answer) if !answer.is_empty() => answer,
            _ => default.to_string(),
        }
    }
}
