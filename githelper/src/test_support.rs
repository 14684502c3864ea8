//! Test-only doubles for the git runner and the prompter.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::io::process::{CommandError, CommandRunner, GitCommand};
use crate::io::prompt::Prompter;

/// Runner that answers from a script keyed by command summary.
///
/// Unscripted commands succeed with empty output. Every call is recorded.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, Result<String, String>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed with `stdout` when `summary` is run.
    pub fn respond(mut self, summary: &str, stdout: &str) -> Self {
        self.responses.insert(summary.to_string(), Ok(stdout.to_string()));
        self
    }

    /// Exit with status 1 and `diagnostic` when `summary` is run.
    pub fn fail_on(mut self, summary: &str, diagnostic: &str) -> Self {
        self.responses.insert(summary.to_string(), Err(diagnostic.to_string()));
        self
    }

    /// Summaries of every command run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &GitCommand) -> Result<String, CommandError> {
        self.calls.borrow_mut().push(command.summary().to_string());
        match self.responses.get(command.summary()) {
            Some(Ok(stdout)) => Ok(stdout.clone()),
            Some(Err(diagnostic)) => Err(CommandError::Exit {
                command: command.summary().to_string(),
                code: Some(1),
                message: diagnostic.clone(),
            }),
            None => Ok(String::new()),
        }
    }
}

/// A queued answer for [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Confirm(bool),
    Text(String),
}

/// Prompter that answers from a queue and falls back to the offered default.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<(String, String)>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, answer: Answer) -> Self {
        self.answers.push_back(answer);
        self
    }

    /// `(prompt, default)` pairs in the order they were asked.
    pub fn asked(&self) -> Vec<(String, String)> {
        self.asked.clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_confirm(&mut self, prompt: &str, default: bool) -> bool {
        self.asked.push((prompt.to_string(), default.to_string()));
        match self.answers.pop_front() {
            Some(Answer::Confirm(value)) => value,
            Some(other) => panic!("expected confirm answer for {prompt:?}, got {other:?}"),
            None => default,
        }
    }

    fn ask_text(&mut self, prompt: &str, default: &str) -> String {
        self.asked.push((prompt.to_string(), default.to_string()));
        match self.answers.pop_front() {
            Some(Answer::Text(value)) => value,
            Some(other) => panic!("expected text answer for {prompt:?}, got {other:?}"),
            None => default.to_string(),
        }
    }
}
