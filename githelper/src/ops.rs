//! User-facing git operations.
//!
//! Every operation moves through the same phases: gather parameters (prompts),
//! execute one or more git commands, then either succeed (report + exactly one
//! history record) or fail (report the git error, history untouched). A failed
//! git command stops the operation; nothing is retried or rolled back.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, info_span};

use crate::io::history::HistoryStore;
use crate::io::process::{CommandError, CommandRunner, GitCommand};
use crate::io::prompt::Prompter;

/// Name of the ignore file written by `init`.
pub const IGNORE_FILE: &str = ".gitignore";
/// Message of the commit that adds the ignore file.
pub const IGNORE_COMMIT_MESSAGE: &str = "Initial commit with .gitignore";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update";
pub const DEFAULT_REMOTE: &str = "origin";

/// Lifecycle of a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Gathering,
    Executing,
    Succeeded,
    Failed,
}

/// What an operation tells the user when it completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub headline: String,
    /// Command output or listing shown under the headline.
    pub body: Option<String>,
    /// Non-fatal problems (e.g. the `.gitignore` commit failed during `init`).
    pub warnings: Vec<String>,
}

impl Report {
    pub fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            ..Self::default()
        }
    }

    fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A finished operation and the command line it leaves in history.
struct Completed {
    report: Report,
    record: String,
}

/// Runs operations against a [`CommandRunner`], asking questions through a
/// [`Prompter`] and recording successes in a [`HistoryStore`].
pub struct Operations<R, P> {
    runner: R,
    prompter: P,
    history: HistoryStore,
    workdir: PathBuf,
    ignore_contents: String,
}

impl<R: CommandRunner, P: Prompter> Operations<R, P> {
    pub fn new(runner: R, prompter: P, history: HistoryStore) -> Self {
        Self {
            runner,
            prompter,
            history,
            workdir: PathBuf::from("."),
            ignore_contents: "node_modules\n.env\n".to_string(),
        }
    }

    /// Directory the `.gitignore` is written to (the repository root).
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    pub fn with_ignore_contents(mut self, contents: impl Into<String>) -> Self {
        self.ignore_contents = contents.into();
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn history_store(&self) -> &HistoryStore {
        &self.history
    }

    /// `git init`, then optionally commit a `.gitignore`.
    ///
    /// Once `git init` succeeds the operation is recorded, even if the
    /// `.gitignore` steps fail; those failures come back as warnings.
    pub fn init(&mut self) -> Result<Report, CommandError> {
        let _span = info_span!("operation", op = "init").entered();
        let result = self.run_init();
        self.finish(result)
    }

    /// `git checkout -b <name>`.
    pub fn branch(&mut self, name: &str) -> Result<Report, CommandError> {
        let _span = info_span!("operation", op = "branch").entered();
        let result = self.run_branch(name);
        self.finish(result)
    }

    /// `git add .` then `git commit -m <message>`, prompting for the message
    /// when none was given. An explicit empty message is passed through.
    pub fn commit(&mut self, message: Option<&str>) -> Result<Report, CommandError> {
        let _span = info_span!("operation", op = "commit").entered();
        let result = self.run_commit(message);
        self.finish(result)
    }

    /// `git push <remote> <branch>`, defaulting the branch to the current one.
    pub fn push(&mut self) -> Result<Report, CommandError> {
        let _span = info_span!("operation", op = "push").entered();
        let result = self.run_push();
        self.finish(result)
    }

    /// `git status`.
    pub fn status(&mut self) -> Result<Report, CommandError> {
        let _span = info_span!("operation", op = "status").entered();
        let result = self.run_status();
        self.finish(result)
    }

    /// List recorded commands, oldest first. Viewing is not recorded.
    pub fn history(&self) -> Report {
        let journal = self.history.load();
        if journal.is_empty() {
            return Report::new("No command history yet.");
        }
        let listing = journal
            .iter()
            .enumerate()
            .map(|(index, record)| {
                format!("{}. {} ({})", index + 1, record.command, record.timestamp)
            })
            .collect::<Vec<_>>()
            .join("\n");
        Report::new("Recent Git Commands:").with_body(listing)
    }

    pub fn clear_history(&self) -> Report {
        self.history.clear();
        Report::new("Command history cleared.")
    }

    fn run_init(&mut self) -> Result<Completed, CommandError> {
        enter(Phase::Executing);
        self.execute(&GitCommand::init())?;

        enter(Phase::Gathering);
        let mut report = Report::new("Git repository initialized!");
        if self.prompter.ask_confirm("Create a .gitignore file?", true)
            && let Err(warning) = self.commit_ignore_file()
        {
            info!(warning = %warning, "ignore file not committed");
            report.warnings.push(warning);
        }
        Ok(Completed {
            report,
            record: "init".to_string(),
        })
    }

    fn commit_ignore_file(&mut self) -> Result<(), String> {
        enter(Phase::Executing);
        let path = self.workdir.join(IGNORE_FILE);
        fs::write(&path, &self.ignore_contents)
            .map_err(|err| format!("could not write {}: {err}", path.display()))?;
        self.execute(&GitCommand::add(IGNORE_FILE))
            .map_err(|err| err.to_string())?;
        self.execute(&GitCommand::commit(IGNORE_COMMIT_MESSAGE))
            .map_err(|err| err.to_string())?;
        Ok(())
    }

    fn run_branch(&mut self, name: &str) -> Result<Completed, CommandError> {
        enter(Phase::Executing);
        let checkout = GitCommand::checkout_new_branch(name);
        self.execute(&checkout)?;
        Ok(Completed {
            report: Report::new(format!("Switched to new branch \"{name}\"!")),
            record: checkout.summary().to_string(),
        })
    }

    fn run_commit(&mut self, message: Option<&str>) -> Result<Completed, CommandError> {
        let message = match message {
            Some(message) => message.to_string(),
            None => {
                enter(Phase::Gathering);
                self.prompter
                    .ask_text("Enter commit message:", DEFAULT_COMMIT_MESSAGE)
            }
        };

        enter(Phase::Executing);
        self.execute(&GitCommand::add_all())?;
        let commit = GitCommand::commit(&message);
        self.execute(&commit)?;
        Ok(Completed {
            report: Report::new(format!("Changes committed with message: \"{message}\"")),
            record: commit.summary().to_string(),
        })
    }

    fn run_push(&mut self) -> Result<Completed, CommandError> {
        // The default branch has to be known before the prompt is shown.
        enter(Phase::Gathering);
        let current = self.execute(&GitCommand::show_current_branch())?;

        let remote = self.prompter.ask_text("Remote name:", DEFAULT_REMOTE);
        let branch = self.prompter.ask_text("Branch name:", current.trim());

        enter(Phase::Executing);
        let push = GitCommand::push(&remote, &branch);
        self.execute(&push)?;
        Ok(Completed {
            report: Report::new(format!("Pushed to {remote}/{branch}!")),
            record: push.summary().to_string(),
        })
    }

    fn run_status(&mut self) -> Result<Completed, CommandError> {
        enter(Phase::Executing);
        let status = GitCommand::status();
        let output = self.execute(&status)?;
        Ok(Completed {
            report: Report::new("Repository Status:").with_body(output),
            record: status.summary().to_string(),
        })
    }

    fn execute(&self, command: &GitCommand) -> Result<String, CommandError> {
        debug!(command = %command, "running git");
        self.runner.run(command)
    }

    /// Record successes in history; failures leave it untouched.
    fn finish(&self, result: Result<Completed, CommandError>) -> Result<Report, CommandError> {
        match result {
            Ok(completed) => {
                self.history.append(&completed.record);
                info!(phase = ?Phase::Succeeded, record = %completed.record, "operation succeeded");
                Ok(completed.report)
            }
            Err(err) => {
                info!(phase = ?Phase::Failed, err = %err, "operation failed");
                Err(err)
            }
        }
    }
}

fn enter(phase: Phase) {
    debug!(phase = ?phase, "entering phase");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::history::HISTORY_LIMIT;
    use crate::test_support::{Answer, ScriptedPrompter, ScriptedRunner};

    fn ops_in(
        dir: &std::path::Path,
        runner: ScriptedRunner,
        prompter: ScriptedPrompter,
    ) -> Operations<ScriptedRunner, ScriptedPrompter> {
        let store = HistoryStore::new(Some(dir.join("history.json")), HISTORY_LIMIT);
        Operations::new(runner, prompter, store).with_workdir(dir)
    }

    fn recorded(ops: &Operations<ScriptedRunner, ScriptedPrompter>) -> Vec<String> {
        ops.history_store()
            .load()
            .iter()
            .map(|record| record.command.clone())
            .collect()
    }

    #[test]
    fn branch_checks_out_and_records() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut ops = ops_in(temp.path(), ScriptedRunner::new(), ScriptedPrompter::new());

        let report = ops.branch("feature-x").expect("branch");
        assert_eq!(report.headline, "Switched to new branch \"feature-x\"!");
        assert_eq!(ops.runner().calls(), vec!["checkout -b feature-x"]);
        assert_eq!(recorded(&ops), vec!["checkout -b feature-x"]);
        assert!(ops.prompter().asked().is_empty());
    }

    #[test]
    fn failed_branch_is_not_recorded() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::new()
            .fail_on("checkout -b main", "fatal: a branch named 'main' already exists");
        let mut ops = ops_in(temp.path(), runner, ScriptedPrompter::new());

        let err = ops.branch("main").expect_err("branch fails");
        assert!(err.to_string().contains("already exists"));
        assert!(recorded(&ops).is_empty());
    }

    #[test]
    fn commit_with_message_skips_prompt() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut ops = ops_in(temp.path(), ScriptedRunner::new(), ScriptedPrompter::new());

        let report = ops.commit(Some("fix: typo")).expect("commit");
        assert_eq!(report.headline, "Changes committed with message: \"fix: typo\"");
        assert_eq!(ops.runner().calls(), vec!["add .", "commit -m \"fix: typo\""]);
        assert_eq!(recorded(&ops), vec!["commit -m \"fix: typo\""]);
        assert!(ops.prompter().asked().is_empty());
    }

    #[test]
    fn commit_without_message_prompts_with_update_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut ops = ops_in(temp.path(), ScriptedRunner::new(), ScriptedPrompter::new());

        ops.commit(None).expect("commit");
        assert_eq!(
            ops.prompter().asked(),
            vec![("Enter commit message:".to_string(), "Update".to_string())]
        );
        assert_eq!(recorded(&ops), vec!["commit -m \"Update\""]);
    }

    #[test]
    fn commit_uses_prompted_message() {
        let temp = tempfile::tempdir().expect("tempdir");
        let prompter = ScriptedPrompter::new().answer(Answer::Text("wip".to_string()));
        let mut ops = ops_in(temp.path(), ScriptedRunner::new(), prompter);

        ops.commit(None).expect("commit");
        assert_eq!(ops.runner().calls(), vec!["add .", "commit -m \"wip\""]);
    }

    #[test]
    fn failed_add_skips_commit_and_history() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::new().fail_on("add .", "fatal: not a git repository");
        let mut ops = ops_in(temp.path(), runner, ScriptedPrompter::new());

        ops.commit(Some("msg")).expect_err("add fails");
        assert_eq!(ops.runner().calls(), vec!["add ."]);
        assert!(recorded(&ops).is_empty());
    }

    #[test]
    fn rejected_empty_message_fails_without_history() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::new()
            .fail_on("commit -m \"\"", "Aborting commit due to empty commit message.");
        let mut ops = ops_in(temp.path(), runner, ScriptedPrompter::new());
        ops.history_store().append("status");

        let err = ops.commit(Some("")).expect_err("empty message rejected");
        assert!(err.to_string().ends_with("Aborting commit due to empty commit message."));
        assert_eq!(ops.runner().calls(), vec!["add .", "commit -m \"\""]);
        assert!(ops.prompter().asked().is_empty());
        assert_eq!(recorded(&ops), vec!["status"]);
    }

    #[test]
    fn push_defaults_branch_to_current() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::new().respond("branch --show-current", "feature-x");
        let mut ops = ops_in(temp.path(), runner, ScriptedPrompter::new());

        let report = ops.push().expect("push");
        assert_eq!(
            ops.prompter().asked(),
            vec![
                ("Remote name:".to_string(), "origin".to_string()),
                ("Branch name:".to_string(), "feature-x".to_string()),
            ]
        );
        assert_eq!(
            ops.runner().calls(),
            vec!["branch --show-current", "push origin feature-x"]
        );
        assert_eq!(report.headline, "Pushed to origin/feature-x!");
        assert_eq!(recorded(&ops), vec!["push origin feature-x"]);
    }

    #[test]
    fn push_uses_answered_remote_and_branch() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::new().respond("branch --show-current", "main");
        let prompter = ScriptedPrompter::new()
            .answer(Answer::Text("upstream".to_string()))
            .answer(Answer::Text("release".to_string()));
        let mut ops = ops_in(temp.path(), runner, prompter);

        ops.push().expect("push");
        assert_eq!(recorded(&ops), vec!["push upstream release"]);
    }

    #[test]
    fn push_fails_before_prompting_when_branch_lookup_fails() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner =
            ScriptedRunner::new().fail_on("branch --show-current", "fatal: not a git repository");
        let mut ops = ops_in(temp.path(), runner, ScriptedPrompter::new());

        ops.push().expect_err("lookup fails");
        assert!(ops.prompter().asked().is_empty());
        assert!(recorded(&ops).is_empty());
    }

    #[test]
    fn rejected_push_is_not_recorded() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::new()
            .respond("branch --show-current", "main")
            .fail_on("push origin main", "fatal: 'origin' does not appear to be a git repository");
        let mut ops = ops_in(temp.path(), runner, ScriptedPrompter::new());

        ops.push().expect_err("push fails");
        assert!(recorded(&ops).is_empty());
    }

    #[test]
    fn status_reports_output_and_records() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::new().respond("status", "On branch main\nnothing to commit");
        let mut ops = ops_in(temp.path(), runner, ScriptedPrompter::new());

        let report = ops.status().expect("status");
        assert_eq!(report.headline, "Repository Status:");
        assert_eq!(report.body.as_deref(), Some("On branch main\nnothing to commit"));
        assert_eq!(recorded(&ops), vec!["status"]);
        assert!(ops.prompter().asked().is_empty());
    }

    #[test]
    fn init_with_ignore_file_commits_it() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut ops = ops_in(temp.path(), ScriptedRunner::new(), ScriptedPrompter::new());

        let report = ops.init().expect("init");
        assert!(report.warnings.is_empty());
        assert_eq!(
            ops.runner().calls(),
            vec![
                "init",
                "add .gitignore",
                "commit -m \"Initial commit with .gitignore\"",
            ]
        );
        let ignore = fs::read_to_string(temp.path().join(IGNORE_FILE)).expect("read ignore");
        assert_eq!(ignore, "node_modules\n.env\n");
        assert_eq!(
            ops.prompter().asked(),
            vec![("Create a .gitignore file?".to_string(), "true".to_string())]
        );
        assert_eq!(recorded(&ops), vec!["init"]);
    }

    #[test]
    fn init_without_ignore_file_still_records() {
        let temp = tempfile::tempdir().expect("tempdir");
        let prompter = ScriptedPrompter::new().answer(Answer::Confirm(false));
        let mut ops = ops_in(temp.path(), ScriptedRunner::new(), prompter);

        ops.init().expect("init");
        assert_eq!(ops.runner().calls(), vec!["init"]);
        assert!(!temp.path().join(IGNORE_FILE).exists());
        assert_eq!(recorded(&ops), vec!["init"]);
    }

    #[test]
    fn init_uses_configured_ignore_contents() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut ops = ops_in(temp.path(), ScriptedRunner::new(), ScriptedPrompter::new())
            .with_ignore_contents("target\n");

        ops.init().expect("init");
        let ignore = fs::read_to_string(temp.path().join(IGNORE_FILE)).expect("read ignore");
        assert_eq!(ignore, "target\n");
    }

    #[test]
    fn failed_git_init_is_not_recorded() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::new().fail_on("init", "permission denied");
        let mut ops = ops_in(temp.path(), runner, ScriptedPrompter::new());

        ops.init().expect_err("init fails");
        assert!(ops.prompter().asked().is_empty());
        assert!(recorded(&ops).is_empty());
    }

    #[test]
    fn init_twice_records_both_runs() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = HistoryStore::new(Some(temp.path().join("history.json")), HISTORY_LIMIT);

        let mut first = Operations::new(
            ScriptedRunner::new(),
            ScriptedPrompter::new(),
            store.clone(),
        )
        .with_workdir(temp.path());
        first.init().expect("first init");

        // Second run: nothing new to commit.
        let runner = ScriptedRunner::new().fail_on(
            "commit -m \"Initial commit with .gitignore\"",
            "nothing to commit, working tree clean",
        );
        let mut second = Operations::new(runner, ScriptedPrompter::new(), store.clone())
            .with_workdir(temp.path());
        let report = second.init().expect("second init");

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("nothing to commit"));
        let commands: Vec<String> = store.load().iter().map(|r| r.command.clone()).collect();
        assert_eq!(commands, vec!["init", "init"]);
    }

    #[test]
    fn history_lists_records_one_indexed() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut ops = ops_in(temp.path(), ScriptedRunner::new(), ScriptedPrompter::new());
        ops.status().expect("status");
        ops.branch("dev").expect("branch");

        let report = ops.history();
        assert_eq!(report.headline, "Recent Git Commands:");
        let body = report.body.expect("listing");
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1. status ("));
        assert!(lines[1].starts_with("2. checkout -b dev ("));
        assert!(lines[1].ends_with("Z)"));
    }

    #[test]
    fn history_view_is_not_recorded() {
        let temp = tempfile::tempdir().expect("tempdir");
        let ops = ops_in(temp.path(), ScriptedRunner::new(), ScriptedPrompter::new());

        let report = ops.history();
        assert_eq!(report.headline, "No command history yet.");
        assert!(report.body.is_none());
        assert!(recorded(&ops).is_empty());
        assert!(ops.runner().calls().is_empty());
    }

    #[test]
    fn clear_history_empties_journal() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut ops = ops_in(temp.path(), ScriptedRunner::new(), ScriptedPrompter::new());
        ops.status().expect("status");

        ops.clear_history();
        assert_eq!(ops.history().headline, "No command history yet.");
    }

    #[test]
    fn broken_history_file_does_not_block_operations() {
        let temp = tempfile::tempdir().expect("tempdir");
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").expect("write blocker");
        let store = HistoryStore::new(Some(blocker.join("history.json")), HISTORY_LIMIT);
        let mut ops = Operations::new(ScriptedRunner::new(), ScriptedPrompter::new(), store);

        let report = ops.status().expect("status succeeds");
        assert_eq!(report.headline, "Repository Status:");
    }
}
