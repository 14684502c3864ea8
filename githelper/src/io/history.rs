//! Bounded command journal stored at `~/.git_helper_history.json`.
//!
//! History is a convenience: reads fail closed to an empty journal and write
//! failures are logged and dropped, so a broken journal file can never turn a
//! successful git operation into a failed one. Those errors only show up in
//! `debug` tracing output.
//!
//! The file is read and fully rewritten on every append without locking. Two
//! invocations running at the same moment race and the last writer wins.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Maximum number of records kept in the journal.
pub const HISTORY_LIMIT: usize = 100;

/// File name of the journal inside the user's home directory.
pub const HISTORY_FILE_NAME: &str = ".git_helper_history.json";

/// One executed command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandRecord {
    /// Command line as executed, without the `git` prefix.
    pub command: String,
    /// RFC 3339 UTC instant the record was created (`2026-10-18T09:15:02.123Z`).
    pub timestamp: String,
}

impl CommandRecord {
    /// Create a record stamped with the current UTC time.
    pub fn now(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Records in append order, oldest first, never longer than `limit`.
///
/// `limit` is clamped to `1..=HISTORY_LIMIT`; no configuration can grow the
/// journal past [`HISTORY_LIMIT`] records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryJournal {
    records: VecDeque<CommandRecord>,
    limit: usize,
}

impl HistoryJournal {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit: limit.clamp(1, HISTORY_LIMIT),
        }
    }

    /// Build a journal from stored records, keeping only the newest `limit`.
    pub fn from_records(records: Vec<CommandRecord>, limit: usize) -> Self {
        let mut journal = Self::new(limit);
        for record in records {
            journal.push(record);
        }
        journal
    }

    /// Append a record, dropping the oldest ones past the limit.
    pub fn push(&mut self, record: CommandRecord) {
        self.records.push_back(record);
        while self.records.len() > self.limit {
            self.records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandRecord> {
        self.records.iter()
    }
}

/// Load/append/persist access to the journal file.
///
/// A store without a path (home directory could not be resolved) behaves as
/// an always-empty journal that silently ignores appends.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: Option<PathBuf>,
    limit: usize,
}

impl HistoryStore {
    pub fn new(path: Option<PathBuf>, limit: usize) -> Self {
        Self { path, limit }
    }

    /// Store at `$HOME/.git_helper_history.json`, or a disabled store when the
    /// home directory is unknown.
    pub fn in_home_dir(limit: usize) -> Self {
        let path = dirs::home_dir().map(|home| home.join(HISTORY_FILE_NAME));
        if path.is_none() {
            debug!("home directory not found; command history disabled");
        }
        Self::new(path, limit)
    }

    /// Read the journal. Any problem yields an empty journal.
    #[instrument(skip_all)]
    pub fn load(&self) -> HistoryJournal {
        let Some(path) = self.path.as_deref() else {
            return HistoryJournal::new(self.limit);
        };
        match read_records(path) {
            Ok(records) => {
                debug!(path = %path.display(), count = records.len(), "history loaded");
                HistoryJournal::from_records(records, self.limit)
            }
            Err(err) => {
                if path.exists() {
                    debug!(
                        path = %path.display(),
                        err = %format!("{err:#}"),
                        "ignoring unreadable history"
                    );
                } else {
                    debug!(path = %path.display(), "no history file yet");
                }
                HistoryJournal::new(self.limit)
            }
        }
    }

    /// Record `command` as executed now. Never fails; write errors are logged.
    #[instrument(skip_all, fields(command = %command))]
    pub fn append(&self, command: &str) {
        if self.path.is_none() {
            debug!("history disabled, skipping append");
            return;
        }
        let mut journal = self.load();
        journal.push(CommandRecord::now(command));
        if let Err(err) = self.persist(&journal) {
            debug!(err = %format!("{err:#}"), "failed to save command history");
        }
    }

    /// Empty the journal. Never fails; write errors are logged.
    pub fn clear(&self) {
        if let Err(err) = self.persist(&HistoryJournal::new(self.limit)) {
            debug!(err = %format!("{err:#}"), "failed to clear command history");
        }
    }

    /// Rewrite the whole journal file (temp file + rename).
    pub fn persist(&self, journal: &HistoryJournal) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        debug!(path = %path.display(), count = journal.len(), "writing history");
        let records: Vec<&CommandRecord> = journal.iter().collect();
        let mut buf = serde_json::to_string_pretty(&records).context("serialize history")?;
        buf.push('\n');
        write_atomic(path, &buf)
    }
}

fn read_records(path: &Path) -> Result<Vec<CommandRecord>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read history {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse history {}", path.display()))
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp history {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace history {}", path.display()))?;
    Ok(())
}
