//! I/O adapters: git subprocesses, the history file, config, and prompts.

pub mod config;
pub mod history;
pub mod process;
pub mod prompt;
