//! Stable exit codes for `git-helper`.

/// Operation succeeded, or usage was printed because no command was given.
pub const OK: i32 = 0;
/// A git command failed; its diagnostic was printed to stderr.
pub const FAILED: i32 = 1;
/// Command line could not be parsed.
pub const USAGE: i32 = 2;
