//! Interactive front end for everyday git operations.
//!
//! A small, fixed set of operations (init, branch, commit, push, status,
//! history) runs git as a subprocess and records each success in a bounded
//! journal under the user's home directory. The crate is split into:
//!
//! - **[`io`]**: Side-effecting adapters (git process, history file, config,
//!   terminal prompts), each behind a seam that tests can replace.
//! - **[`ops`]**: The operations themselves, coordinating prompts, git calls
//!   and history.

pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod ops;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
