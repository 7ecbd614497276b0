// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types owned by fleetd-core.

use thiserror::Error;

/// Errors from parsing or validating the user-data configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed user-data: {0}")]
    Malformed(#[from] json5::Error),
    #[error("{location}: {message}")]
    Invalid { location: String, message: String },
    #[error("unknown top-level key: {0}")]
    UnknownKey(String),
    #[error("domain {domain}: {message}")]
    Domain { domain: String, message: String },
    #[error("reading user-data file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from running a user-supplied [`crate::Exec`].
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{cmd}[{pid}]: returned {code}, not in {expected}")]
    ExitCodeOutOfRange {
        cmd: String,
        pid: u32,
        code: i32,
        expected: String,
    },
    #[error("failed to spawn {cmd}: {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}: invalid exit code range")]
    InvalidRange(String),
    #[error("exec task join failed: {0}")]
    TaskJoin(String),
}

/// Errors surfaced while committing or rolling back a [`crate::ResourceHold`].
///
/// These are deliberately never fatal to the caller (spec.md §4.1: "rollback
/// failures are suppressed") but are still typed so they can be logged.
#[derive(Debug, Error)]
pub enum HoldError {
    #[error("commit failed: {0}")]
    Commit(String),
    #[error("rollback failed: {0}")]
    Rollback(String),
}
