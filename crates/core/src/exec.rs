// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ExitCodeSet`] and [`Exec`] — spec.md §4.2.

use crate::error::ExecError;
use std::ops::Range;
use std::process::Command;

/// A set of half-open integer ranges an exit code must fall into.
///
/// `"0"` parses to `{[0,1)}`, a bare `"N"` to `{[N,N+1)}`, `"N-M"` to
/// `{[N,M)}` (rejecting `M < N`), and `None` accepts any code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitCodeSet(Option<Vec<Range<i64>>>);

impl ExitCodeSet {
    /// Accept any exit code.
    pub fn any() -> Self {
        Self(None)
    }

    /// Parse a comma-separated range expression (spec.md §4.2).
    pub fn parse(s: &str) -> Result<Self, ExecError> {
        let mut ranges = Vec::new();
        for piece in s.split(',') {
            let piece = piece.trim();
            ranges.push(Self::parse_one(piece)?);
        }
        Ok(Self(Some(ranges)))
    }

    fn parse_one(piece: &str) -> Result<Range<i64>, ExecError> {
        let invalid = || ExecError::InvalidRange(piece.to_string());

        match piece.split_once('-') {
            Some((start, end)) => {
                let start: i64 = start.trim().parse().map_err(|_| invalid())?;
                let end: i64 = end.trim().parse().map_err(|_| invalid())?;
                if start > end {
                    return Err(invalid());
                }
                Ok(start..end)
            }
            None => {
                let n: i64 = piece.parse().map_err(|_| invalid())?;
                Ok(n..n + 1)
            }
        }
    }

    /// Whether `code` is in this set.
    pub fn check(&self, code: i32) -> bool {
        match &self.0 {
            None => true,
            Some(ranges) => ranges.iter().any(|r| r.contains(&(code as i64))),
        }
    }
}

impl std::fmt::Display for ExitCodeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            None => write!(f, "{{any}}"),
            Some(ranges) => {
                write!(f, "{{")?;
                for (i, r) in ranges.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{}, {})", r.start, r.end)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// An argv vector paired with the exit codes that count as success.
///
/// The child inherits stdio and environment, matching the original's bare
/// `subprocess.Popen(argv)` (no pipe capture, no env filtering).
#[derive(Debug, Clone)]
pub struct Exec {
    argv: Vec<String>,
    exit_codes: ExitCodeSet,
}

impl Exec {
    pub fn new(argv: Vec<String>, exit_codes: ExitCodeSet) -> Self {
        Self { argv, exit_codes }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Spawn the child, wait for it, and fail unless the exit code is in
    /// range. Returns the observed exit code on success.
    pub fn run(&self) -> Result<i32, ExecError> {
        let cmd_str = self.format_cmd();
        let mut child = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .spawn()
            .map_err(|source| ExecError::Spawn {
                cmd: cmd_str.clone(),
                source,
            })?;

        let pid = child.id();
        let status = child.wait().map_err(|source| ExecError::Spawn {
            cmd: cmd_str.clone(),
            source,
        })?;
        let code = status.code().unwrap_or(-1);

        if self.exit_codes.check(code) {
            Ok(code)
        } else {
            Err(ExecError::ExitCodeOutOfRange {
                cmd: cmd_str,
                pid,
                code,
                expected: self.exit_codes.to_string(),
            })
        }
    }

    fn format_cmd(&self) -> String {
        self.argv
            .iter()
            .map(|a| format!("\"{a}\""))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
