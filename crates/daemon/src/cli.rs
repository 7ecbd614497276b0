// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line flags (spec.md §6). Ground: teacher's `oj-cli::main::Cli`
//! (`clap::Parser` derive), generalized from a client/daemon split to
//! fleetd's own single-binary flag set.
//!
//! clap's generated parser already gives us the exit-code contract spec.md
//! §6 asks for for free: `-h`/`--help` and `-V`/`--version` print and exit
//! 0, and any usage error (unknown flag, bad value) prints to stderr and
//! exits 2 — so `Cli::parse()` in `main` is the whole usage-error path.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "fleetd", version, about = "Per-instance init and lifecycle daemon")]
pub struct Cli {
    /// Reserved, accepted, ignored (spec.md §6).
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Override the instance-metadata endpoint.
    #[arg(long = "imds", value_name = "HOST")]
    pub imds: Option<String>,

    /// Read user-data from this file instead of the metadata service.
    #[arg(long = "userdata", value_name = "FILE")]
    pub userdata: Option<PathBuf>,

    /// Override the transaction id (default: fresh uuid v4); empty is invalid.
    #[arg(long = "transc_id", value_name = "STR", value_parser = parse_transc_id)]
    pub transc_id: Option<String>,

    /// Cloud-SDK profile (debug only), forwarded to the cloud client.
    #[arg(long = "profile", value_name = "STR")]
    pub profile: Option<String>,

    /// Disable init, notify, exec, and poll.
    #[arg(long = "disable-all")]
    pub disable_all: bool,

    /// Toggle the init phase independently of `--disable-all`.
    #[arg(long = "enable-init", value_name = "BOOL", value_parser = parse_bool)]
    pub enable_init: Option<bool>,

    /// Toggle the notify phase independently of `--disable-all`.
    #[arg(long = "enable-notify", value_name = "BOOL", value_parser = parse_bool)]
    pub enable_notify: Option<bool>,

    /// Toggle the exec phase independently of `--disable-all`.
    #[arg(long = "enable-exec", value_name = "BOOL", value_parser = parse_bool)]
    pub enable_exec: Option<bool>,

    /// Toggle the interruption poll independently of `--disable-all`.
    #[arg(long = "enable-poll", value_name = "BOOL", value_parser = parse_bool)]
    pub enable_poll: Option<bool>,

    /// Run every cloud call as a dry run (logged, never sent). Not part of
    /// spec.md §6's flag table; exposed here because `fleetd-engine`
    /// already threads a `dry_run` flag through every `CloudClient` call
    /// and leaving it unreachable from the CLI would make it dead code.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Which of the four phases are enabled, after folding `--disable-all` and
/// the per-phase `--enable-*` overrides (spec.md §6: "individually toggle
/// phases" — an explicit `--enable-X` always wins over `--disable-all`,
/// regardless of flag order, since clap doesn't preserve argv order here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseToggles {
    pub init: bool,
    pub notify: bool,
    pub exec: bool,
    pub poll: bool,
}

impl Cli {
    pub fn phase_toggles(&self) -> PhaseToggles {
        let base = !self.disable_all;
        PhaseToggles {
            init: self.enable_init.unwrap_or(base),
            notify: self.enable_notify.unwrap_or(base),
            exec: self.enable_exec.unwrap_or(base),
            poll: self.enable_poll.unwrap_or(base),
        }
    }
}

fn parse_transc_id(s: &str) -> Result<String, String> {
    if s.is_empty() {
        Err("transaction id must not be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// `true`/`false` case-insensitive, else numeric non-zero is true (spec.md
/// §6 CLI boolean parse rule).
pub fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => other
            .parse::<f64>()
            .map(|n| n != 0.0)
            .map_err(|_| format!("invalid boolean value: {s}")),
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
