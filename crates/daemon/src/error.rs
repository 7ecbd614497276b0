// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level error taxonomy for the `fleetd` binary (spec.md §7).
//!
//! clap owns `UsageError`'s exit-2 path directly (see [`crate::cli`]), so
//! this enum unifies everything that can fail once argument parsing has
//! already succeeded: config, metadata, and domain-init errors all surface
//! through here as exit code 1.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] fleetd_core::ConfigError),
    #[error(transparent)]
    Meta(#[from] fleetd_adapters::MetaError),
    #[error(transparent)]
    Domain(#[from] fleetd_engine::DomainError),
    #[error("failed to install signal handlers: {0}")]
    Signal(#[from] std::io::Error),
}
