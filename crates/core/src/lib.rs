// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fleetd-core: shared data model for the fleetd instance init daemon.
//!
//! Most of this crate is pure and synchronous: no network I/O, no
//! subprocess spawning besides [`exec`]'s child process, no cloud SDK. The
//! one exception is [`hold::ResourceHold`]: its `commit`/`rollback` methods
//! are `async` because the holds that actually matter (volume attachments,
//! Route 53 changesets, both defined in fleetd-engine) undo themselves with
//! cloud API calls. The adapters and engine crates build on top of these
//! types.

pub mod config;
pub mod error;
pub mod exec;
pub mod exec_matrix;
pub mod hold;
pub mod id;
pub mod macro_set;
pub mod outcome;
pub mod tags;
pub mod transaction_log;

pub use config::{
    DomainConfig, ExecSpec, FleetConfig, NotifySpec, R53Spec, VolumeSpec,
};
pub use error::{ConfigError, ExecError, HoldError};
pub use exec::{Exec, ExitCodeSet};
pub use exec_matrix::ExecMatrix;
pub use hold::{ResourceHold, ScopedOutcome, TransientResourceManager};
pub use hold::run_scoped;
pub use id::TransactionId;
pub use macro_set::{DaemonState, MacroSet};
pub use outcome::AttachOutcome;
pub use tags::TagName;
pub use transaction_log::ResourceTransactionLog;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
