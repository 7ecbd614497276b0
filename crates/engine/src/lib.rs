// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fleetd-engine: the per-domain orchestration that actually attaches
//! volumes, updates DNS, runs user commands, dispatches notifications, and
//! cleans up residual resources (spec.md §4.5-§4.13).
//!
//! fleetd-core stays pure and synchronous; fleetd-engine is where that data
//! model meets fleetd-adapters' capability boundaries and tokio.

pub mod domain;
pub mod dns;
pub mod error;
pub mod fanout;
pub mod hold_impls;
pub mod notify_dispatch;
pub mod residual;
pub mod volume;

use std::sync::Arc;

use fleetd_adapters::{CloudClient, LoggingCloudClient};
use fleetd_core::ResourceTransactionLog;
use parking_lot::Mutex;

pub use domain::DomainExecutor;
pub use dns::DnsEngine;
pub use error::{DnsError, DomainError, VolumeError};
pub use volume::{VolumeAttachResult, VolumeEngine};

/// A cloud client behind a trait object, the shape every engine module
/// consumes — concrete backends live entirely in fleetd-adapters.
pub type DynCloudClient = Arc<dyn CloudClient>;

/// A [`LoggingCloudClient`] wrapping a [`DynCloudClient`], shared by every
/// engine component working on behalf of one domain-run.
pub type SharedLoggingClient = Arc<LoggingCloudClient<DynCloudClient>>;

/// Shared sink every cloud call appends its [`ResourceTransactionLog`] entry
/// to, regardless of which hold or engine component issued the call.
pub type LogSink = Arc<Mutex<Vec<ResourceTransactionLog>>>;

pub(crate) fn new_log_sink() -> LogSink {
    Arc::new(Mutex::new(Vec::new()))
}
