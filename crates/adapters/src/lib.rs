// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! fleetd-adapters: the four capability boundaries fleetd depends on but
//! does not own (spec.md §1 "OUT OF SCOPE", §9 "Abstract backends").

pub mod blockdev;
pub mod cloud;
pub mod meta;
pub mod notify;
pub mod readiness;

pub use blockdev::{BlockDeviceError, BlockDeviceFinder, LinuxBlockDeviceFinder};
pub use cloud::{CloudClient, CloudError, LoggingCloudClient, UnconfiguredCloudClient};
pub use meta::{ImdsMetaManager, InterruptNotice, MetaError, MetaManager};
pub use notify::{mk_notify_backend, NotifyBackend, NotifyError};
pub use readiness::{NoopReadinessNotifier, ReadinessNotifier, SystemdNotifier};

#[cfg(any(test, feature = "test-support"))]
pub use blockdev::FakeBlockDeviceFinder;
#[cfg(any(test, feature = "test-support"))]
pub use cloud::{CloudCall, FakeCloudClient};
#[cfg(any(test, feature = "test-support"))]
pub use meta::FakeMetaManager;
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyBackend, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use readiness::{FakeReadinessNotifier, ReadinessCall};
