// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types owned by fleetd-engine (spec.md §7).

use fleetd_adapters::{BlockDeviceError, CloudError, MetaError};
use fleetd_core::{ExecError, HoldError};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("volume {volume_id} is attached at {actual}, not the requested {requested}")]
    AttachedElsewhere {
        volume_id: String,
        requested: String,
        actual: String,
    },
    #[error("no volume source strategy succeeded for device {device}")]
    NoVolumeSource { device: String },
    #[error(transparent)]
    Cloud(#[from] CloudError),
    #[error(transparent)]
    BlockDevice(#[from] BlockDeviceError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error(transparent)]
    Hold(#[from] HoldError),
}

#[derive(Debug, Error)]
pub enum DnsError {
    #[error(transparent)]
    Cloud(#[from] CloudError),
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("domain {domain} failed: {source}")]
    Failed {
        domain: String,
        #[source]
        source: Box<DomainError>,
    },
    #[error(transparent)]
    Volume(#[from] VolumeError),
    #[error(transparent)]
    Dns(#[from] DnsError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error(transparent)]
    Meta(#[from] MetaError),
    #[error("{0} domain(s) failed during init")]
    DomainFailed(BTreeSet<String>),
}
