// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloud resource tag key names (spec.md §4.12).
//!
//! Every write operation on a resource that can leak must tag it with
//! `TRANSC_ID` and `IN_TRANSIT` before any other effect; commit strips both,
//! rollback strips both before the destructive reversal.

/// Exact tag key strings used across every cloud resource fleetd touches.
pub struct TagName;

impl TagName {
    pub const TRANSC_ID: &'static str = "user:ec2fd.transc-id";
    pub const DOMAIN: &'static str = "user:ec2fd.domain";
    pub const TS_USED: &'static str = "user:ec2fd.ts-used";
    pub const POOL_NAME: &'static str = "user:ec2fd.pool-name";
    pub const IN_TRANSIT: &'static str = "user:ec2fd.in-transit";
}
