// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for fleetd-core's own tests and for downstream crates'
//! test suites, gated behind `test-support` (ground: teacher's
//! `oj-core::test_support`).

use crate::id::TransactionId;
use crate::macro_set::MacroSet;

/// A populated [`MacroSet`] for a domain named `"web"`, suitable as a
/// starting point for formatting and exec-matrix tests.
pub fn sample_macro_set() -> MacroSet {
    let mut ms = MacroSet::new(TransactionId::new("transc-test"));
    ms.domain = "web".to_string();
    ms.instance_id = "i-0123456789abcdef0".to_string();
    ms.instance_type = "m5.large".to_string();
    ms.instance_index = Some(0);
    ms.placement_region = Some("us-east-1".to_string());
    ms.placement_zone = Some("us-east-1a".to_string());
    ms
}

/// A minimal, valid user-data document with one domain and no side-effecting
/// entries, for config round-trip and daemon wiring tests.
pub fn minimal_userdata_json() -> &'static str {
    r#"{ "domains": { "web": {} } }"#
}
