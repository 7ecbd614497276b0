// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ResourceTransactionLog`] — append-only audit of cloud API calls
//! (spec.md §2 item 5, §8: "exactly one log appended before the call
//! returns").

use serde::{Deserialize, Serialize};

/// One entry in the transaction log: the cloud method called, its
/// parameters, and whether it was a dry run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTransactionLog {
    pub platform: String,
    pub domain: String,
    pub method: String,
    pub param: serde_json::Value,
    pub dry: bool,
}

impl ResourceTransactionLog {
    pub fn new(
        platform: impl Into<String>,
        domain: impl Into<String>,
        method: impl Into<String>,
        param: serde_json::Value,
        dry: bool,
    ) -> Self {
        Self {
            platform: platform.into(),
            domain: domain.into(),
            method: method.into(),
            param,
            dry,
        }
    }
}
