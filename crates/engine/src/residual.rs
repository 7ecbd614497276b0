// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Residual resource cleanup (spec.md §4.10, §4.13). Ground: `aws.py`'s
//! `clean_up_transc`, documented there but left unimplemented; this module
//! is the supplemental implementation the docstring calls for.
//!
//! Finds every volume still tagged both in-transit and with this run's
//! transaction id — meaning some earlier attach/create succeeded but the
//! daemon crashed or was killed before its own rollback could run — and
//! detaches (if attached) then deletes each one. Failures are aggregated
//! rather than aborting early, so one stuck volume doesn't prevent cleanup
//! of the rest.

use std::sync::Arc;

use serde_json::json;

use fleetd_adapters::{CloudClient, LoggingCloudClient};
use fleetd_core::{ResourceTransactionLog, TagName};

use crate::error::{DomainError, VolumeError};

pub async fn clean_up_transaction(
    cloud: Arc<dyn CloudClient>,
    transaction_id: &str,
    dry_run: bool,
) -> (Vec<ResourceTransactionLog>, Option<DomainError>) {
    let client = LoggingCloudClient::new(cloud, "residual", dry_run);
    let mut logs = Vec::new();

    let (result, log) = client
        .call(
            "describe_volumes",
            json!({
                "Filters": [
                    {"Name": format!("tag:{}", TagName::IN_TRANSIT), "Values": ["true"]},
                    {"Name": format!("tag:{}", TagName::TRANSC_ID), "Values": [transaction_id]},
                ],
            }),
        )
        .await;
    logs.push(log);

    let volumes = match result {
        Ok(v) => v["Volumes"].as_array().cloned().unwrap_or_default(),
        Err(e) => return (logs, Some(DomainError::from(VolumeError::from(e)))),
    };

    let mut first_err = None;
    for vol in volumes {
        let volume_id = vol["VolumeId"].as_str().unwrap_or_default().to_string();
        let attached = vol["Attachments"]
            .as_array()
            .map(|a| !a.is_empty())
            .unwrap_or(false);

        if attached {
            let (result, log) = client
                .call("detach_volume", json!({"VolumeId": volume_id, "Force": true}))
                .await;
            logs.push(log);
            if let Err(e) = result {
                first_err.get_or_insert_with(|| DomainError::from(VolumeError::from(e)));
                continue;
            }
        }

        let (result, log) = client.call("delete_volume", json!({"VolumeId": volume_id})).await;
        logs.push(log);
        if let Err(e) = result {
            first_err.get_or_insert_with(|| DomainError::from(VolumeError::from(e)));
        }
    }

    (logs, first_err)
}

#[cfg(test)]
#[path = "residual_tests.rs"]
mod tests;
