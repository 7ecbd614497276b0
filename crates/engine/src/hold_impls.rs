// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete [`ResourceHold`] implementations for volumes and Route 53
//! record sets (spec.md §4.5, §4.6). Ground: `aws.py`'s
//! `EC2CreatedVolumeHold`, `EC2AttachedVolumeHold`, `Route53InsertedRRHold`,
//! and `Route53UpdatedRRHold`.
//!
//! Unlike the original, constructing a hold here never performs a side
//! effect — the caller tags or attaches explicitly, then pushes the hold to
//! record what must be undone. A constructor quietly mutating cloud state
//! behind the caller's back reads as a surprise in Rust; it isn't one here.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use fleetd_core::{HoldError, ResourceHold, TagName};

use crate::{LogSink, SharedLoggingClient};

const EC2_VOL_DETACH_WAIT_SECS: f64 = 1.0;

async fn delete_transc_tag(client: &SharedLoggingClient, volume_id: &str, log_sink: &LogSink) -> Result<(), String> {
    let (result, log) = client
        .call(
            "delete_tags",
            json!({
                "Resources": [volume_id],
                "Tags": [
                    {"Key": TagName::TRANSC_ID},
                    {"Key": TagName::IN_TRANSIT},
                ],
            }),
        )
        .await;
    log_sink.lock().push(log);
    result.map(|_| ()).map_err(|e| e.to_string())
}

fn mk_change_batch(action: &str, records: &[Value]) -> Value {
    json!({
        "Changes": records
            .iter()
            .map(|rr| json!({"Action": action, "ResourceRecordSet": rr}))
            .collect::<Vec<_>>(),
    })
}

/// Undoes a `create_volume` call: rollback deletes the volume outright,
/// commit just strips the in-flight tags (spec.md §4.5 strategy "c").
pub struct CreatedVolumeHold {
    client: SharedLoggingClient,
    volume_id: String,
    log_sink: LogSink,
}

impl CreatedVolumeHold {
    pub fn new(client: SharedLoggingClient, volume_id: impl Into<String>, log_sink: LogSink) -> Self {
        Self {
            client,
            volume_id: volume_id.into(),
            log_sink,
        }
    }
}

#[async_trait]
impl ResourceHold for CreatedVolumeHold {
    async fn commit(&mut self) -> Result<(), HoldError> {
        delete_transc_tag(&self.client, &self.volume_id, &self.log_sink)
            .await
            .map_err(HoldError::Commit)
    }

    async fn rollback(&mut self) -> Result<(), HoldError> {
        let (result, log) = self
            .client
            .call("delete_volume", json!({"VolumeId": self.volume_id}))
            .await;
        self.log_sink.lock().push(log);
        result.map(|_| ()).map_err(|e| HoldError::Rollback(e.to_string()))
    }
}

/// Undoes an `attach_volume` call: rollback strips tags, force-detaches, and
/// polls `describe_volumes` until the volume is no longer `in-use` or
/// `detaching` (spec.md §4.5 strategies "x"/"p"/"c").
pub struct AttachedVolumeHold {
    client: SharedLoggingClient,
    volume_id: String,
    log_sink: LogSink,
}

impl AttachedVolumeHold {
    pub fn new(client: SharedLoggingClient, volume_id: impl Into<String>, log_sink: LogSink) -> Self {
        Self {
            client,
            volume_id: volume_id.into(),
            log_sink,
        }
    }
}

#[async_trait]
impl ResourceHold for AttachedVolumeHold {
    async fn commit(&mut self) -> Result<(), HoldError> {
        delete_transc_tag(&self.client, &self.volume_id, &self.log_sink)
            .await
            .map_err(HoldError::Commit)
    }

    async fn rollback(&mut self) -> Result<(), HoldError> {
        // Best-effort: a tag-strip failure shouldn't stop the detach.
        let _ = delete_transc_tag(&self.client, &self.volume_id, &self.log_sink).await;

        let (result, log) = self
            .client
            .call("detach_volume", json!({"VolumeId": self.volume_id, "Force": true}))
            .await;
        self.log_sink.lock().push(log);
        let value = result.map_err(|e| HoldError::Rollback(e.to_string()))?;
        let mut state = value["State"].as_str().unwrap_or_default().to_string();

        while state == "in-use" || state == "detaching" {
            tokio::time::sleep(Duration::from_secs_f64(EC2_VOL_DETACH_WAIT_SECS)).await;
            let (result, log) = self
                .client
                .call("describe_volumes", json!({"VolumeIds": [self.volume_id]}))
                .await;
            self.log_sink.lock().push(log);
            let value = result.map_err(|e| HoldError::Rollback(e.to_string()))?;
            let volumes = value["Volumes"].as_array().cloned().unwrap_or_default();
            match volumes.first() {
                None => break,
                Some(v) => state = v["State"].as_str().unwrap_or_default().to_string(),
            }
        }

        Ok(())
    }
}

/// Undoes a Route 53 UPSERT that had no pre-existing record set: rollback
/// issues the matching DELETE.
pub struct Route53InsertedHold {
    client: SharedLoggingClient,
    hosted_zone: String,
    records: Vec<Value>,
    log_sink: LogSink,
}

impl Route53InsertedHold {
    pub fn new(
        client: SharedLoggingClient,
        hosted_zone: impl Into<String>,
        records: Vec<Value>,
        log_sink: LogSink,
    ) -> Self {
        Self {
            client,
            hosted_zone: hosted_zone.into(),
            records,
            log_sink,
        }
    }
}

#[async_trait]
impl ResourceHold for Route53InsertedHold {
    async fn commit(&mut self) -> Result<(), HoldError> {
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), HoldError> {
        let batch = mk_change_batch("DELETE", &self.records);
        let (result, log) = self
            .client
            .call(
                "change_resource_record_sets",
                json!({"HostedZoneId": self.hosted_zone, "ChangeBatch": batch}),
            )
            .await;
        self.log_sink.lock().push(log);
        result.map(|_| ()).map_err(|e| HoldError::Rollback(e.to_string()))
    }
}

/// Undoes a Route 53 UPSERT that replaced an existing record set: rollback
/// UPSERTs the saved pre-image back.
pub struct Route53UpdatedHold {
    client: SharedLoggingClient,
    hosted_zone: String,
    saved_records: Vec<Value>,
    log_sink: LogSink,
}

impl Route53UpdatedHold {
    pub fn new(
        client: SharedLoggingClient,
        hosted_zone: impl Into<String>,
        saved_records: Vec<Value>,
        log_sink: LogSink,
    ) -> Self {
        Self {
            client,
            hosted_zone: hosted_zone.into(),
            saved_records,
            log_sink,
        }
    }
}

#[async_trait]
impl ResourceHold for Route53UpdatedHold {
    async fn commit(&mut self) -> Result<(), HoldError> {
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), HoldError> {
        let batch = mk_change_batch("UPSERT", &self.saved_records);
        let (result, log) = self
            .client
            .call(
                "change_resource_record_sets",
                json!({"HostedZoneId": self.hosted_zone, "ChangeBatch": batch}),
            )
            .await;
        self.log_sink.lock().push(log);
        result.map(|_| ()).map_err(|e| HoldError::Rollback(e.to_string()))
    }
}

#[cfg(test)]
#[path = "hold_impls_tests.rs"]
mod tests;
