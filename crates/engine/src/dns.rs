// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route 53 record updater (spec.md §4.6). Ground: `__main__.py::do_route53`.

use serde_json::{json, Value};

use fleetd_core::config::R53Spec;
use fleetd_core::{MacroSet, TransientResourceManager};

use crate::hold_impls::{Route53InsertedHold, Route53UpdatedHold};
use crate::{LogSink, SharedLoggingClient};
use crate::error::DnsError;

pub struct DnsEngine {
    client: SharedLoggingClient,
    log_sink: LogSink,
}

impl DnsEngine {
    pub fn new(client: SharedLoggingClient, log_sink: LogSink) -> Self {
        Self { client, log_sink }
    }

    /// Build `A`/`AAAA` record sets from the domain's comma-separated
    /// `primary_public_ipv4`/`primary_public_ipv6` (spec.md §4.6.1), look up
    /// any existing record set of the same name to save as a rollback
    /// pre-image, then UPSERT.
    pub async fn update(
        &self,
        spec: &R53Spec,
        macro_set: &MacroSet,
        transc: &mut TransientResourceManager,
    ) -> Result<(), DnsError> {
        let mut records = Vec::new();
        if let Some(v4) = macro_set.primary_public_ipv4.as_deref().filter(|s| !s.is_empty()) {
            records.push(mk_record_set(&spec.name, "A", spec.ttl, v4));
        }
        if let Some(v6) = macro_set.primary_public_ipv6.as_deref().filter(|s| !s.is_empty()) {
            records.push(mk_record_set(&spec.name, "AAAA", spec.ttl, v6));
        }
        if records.is_empty() {
            return Ok(());
        }

        let saved = self.list_existing(spec).await?;

        let batch = mk_change_batch("UPSERT", &records);
        let (result, log) = self
            .client
            .call(
                "change_resource_record_sets",
                json!({"HostedZoneId": spec.hostedzone, "ChangeBatch": batch}),
            )
            .await;
        self.log_sink.lock().push(log);
        result?;

        if saved.is_empty() {
            transc.push(Box::new(Route53InsertedHold::new(
                self.client.clone(),
                spec.hostedzone.clone(),
                records,
                self.log_sink.clone(),
            )));
        } else {
            transc.push(Box::new(Route53UpdatedHold::new(
                self.client.clone(),
                spec.hostedzone.clone(),
                saved,
                self.log_sink.clone(),
            )));
        }

        Ok(())
    }

    async fn list_existing(&self, spec: &R53Spec) -> Result<Vec<Value>, DnsError> {
        let (result, log) = self
            .client
            .call(
                "list_resource_record_sets",
                json!({"HostedZoneId": spec.hostedzone, "StartRecordName": spec.name}),
            )
            .await;
        self.log_sink.lock().push(log);
        let value = result?;

        let mut saved = Vec::new();
        for rr in value["ResourceRecordSets"].as_array().cloned().unwrap_or_default() {
            if rr["Name"].as_str() != Some(spec.name.as_str()) {
                break;
            }
            saved.push(rr);
        }
        Ok(saved)
    }
}

fn mk_record_set(name: &str, record_type: &str, ttl: u32, comma_separated: &str) -> Value {
    let resource_records: Vec<Value> = comma_separated
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|addr| json!({"Value": addr}))
        .collect();
    json!({
        "Name": name,
        "Type": record_type,
        "TTL": ttl,
        "ResourceRecords": resource_records,
    })
}

fn mk_change_batch(action: &str, records: &[Value]) -> Value {
    json!({
        "Changes": records
            .iter()
            .map(|rr| json!({"Action": action, "ResourceRecordSet": rr}))
            .collect::<Vec<_>>(),
    })
}

#[cfg(test)]
#[path = "dns_tests.rs"]
mod tests;
