// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification dispatch (spec.md §4.9). Ground: `__main__.py::do_notify`,
//! `magic.py::Notify`.
//!
//! A notification post is fire-and-forget: failures are logged, never
//! propagated, and never recorded in a domain's transaction log (unlike
//! volume/DNS calls, a failed notification has no rollback to perform and
//! the original likewise never tags it as a resource transaction).

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinSet;

use fleetd_adapters::{mk_notify_backend, CloudClient};
use fleetd_core::config::{DomainConfig, NotifySpec};
use fleetd_core::MacroSet;

/// Default subject/body templates used when a `notify` entry has no
/// `envelope` (spec.md §4.9.1).
pub const DEFAULT_SUBJECT: &str = "Fleetd {domain} on {instance_id} state changed to [{daemon_state}]";
pub const DEFAULT_BODY: &str = "{all_json}";

/// The four terminal daemon states are notified by default; `starting`
/// never triggers a notification in practice, since `do_notify` is only
/// ever called once a domain has reached `started`, `stopping`,
/// `interrupted`, or `failed`.
fn enabled_for(spec: &NotifySpec, event: &str) -> bool {
    match &spec.matrix {
        None => true,
        Some(matrix) => matrix.get(event).copied().unwrap_or(true),
    }
}

/// Fan out notifications for every domain with a non-empty `notify` list
/// (spec.md §4.8, §4.9). Unlike init/exec, a domain's notify failures never
/// abort the phase for its siblings — see [`notify_domain`].
pub async fn notify_all(cloud: Arc<dyn CloudClient>, domains: &BTreeMap<String, DomainConfig>, macro_set: &MacroSet) {
    let mut set = JoinSet::new();
    for (name, config) in domains {
        if config.notify.is_empty() {
            continue;
        }
        let cloud = cloud.clone();
        let mut local_ms = macro_set.clone();
        local_ms.domain = name.clone();
        let specs = config.notify.clone();
        set.spawn(async move { notify_domain(cloud, &specs, &local_ms).await });
    }
    while set.join_next().await.is_some() {}
}

async fn notify_domain(cloud: Arc<dyn CloudClient>, specs: &[NotifySpec], local_ms: &MacroSet) {
    let event = local_ms.daemon_state.event_name();
    for spec in specs {
        if !enabled_for(spec, event) {
            continue;
        }

        let (subject_tmpl, body_tmpl) = match &spec.envelope {
            Some(env) => (env.subject.as_str(), env.body.as_str()),
            None => (DEFAULT_SUBJECT, DEFAULT_BODY),
        };
        let subject = local_ms.format(subject_tmpl).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "notify subject format failed");
            subject_tmpl.to_string()
        });
        let body = local_ms.format(body_tmpl).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "notify body format failed");
            body_tmpl.to_string()
        });

        let backend = match mk_notify_backend(&spec.backend, spec.options.clone(), cloud.clone()) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, backend = %spec.backend, "unusable notify backend");
                continue;
            }
        };

        if let Err(e) = backend.post(&subject, &body).await {
            tracing::warn!(error = %e, "notification post failed");
        }
    }
}

#[cfg(test)]
#[path = "notify_dispatch_tests.rs"]
mod tests;
