// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`MacroSet`] — the mutable record of instance facts substitutable into
//! user command strings and notification templates (spec.md §3, §4.4).

use crate::id::TransactionId;
use crate::transaction_log::ResourceTransactionLog;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Daemon lifecycle state (spec.md §4.11). Also doubles as the event name
/// used to key the exec matrix and the notify matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaemonState {
    Starting,
    Started,
    Stopping,
    Interrupted,
    Failed,
}

impl DaemonState {
    /// The lower-case event name used by [`crate::ExecMatrix`] and the
    /// notify matrix.
    pub fn event_name(&self) -> &'static str {
        match self {
            DaemonState::Starting => "starting",
            DaemonState::Started => "started",
            DaemonState::Stopping => "stopping",
            DaemonState::Interrupted => "interrupted",
            DaemonState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DaemonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unknown placeholder: {{{0}}}")]
    UnknownPlaceholder(String),
}

/// Mutable record of instance-wide and per-domain facts. Each worker holds
/// its own deep copy (`Clone`) so mutations never race (spec.md §3, §5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroSet {
    pub domain: String,
    pub instance_id: String,
    pub instance_type: String,
    pub instance_index: Option<u32>,
    pub placement_region: Option<String>,
    pub placement_zone: Option<String>,
    pub hypervisor: Option<String>,
    pub primary_public_ipv4: Option<String>,
    pub primary_public_ipv6: Option<String>,
    pub public_ipv4_list: Vec<String>,
    pub public_ipv6_list: Vec<String>,
    pub static_dns_rr: Vec<String>,
    pub attach_source: Option<String>,
    pub attach_op: Option<String>,
    pub volume_id: Option<String>,
    pub volume_pool: Option<String>,
    pub attached_device: Option<String>,
    pub daemon_state: DaemonState,
    pub error: Vec<String>,
    pub interrupt_action: Option<String>,
    pub interrupt_time: Option<String>,
    pub transaction_id: TransactionId,
    pub transaction_log: Vec<ResourceTransactionLog>,
}

impl MacroSet {
    /// A fresh record for a new run: `daemon_state = Starting`, no domain
    /// yet assigned (set by each [`crate::DomainConfig`] worker copy).
    pub fn new(transaction_id: TransactionId) -> Self {
        Self {
            domain: String::new(),
            instance_id: String::new(),
            instance_type: String::new(),
            instance_index: None,
            placement_region: None,
            placement_zone: None,
            hypervisor: None,
            primary_public_ipv4: None,
            primary_public_ipv6: None,
            public_ipv4_list: Vec::new(),
            public_ipv6_list: Vec::new(),
            static_dns_rr: Vec::new(),
            attach_source: None,
            attach_op: None,
            volume_id: None,
            volume_pool: None,
            attached_device: None,
            daemon_state: DaemonState::Starting,
            error: Vec::new(),
            interrupt_action: None,
            interrupt_time: None,
            transaction_id,
            transaction_log: Vec::new(),
        }
    }

    /// Substitute named placeholders (spec.md §4.4) into `template`.
    ///
    /// Null scalars render as empty string; sequences render comma-and-space
    /// joined; `all_json` and `transaction_log` render as tab-indented JSON.
    /// An unknown placeholder is an error.
    pub fn format(&self, template: &str) -> Result<String, FormatError> {
        let fields = self.render_fields();
        render(template, &fields)
    }

    fn render_fields(&self) -> HashMap<&'static str, String> {
        let mask = |v: &Option<String>| v.clone().unwrap_or_default();
        let mask_u32 = |v: &Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
        let join = |v: &[String]| v.join(", ");

        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let ts = chrono::Local::now().to_rfc3339();
        let pid = std::process::id().to_string();

        let mut fields = HashMap::new();
        fields.insert("domain", self.domain.clone());
        fields.insert("instance_id", self.instance_id.clone());
        fields.insert("instance_type", self.instance_type.clone());
        fields.insert("instance_index", mask_u32(&self.instance_index));
        fields.insert("placement_region", mask(&self.placement_region));
        fields.insert("placement_zone", mask(&self.placement_zone));
        fields.insert("hypervisor", mask(&self.hypervisor));
        fields.insert("primary_public_ipv4", mask(&self.primary_public_ipv4));
        fields.insert("primary_public_ipv6", mask(&self.primary_public_ipv6));
        fields.insert("public_ipv4_list", join(&self.public_ipv4_list));
        fields.insert("public_ipv6_list", join(&self.public_ipv6_list));
        fields.insert("static_dns_rr", join(&self.static_dns_rr));
        fields.insert("attach_source", mask(&self.attach_source));
        fields.insert("attach_op", mask(&self.attach_op));
        fields.insert("volume_id", mask(&self.volume_id));
        fields.insert("volume_pool", mask(&self.volume_pool));
        fields.insert("attached_device", mask(&self.attached_device));
        fields.insert("daemon_state", self.daemon_state.to_string());
        fields.insert("error", join(&self.error));
        fields.insert("interrupt_action", mask(&self.interrupt_action));
        fields.insert("interrupt_time", mask(&self.interrupt_time));
        fields.insert("transaction_id", self.transaction_id.to_string());
        fields.insert("transaction_log", self.dump_json(&self.transaction_log));
        fields.insert("all_json", self.dump_json(self));
        fields.insert("cwd", cwd);
        fields.insert("ts", ts);
        fields.insert("pid", pid);
        fields
    }

    fn dump_json<T: Serialize>(&self, value: &T) -> String {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        if value.serialize(&mut ser).is_err() {
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

fn render(
    template: &str,
    fields: &HashMap<&'static str, String>,
) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let close = after_open
            .find('}')
            .ok_or_else(|| FormatError::UnknownPlaceholder(after_open.to_string()))?;
        let name = &after_open[..close];
        let value = fields
            .get(name)
            .ok_or_else(|| FormatError::UnknownPlaceholder(name.to_string()))?;
        out.push_str(value);
        rest = &after_open[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
#[path = "macro_set_tests.rs"]
mod tests;
