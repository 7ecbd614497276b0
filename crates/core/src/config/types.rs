// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed user-data shapes (spec.md §6).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

/// The whole user-data document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FleetConfig {
    /// Accepted but currently ignored (spec.md §6).
    #[serde(default)]
    pub timeout: Option<f64>,
    #[serde(default, rename = "set-hostname")]
    pub set_hostname: Option<String>,
    pub domains: BTreeMap<String, DomainConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DomainConfig {
    #[serde(default, rename = "attach-volume")]
    pub attach_volume: Vec<VolumeSpec>,
    #[serde(default, rename = "update-route53")]
    pub update_route53: Vec<R53Spec>,
    #[serde(default)]
    pub exec: Vec<ExecSpec>,
    #[serde(default)]
    pub notify: Vec<NotifySpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VolumeSpec {
    pub device: String,
    /// One or more of `x`/`p`/`c`, e.g. `"xp"` (spec.md §4.5).
    pub source: String,
    #[serde(default, rename = "volume-id")]
    pub volume_id: Option<String>,
    #[serde(default, rename = "pool-name")]
    pub pool_name: Option<String>,
    /// Extra `create_volume` parameters, merged with the mandatory tag set
    /// (spec.md §4.5 strategy "c").
    #[serde(default)]
    pub create: Option<serde_json::Value>,
    #[serde(default = "default_true")]
    pub critical: bool,
    #[serde(default)]
    pub exec: Vec<ExecSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct R53Spec {
    pub hostedzone: String,
    pub name: String,
    pub ttl: u32,
    #[serde(default = "default_true")]
    pub critical: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecLine {
    pub argv: Vec<String>,
    #[serde(default)]
    pub ec: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecSpec {
    pub lines: Vec<ExecLine>,
    #[serde(default)]
    pub on: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifySpec {
    /// `"aws-sns"`, `"aws-sqs"`, or the original's `"ans-sqs"` typo.
    pub backend: String,
    #[serde(default)]
    pub options: serde_json::Value,
    #[serde(default)]
    pub matrix: Option<BTreeMap<String, bool>>,
    #[serde(default)]
    pub envelope: Option<NotifyEnvelope>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyEnvelope {
    pub subject: String,
    pub body: String,
}

/// One character of a `VolumeSpec::source` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStrategy {
    Existing,
    Pool,
    Create,
}

impl SourceStrategy {
    /// Parse a `source` string like `"xp"` into its ordered strategy list.
    pub fn parse_list(s: &str) -> Result<Vec<Self>, ConfigError> {
        if s.is_empty() {
            return Err(ConfigError::Invalid {
                location: "source".to_string(),
                message: "source must be non-empty".to_string(),
            });
        }
        s.chars()
            .map(|c| match c {
                'x' => Ok(Self::Existing),
                'p' => Ok(Self::Pool),
                'c' => Ok(Self::Create),
                other => Err(ConfigError::Invalid {
                    location: "source".to_string(),
                    message: format!("unknown source strategy '{other}'"),
                }),
            })
            .collect()
    }

    /// The character this strategy was parsed from, used to populate
    /// [`crate::MacroSet::attach_source`].
    pub fn as_char(&self) -> char {
        match self {
            Self::Existing => 'x',
            Self::Pool => 'p',
            Self::Create => 'c',
        }
    }
}
