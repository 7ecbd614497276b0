// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON5-tolerant parsing of the user-data document (spec.md §6).

use super::types::FleetConfig;
use super::validate;
use crate::error::ConfigError;

/// Parse and validate a user-data document, tolerating JSON5 comments and
/// trailing commas.
pub fn parse(raw: &str) -> Result<FleetConfig, ConfigError> {
    let cfg: FleetConfig = json5::from_str(raw)?;
    validate::validate(&cfg)?;
    Ok(cfg)
}
