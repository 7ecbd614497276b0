// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-pass validator turning a deserialized [`FleetConfig`] into a
//! confirmed-sound document. Ground: teacher's `oj-runbook::validate`,
//! generalized from HCL-runbook checks to userdata checks (spec.md §4.0,
//! §9 "Dynamic config shapes" — downstream code never touches raw JSON).

use super::types::{DomainConfig, ExecSpec, FleetConfig, NotifySpec, SourceStrategy};
use crate::error::ConfigError;
use crate::exec::ExitCodeSet;

const KNOWN_NOTIFY_BACKENDS: [&str; 3] = ["aws-sns", "aws-sqs", "ans-sqs"];

pub fn validate(cfg: &FleetConfig) -> Result<(), ConfigError> {
    if cfg.domains.is_empty() {
        return Err(ConfigError::Invalid {
            location: "domains".to_string(),
            message: "at least one domain is required".to_string(),
        });
    }
    for (name, domain) in &cfg.domains {
        validate_domain(name, domain)?;
    }
    Ok(())
}

fn validate_domain(name: &str, domain: &DomainConfig) -> Result<(), ConfigError> {
    for vol in &domain.attach_volume {
        let strategies = SourceStrategy::parse_list(&vol.source).map_err(|_| ConfigError::Domain {
            domain: name.to_string(),
            message: format!("invalid source {:?}", vol.source),
        })?;
        let needs_pool_name = strategies
            .iter()
            .any(|s| matches!(s, SourceStrategy::Pool | SourceStrategy::Create));
        if needs_pool_name && vol.pool_name.is_none() {
            return Err(ConfigError::Domain {
                domain: name.to_string(),
                message: "pool and create source strategies require pool-name".to_string(),
            });
        }
        for spec in &vol.exec {
            validate_exec_spec(name, spec)?;
        }
    }

    for r53 in &domain.update_route53 {
        if r53.ttl == 0 {
            return Err(ConfigError::Domain {
                domain: name.to_string(),
                message: "route53 ttl must be non-zero".to_string(),
            });
        }
    }

    for spec in &domain.exec {
        validate_exec_spec(name, spec)?;
    }

    for notify in &domain.notify {
        validate_notify(name, notify)?;
    }

    Ok(())
}

fn validate_exec_spec(domain: &str, spec: &ExecSpec) -> Result<(), ConfigError> {
    if spec.lines.is_empty() {
        return Err(ConfigError::Domain {
            domain: domain.to_string(),
            message: "exec spec must have at least one line".to_string(),
        });
    }
    for line in &spec.lines {
        if line.argv.is_empty() {
            return Err(ConfigError::Domain {
                domain: domain.to_string(),
                message: "exec line argv must be non-empty".to_string(),
            });
        }
        let ec = line.ec.as_deref().unwrap_or("0");
        ExitCodeSet::parse(ec).map_err(|e| ConfigError::Domain {
            domain: domain.to_string(),
            message: format!("invalid exit code range: {e}"),
        })?;
    }
    Ok(())
}

fn validate_notify(domain: &str, notify: &NotifySpec) -> Result<(), ConfigError> {
    if !KNOWN_NOTIFY_BACKENDS.contains(&notify.backend.as_str()) {
        return Err(ConfigError::Domain {
            domain: domain.to_string(),
            message: format!("unknown notify backend {:?}", notify.backend),
        });
    }
    Ok(())
}
