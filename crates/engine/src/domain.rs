// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`DomainExecutor`] — runs the init phase for one domain: attach its
//! volumes, then update its Route 53 records, all under one top-level
//! critical [`TransientResourceManager`] (spec.md §4.7). Ground:
//! `__main__.py::do_domain_init`.

use std::sync::Arc;

use fleetd_adapters::BlockDeviceFinder;
use fleetd_core::config::DomainConfig;
use fleetd_core::macro_set::FormatError;
use fleetd_core::{run_scoped, ExecMatrix, MacroSet, ResourceTransactionLog, ScopedOutcome, TransientResourceManager};

use crate::dns::DnsEngine;
use crate::error::DomainError;
use crate::volume::VolumeEngine;
use crate::{new_log_sink, DynCloudClient, SharedLoggingClient};

/// Shared, cloneable handle onto the adapters every domain-run needs.
/// Cheap to clone: every field is an `Arc`.
#[derive(Clone)]
pub struct DomainExecutor {
    cloud: DynCloudClient,
    block_device_finder: Arc<dyn BlockDeviceFinder>,
    dry_run: bool,
}

impl DomainExecutor {
    pub fn new(cloud: DynCloudClient, block_device_finder: Arc<dyn BlockDeviceFinder>, dry_run: bool) -> Self {
        Self {
            cloud,
            block_device_finder,
            dry_run,
        }
    }

    /// Run the full init phase for `domain`: attach every configured
    /// volume, then update every configured Route 53 record, returning the
    /// accumulated transaction log and, on failure, the error that ended
    /// the domain's init early (spec.md §4.7, §4.8).
    pub async fn run_init(
        &self,
        domain: &str,
        config: &DomainConfig,
        macro_set: &MacroSet,
    ) -> (String, Vec<ResourceTransactionLog>, Option<DomainError>) {
        let mut local_ms = macro_set.clone();
        local_ms.domain = domain.to_string();

        let client: SharedLoggingClient = Arc::new(fleetd_adapters::LoggingCloudClient::new(
            self.cloud.clone(),
            domain,
            self.dry_run,
        ));
        let log_sink = new_log_sink();
        let volume_engine = VolumeEngine::new(client.clone(), self.block_device_finder.clone(), log_sink.clone());
        let dns_engine = DnsEngine::new(client.clone(), log_sink.clone());

        let mut transc = TransientResourceManager::new(true);
        let result = run_phases(&volume_engine, &dns_engine, config, &mut local_ms, &mut transc).await;
        let outcome = run_scoped(&mut transc, None, result).await;

        let logs = std::mem::take(&mut *log_sink.lock());
        match outcome {
            ScopedOutcome::Ok(()) => (domain.to_string(), logs, None),
            ScopedOutcome::Raised(e) => (domain.to_string(), logs, Some(e)),
            ScopedOutcome::Swallowed => (domain.to_string(), logs, None),
        }
    }
}

async fn run_phases(
    volume_engine: &VolumeEngine,
    dns_engine: &DnsEngine,
    config: &DomainConfig,
    local_ms: &mut MacroSet,
    transc: &mut TransientResourceManager,
) -> Result<(), DomainError> {
    for vol_spec in &config.attach_volume {
        let critical = vol_spec.critical;
        let mut vol_transc = TransientResourceManager::new(critical);
        let result = do_volume(volume_engine, vol_spec, local_ms, &mut vol_transc).await;
        let outcome = run_scoped(&mut vol_transc, Some(transc), result).await;
        match outcome {
            ScopedOutcome::Ok(()) => {}
            ScopedOutcome::Raised(e) => return Err(e),
            ScopedOutcome::Swallowed => {
                // Non-critical volume failed; logged already, move on.
            }
        }
    }

    for r53_spec in &config.update_route53 {
        let critical = r53_spec.critical;
        let mut r53_transc = TransientResourceManager::new(critical);
        let result = dns_engine
            .update(r53_spec, local_ms, &mut r53_transc)
            .await
            .map_err(DomainError::from);
        let outcome = run_scoped(&mut r53_transc, Some(transc), result).await;
        match outcome {
            ScopedOutcome::Ok(()) => {}
            ScopedOutcome::Raised(e) => return Err(e),
            ScopedOutcome::Swallowed => {}
        }
    }

    Ok(())
}

async fn do_volume(
    volume_engine: &VolumeEngine,
    spec: &fleetd_core::config::VolumeSpec,
    local_ms: &mut MacroSet,
    transc: &mut TransientResourceManager,
) -> Result<(), DomainError> {
    let attach_result = volume_engine.attach(spec, local_ms, transc).await?;

    local_ms.attach_source = Some(attach_result.attach_source.to_string());
    local_ms.attach_op = Some(attach_result.outcome.attach_op().to_string());
    local_ms.volume_id = Some(attach_result.volume_id);
    local_ms.volume_pool = attach_result.volume_pool;
    local_ms.attached_device = Some(attach_result.attached_device);

    let matrix = build_exec_matrix(&spec.exec, local_ms)?;
    crate::fanout::run_unconditional_exec_matrix(matrix).await?;

    Ok(())
}

/// Build an [`ExecMatrix`] from `specs`, formatting argv tokens with
/// `local_ms`. An unknown placeholder is logged and the raw token is used
/// unchanged, rather than failing the whole volume/domain (spec.md §4.4
/// names formatting errors generically; silently aborting a whole domain
/// over one bad macro in one argv token would be a harsher failure mode
/// than the spec's exec-matrix design otherwise has).
pub(crate) fn build_exec_matrix(
    specs: &[fleetd_core::config::ExecSpec],
    local_ms: &MacroSet,
) -> Result<ExecMatrix, fleetd_core::ExecError> {
    ExecMatrix::build(specs, |token| match local_ms.format(token) {
        Ok(rendered) => rendered,
        Err(FormatError::UnknownPlaceholder(name)) => {
            tracing::warn!(placeholder = %name, "unknown macro placeholder, leaving token unchanged");
            token.to_string()
        }
    })
}

#[cfg(test)]
#[path = "domain_tests.rs"]
mod tests;
