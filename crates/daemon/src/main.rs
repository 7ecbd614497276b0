// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleetd` — per-instance init and lifecycle daemon (spec.md §1).
//!
//! Wiring only: parse flags, resolve instance identity and user-data from
//! the metadata service, build the concrete adapters, and hand off to
//! [`fleetd_daemon::driver::LifecycleDriver`].

use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use fleetd_adapters::{
    BlockDeviceFinder, CloudClient, ImdsMetaManager, LinuxBlockDeviceFinder, MetaManager,
    ReadinessNotifier, SystemdNotifier, UnconfiguredCloudClient,
};
use fleetd_core::{MacroSet, TransactionId};
use fleetd_daemon::cli::Cli;
use fleetd_daemon::driver::{HostnameSetter, LifecycleDriver, PhaseToggles, SystemHostnameSetter};
use fleetd_daemon::signals::{Cancellation, NeverCancel, ShutdownSignal};
use fleetd_daemon::DaemonError;
use fleetd_engine::DomainExecutor;

/// Default IMDS base URL, overridden by `--imds` (spec.md §6).
const DEFAULT_IMDS_BASE: &str = "http://169.254.169.254/latest";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging();

    let toggles = PhaseToggles::from(cli.phase_toggles());

    let transaction_id = match &cli.transc_id {
        Some(id) => TransactionId::new(id.clone()),
        None => TransactionId::default(),
    };

    if let Some(profile) = &cli.profile {
        tracing::debug!(profile, "cloud-SDK profile requested (debug only)");
    }

    let imds_base = cli.imds.clone().unwrap_or_else(|| DEFAULT_IMDS_BASE.to_string());
    let meta: Arc<dyn MetaManager> = Arc::new(ImdsMetaManager::new(imds_base));

    let mut macro_set = MacroSet::new(transaction_id);
    meta.fetch_meta(&mut macro_set)
        .await
        .map_err(DaemonError::from)?;

    tracing::info!(
        instance_id = %macro_set.instance_id,
        transaction_id = %macro_set.transaction_id,
        "resolved instance identity"
    );

    let userdata_raw = read_userdata(cli.userdata.as_deref(), meta.as_ref()).await?;
    let config = fleetd_core::config::parse(&userdata_raw).map_err(DaemonError::from)?;

    let cloud: Arc<dyn CloudClient> = Arc::new(UnconfiguredCloudClient);
    let block_device_finder: Arc<dyn BlockDeviceFinder> = Arc::new(LinuxBlockDeviceFinder);
    let executor = DomainExecutor::new(cloud.clone(), block_device_finder, cli.dry_run);
    let readiness: Arc<dyn ReadinessNotifier> = Arc::new(SystemdNotifier::from_env());
    let hostname_setter: Arc<dyn HostnameSetter> = Arc::new(SystemHostnameSetter);

    let driver = LifecycleDriver {
        cloud,
        meta: meta.clone(),
        executor,
        readiness,
        hostname_setter,
        domains: config.domains,
        set_hostname_template: config.set_hostname,
        toggles,
        dry_run: cli.dry_run,
    };

    // Signal redirection (spec.md §5, §9): only needed once the driver
    // actually reaches the interruption poll.
    let cancel: Box<dyn Cancellation> = if toggles.poll {
        Box::new(ShutdownSignal::spawn().map_err(DaemonError::from)?)
    } else {
        Box::new(NeverCancel)
    };

    let exit_code = driver.run(&mut macro_set, cancel.as_ref()).await;
    std::process::exit(exit_code);
}

/// Resolve the user-data document: `--userdata=FILE` reads the file
/// directly; otherwise it comes from the metadata service (spec.md §6).
async fn read_userdata(path: Option<&Path>, meta: &dyn MetaManager) -> Result<String, DaemonError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| {
            DaemonError::from(fleetd_core::ConfigError::Io {
                path: path.display().to_string(),
                source,
            })
        }),
        None => meta.open_userdata().await.map_err(DaemonError::from),
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
