// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-domain executor pool (spec.md §4.8): fans out init, post-init exec,
//! and notify over every configured domain using [`tokio::task::JoinSet`].
//! Dropping a `JoinSet` aborts every task still running in it, which is
//! exactly the "cancel anything not yet started" half of the original
//! thread-pool's exit contract; the other half — in-flight work is not
//! interruptible — falls out for free, since nothing here ever aborts a
//! task that's already made progress on purpose.
//!
//! Ground: `__main__.py`'s `concurrent.futures.ThreadPoolExecutor` fan-out
//! in `do_init`/`do_exec`/`do_notify`, and the teacher's `oj-engine`
//! `tokio::spawn`-based executor pattern.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use tokio::task::JoinSet;

use fleetd_core::config::DomainConfig;
use fleetd_core::{ExecError, ExecMatrix, MacroSet};

use crate::domain::{build_exec_matrix, DomainExecutor};
use crate::error::DomainError;

/// Run a single, already-built [`ExecMatrix`] for `event`, off the async
/// runtime's worker threads: `Exec::run` blocks on a child process wait.
pub async fn run_exec_matrix(matrix: ExecMatrix, event: String) -> Result<(), ExecError> {
    tokio::task::spawn_blocking(move || matrix.run(&event))
        .await
        .unwrap_or_else(|e| Err(ExecError::TaskJoin(e.to_string())))
}

/// Run only a matrix's unconditional Execs, off the async runtime's worker
/// threads. Used for the per-volume exec matrix during attach, which the
/// ground truth runs with no event (`__main__.py:540`, `evt=None`), so any
/// `on:[...]`-scoped lines never fire there (spec.md §4.5).
pub async fn run_unconditional_exec_matrix(matrix: ExecMatrix) -> Result<(), ExecError> {
    tokio::task::spawn_blocking(move || matrix.run_unconditional())
        .await
        .unwrap_or_else(|e| Err(ExecError::TaskJoin(e.to_string())))
}

/// Init phase (spec.md §4.8): waits for every domain, aggregating failed
/// domain names into [`DomainError::DomainFailed`] rather than failing
/// fast — a bad domain must not stop its siblings from at least attempting
/// init.
pub async fn init_all(
    executor: &DomainExecutor,
    domains: &BTreeMap<String, DomainConfig>,
    macro_set: &MacroSet,
) -> (Vec<fleetd_core::ResourceTransactionLog>, Result<(), DomainError>) {
    let mut set = JoinSet::new();
    for (name, config) in domains {
        let executor = executor.clone();
        let name = name.clone();
        let config = config.clone();
        let macro_set = macro_set.clone();
        set.spawn(async move { executor.run_init(&name, &config, &macro_set).await });
    }

    let mut logs = Vec::new();
    let mut failed = BTreeSet::new();
    while let Some(res) = set.join_next().await {
        match res {
            Ok((domain, domain_logs, err)) => {
                logs.extend(domain_logs);
                if let Some(e) = err {
                    tracing::warn!(domain = %domain, error = %e, "domain init failed");
                    failed.insert(domain);
                }
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "domain init task did not complete");
            }
        }
    }

    if failed.is_empty() {
        (logs, Ok(()))
    } else {
        (logs, Err(DomainError::DomainFailed(failed)))
    }
}

/// Post-init/shutdown exec phase (spec.md §4.8): fans the domain-level
/// `exec` matrices out concurrently, but the first domain to fail aborts
/// the whole phase — dropping the `JoinSet` cancels every task that hasn't
/// finished yet.
pub async fn exec_all(
    domains: &BTreeMap<String, DomainConfig>,
    macro_set: &MacroSet,
    event: &str,
) -> Result<(), DomainError> {
    let mut set = JoinSet::new();
    for (name, config) in domains {
        if config.exec.is_empty() {
            continue;
        }
        let mut local_ms = macro_set.clone();
        local_ms.domain = name.clone();
        let specs = config.exec.clone();
        let event = event.to_string();
        set.spawn(async move {
            let matrix = build_exec_matrix(&specs, &local_ms)?;
            run_exec_matrix(matrix, event).await.map_err(DomainError::from)
        });
    }

    while let Some(res) = set.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(join_err) => {
                return Err(DomainError::Exec(ExecError::TaskJoin(join_err.to_string())));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "fanout_tests.rs"]
mod tests;
