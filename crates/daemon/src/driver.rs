// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`LifecycleDriver`] — the daemon state machine (spec.md §2 item 10,
//! §4.11): STARTING → STARTED → (INTERRUPTED|STOPPING|FAILED), driving
//! init, post-init exec, notify, interruption polling, and residual
//! cleanup in that order. Ground: `__main__.py`'s top-level
//! `start()`/`wait_interrupt()` flow and `magic.py::DaemonState`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use fleetd_adapters::{CloudClient, MetaManager, ReadinessNotifier};
use fleetd_core::config::DomainConfig;
use fleetd_core::{DaemonState, Exec, ExecError, ExitCodeSet, MacroSet};
use fleetd_engine::{fanout, notify_dispatch, residual, DomainExecutor};

use crate::signals::Cancellation;

/// Which of the four phases are enabled (spec.md §6, §4.8).
#[derive(Debug, Clone, Copy)]
pub struct PhaseToggles {
    pub init: bool,
    pub notify: bool,
    pub exec: bool,
    pub poll: bool,
}

impl From<crate::cli::PhaseToggles> for PhaseToggles {
    fn from(t: crate::cli::PhaseToggles) -> Self {
        Self {
            init: t.init,
            notify: t.notify,
            exec: t.exec,
            poll: t.poll,
        }
    }
}

/// How long to sleep between spot-interruption polls (spec.md §5).
const INTERRUPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Sets the machine's hostname from a formatted template (spec.md §4.11:
/// "success attempts `set_hostname(formatted)` ... failure logged, not
/// fatal"). Abstracted so tests don't have to actually rename the test
/// runner's host.
pub trait HostnameSetter: Send + Sync {
    fn set_hostname(&self, name: &str) -> Result<(), String>;
}

/// Production [`HostnameSetter`]: shells out the same way a user [`Exec`]
/// does (spec.md §4.2), rather than reaching for a platform-specific FFI
/// call that the rest of this codebase otherwise avoids.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostnameSetter;

impl HostnameSetter for SystemHostnameSetter {
    fn set_hostname(&self, name: &str) -> Result<(), String> {
        let exec = Exec::new(
            vec![
                "hostnamectl".to_string(),
                "set-hostname".to_string(),
                name.to_string(),
            ],
            ExitCodeSet::any(),
        );
        exec.run().map(|_| ()).map_err(|e| e.to_string())
    }
}

/// The full per-run context the lifecycle driver needs: the adapters
/// (spec.md §9 "abstract backends"), the parsed domain configuration, and
/// the seed [`MacroSet`] populated from instance metadata.
pub struct LifecycleDriver {
    pub cloud: Arc<dyn CloudClient>,
    pub meta: Arc<dyn MetaManager>,
    pub executor: DomainExecutor,
    pub readiness: Arc<dyn ReadinessNotifier>,
    pub hostname_setter: Arc<dyn HostnameSetter>,
    pub domains: BTreeMap<String, DomainConfig>,
    pub set_hostname_template: Option<String>,
    pub toggles: PhaseToggles,
    pub dry_run: bool,
}

impl LifecycleDriver {
    /// Run the full lifecycle to completion, returning the process exit
    /// code (spec.md §7: `0` success, `1` generic failure).
    pub async fn run(&self, macro_set: &mut MacroSet, cancel: &dyn Cancellation) -> i32 {
        self.readiness.status("starting");

        if self.toggles.exec {
            self.run_exec_phase(macro_set, DaemonState::Starting.event_name()).await;
        }

        let init_result = if self.toggles.init {
            let (logs, result) = fanout::init_all(&self.executor, &self.domains, macro_set).await;
            macro_set.transaction_log.extend(logs);
            result
        } else {
            Ok(())
        };

        match init_result {
            Ok(()) => self.after_successful_init(macro_set, cancel).await,
            Err(e) => {
                tracing::error!(error = %e, "domain init failed");
                macro_set.error.push(e.to_string());
                macro_set.daemon_state = DaemonState::Failed;
                self.run_terminal_phase(macro_set).await;
                self.residual_cleanup(macro_set).await;
                1
            }
        }
    }

    async fn after_successful_init(&self, macro_set: &mut MacroSet, cancel: &dyn Cancellation) -> i32 {
        macro_set.daemon_state = DaemonState::Started;

        if let Some(template) = &self.set_hostname_template {
            match macro_set.format(template) {
                Ok(name) => {
                    if let Err(e) = self.hostname_setter.set_hostname(&name) {
                        tracing::warn!(error = %e, "set-hostname failed, continuing");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "set-hostname template format failed"),
            }
        }

        self.readiness.ready();
        self.run_terminal_phase(macro_set).await;

        if !self.toggles.poll {
            self.residual_cleanup(macro_set).await;
            return 0;
        }

        self.poll_until_interrupt_or_signal(macro_set, cancel).await
    }

    async fn poll_until_interrupt_or_signal(&self, macro_set: &mut MacroSet, cancel: &dyn Cancellation) -> i32 {
        loop {
            match self.meta.poll_interrupt_schedule().await {
                Ok(Some(notice)) => {
                    macro_set.daemon_state = DaemonState::Interrupted;
                    macro_set.interrupt_action = Some(notice.action);
                    macro_set.interrupt_time = Some(notice.time);
                    self.run_terminal_phase(macro_set).await;
                    self.residual_cleanup(macro_set).await;
                    return 0;
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "interrupt poll failed, retrying"),
            }

            tokio::select! {
                _ = tokio::time::sleep(INTERRUPT_POLL_INTERVAL) => {}
                _ = cancel.cancelled() => {
                    self.readiness.stopping();
                    macro_set.daemon_state = DaemonState::Stopping;
                    self.run_terminal_phase(macro_set).await;
                    self.residual_cleanup(macro_set).await;
                    return 0;
                }
            }
        }
    }

    /// Domain-level exec + notify for the current `daemon_state` (spec.md
    /// §4.8, §4.9). Per spec.md §7 ("Notification and post-init exec
    /// failures are non-fatal and logged"), neither sub-phase can fail the
    /// daemon.
    async fn run_terminal_phase(&self, macro_set: &MacroSet) {
        if self.toggles.exec {
            self.run_exec_phase(macro_set, macro_set.daemon_state.event_name()).await;
        }
        if self.toggles.notify {
            notify_dispatch::notify_all(self.cloud.clone(), &self.domains, macro_set).await;
        }
    }

    async fn run_exec_phase(&self, macro_set: &MacroSet, event: &str) {
        if let Err(e) = fanout::exec_all(&self.domains, macro_set, event).await {
            tracing::warn!(error = %e, event, "exec phase failed, continuing (non-fatal)");
        }
    }

    async fn residual_cleanup(&self, macro_set: &mut MacroSet) {
        let (logs, err) =
            residual::clean_up_transaction(self.cloud.clone(), macro_set.transaction_id.as_str(), self.dry_run)
                .await;
        macro_set.transaction_log.extend(logs);
        if let Some(e) = err {
            tracing::warn!(error = %e, "residual cleanup reported a failure");
            macro_set.error.push(e.to_string());
        }
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
