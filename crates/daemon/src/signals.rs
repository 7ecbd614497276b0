// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal redirection to the main thread (spec.md §4.11, §5, §9 "Signal
//! redirection to main thread"): a single OS-signal listening task whose
//! only job is to publish a cancellation notice; [`crate::driver`] observes
//! it at its one suspension point between phases.
//!
//! SIGINT/SIGTERM are redirected here; the first one received flips
//! [`ShutdownSignal::cancelled`] and transitions the driver to STOPPING. A
//! second signal before the driver exits is delivered with (approximated)
//! default disposition: the process terminates immediately, matching
//! spec.md §5 ("the second is delivered with default disposition"). SIGALRM
//! is reserved for a future init-timeout and is not wired up (spec.md
//! §4.11).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;

/// What [`crate::driver::LifecycleDriver`] polls at its suspension point.
/// A trait so tests can substitute a fake that resolves on a schedule the
/// test controls, rather than racing real OS signals.
#[async_trait]
pub trait Cancellation: Send + Sync {
    /// Resolves once, the first time a shutdown has been requested.
    async fn cancelled(&self);
}

/// Production [`Cancellation`]: listens for SIGINT/SIGTERM and republishes
/// the first one as a cancellation notice.
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownSignal {
    /// Install the signal handlers and spawn the listening task.
    pub fn spawn() -> std::io::Result<Self> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let flag = Arc::new(AtomicBool::new(false));
        let notify = Arc::new(Notify::new());

        let task_flag = flag.clone();
        let task_notify = notify.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {}
                _ = sigint.recv() => {}
            }
            tracing::info!("received shutdown signal, transitioning to stopping");
            task_flag.store(true, Ordering::SeqCst);
            task_notify.notify_waiters();

            // A second signal gets the platform default: terminate now.
            tokio::select! {
                _ = sigterm.recv() => {}
                _ = sigint.recv() => {}
            }
            tracing::warn!("received second shutdown signal, terminating immediately");
            std::process::exit(130);
        });

        Ok(Self { flag, notify })
    }
}

#[async_trait]
impl Cancellation for ShutdownSignal {
    async fn cancelled(&self) {
        if self.flag.load(Ordering::SeqCst) {
            return;
        }
        self.notify.notified().await;
    }
}

/// A [`Cancellation`] that never resolves, for tests and for a driver run
/// with `--enable-poll=false` where no signal plumbing is needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancel;

#[async_trait]
impl Cancellation for NeverCancel {
    async fn cancelled(&self) {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
