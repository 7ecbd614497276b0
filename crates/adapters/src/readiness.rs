// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ReadinessNotifier`] — the sd_notify line protocol (spec.md §6
//! "Readiness notification"): `READY=1`, `STATUS=<text>`, `STOPPING=1`
//! written to `$NOTIFY_SOCKET`. Ground: the original's
//! `sdnotify.SystemdNotifier()`, unconditionally constructed and harmless
//! outside a service-manager context — modeled here as a `Noop` fallback
//! rather than a silently-absent socket.

#[cfg(unix)]
use std::os::unix::net::UnixDatagram;

pub trait ReadinessNotifier: Send + Sync {
    fn ready(&self);
    fn status(&self, text: &str);
    fn stopping(&self);
}

/// Writes datagrams to the socket path named by `$NOTIFY_SOCKET`. Every
/// send failure is logged and otherwise ignored — readiness reporting must
/// never be allowed to fail the daemon.
pub struct SystemdNotifier {
    #[cfg(unix)]
    socket: Option<(UnixDatagram, std::path::PathBuf)>,
}

impl SystemdNotifier {
    pub fn from_env() -> Self {
        #[cfg(unix)]
        {
            let socket = std::env::var_os("NOTIFY_SOCKET").and_then(|path| {
                let path = std::path::PathBuf::from(path);
                UnixDatagram::unbound().ok().map(|s| (s, path))
            });
            Self { socket }
        }
        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    fn send(&self, line: &str) {
        #[cfg(unix)]
        if let Some((socket, path)) = &self.socket {
            if let Err(e) = socket.send_to(line.as_bytes(), path) {
                tracing::warn!(error = %e, "readiness notification send failed");
            }
        }
        #[cfg(not(unix))]
        let _ = line;
    }
}

impl ReadinessNotifier for SystemdNotifier {
    fn ready(&self) {
        self.send("READY=1");
    }

    fn status(&self, text: &str) {
        self.send(&format!("STATUS={text}"));
    }

    fn stopping(&self) {
        self.send("STOPPING=1");
    }
}

/// A no-op notifier for platforms or tests without a service manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReadinessNotifier;

impl ReadinessNotifier for NoopReadinessNotifier {
    fn ready(&self) {}
    fn status(&self, _text: &str) {}
    fn stopping(&self) {}
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    #![cfg_attr(coverage_nightly, coverage(off))]

    use super::ReadinessNotifier;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ReadinessCall {
        Ready,
        Status(String),
        Stopping,
    }

    #[derive(Default)]
    pub struct FakeReadinessNotifier {
        calls: Mutex<Vec<ReadinessCall>>,
    }

    impl FakeReadinessNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<ReadinessCall> {
            self.calls.lock().clone()
        }
    }

    impl ReadinessNotifier for FakeReadinessNotifier {
        fn ready(&self) {
            self.calls.lock().push(ReadinessCall::Ready);
        }

        fn status(&self, text: &str) {
            self.calls.lock().push(ReadinessCall::Status(text.to_string()));
        }

        fn stopping(&self) {
            self.calls.lock().push(ReadinessCall::Stopping);
        }
    }

    #[cfg(test)]
    #[path = "readiness_fake_tests.rs"]
    mod tests;
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeReadinessNotifier, ReadinessCall};

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
