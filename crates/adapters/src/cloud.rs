// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`CloudClient`] and the [`LoggingCloudClient`] wrapper (spec.md §2 item
//! 6, §9 "Abstract backends"): a generic `call(method, params)` surface over
//! the cloud API, with an append-only [`ResourceTransactionLog`] entry
//! emitted around every call. Ground: teacher's `NotifyAdapter` trait-plus-
//! fake split (`oj-adapters::notify`).

use async_trait::async_trait;
use fleetd_core::ResourceTransactionLog;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CloudError {
    #[error("cloud call {method} failed: {message}")]
    CallFailed { method: String, message: String },
}

/// The raw cloud API surface fleetd consumes. Out of scope per spec.md §1
/// ("the concrete cloud API client"); production code backs this with the
/// cloud SDK's generic request dispatch.
#[async_trait]
pub trait CloudClient: Send + Sync {
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, CloudError>;
}

#[async_trait]
impl CloudClient for std::sync::Arc<dyn CloudClient> {
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, CloudError> {
        (**self).call(method, params).await
    }
}

/// Wraps a [`CloudClient`], appending one [`ResourceTransactionLog`] entry
/// per call before returning (spec.md §8: "exactly one log appended before
/// the call returns").
pub struct LoggingCloudClient<C> {
    inner: C,
    domain: String,
    dry: bool,
}

impl<C: CloudClient> LoggingCloudClient<C> {
    pub fn new(inner: C, domain: impl Into<String>, dry: bool) -> Self {
        Self {
            inner,
            domain: domain.into(),
            dry,
        }
    }

    /// Issue `method(params)`, returning both the call's result and the
    /// transaction-log entry to append to the caller's `MacroSet`.
    pub async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> (Result<serde_json::Value, CloudError>, ResourceTransactionLog) {
        let log = ResourceTransactionLog::new("aws", &self.domain, method, params.clone(), self.dry);
        let span = tracing::info_span!("cloud_call", method, domain = %self.domain, dry = self.dry);
        let _enter = span.enter();

        let result = if self.dry {
            tracing::info!("dry run, skipping call");
            Ok(serde_json::Value::Null)
        } else {
            self.inner.call(method, params).await
        };

        if let Err(e) = &result {
            tracing::warn!(error = %e, "cloud call failed");
        }

        (result, log)
    }
}

/// A [`CloudClient`] that always fails, explaining why.
///
/// The concrete cloud API client — the vendor SDK that signs and sends each
/// `call` over the wire — is out of scope (spec.md §1: "the concrete cloud
/// API client"). fleetd still has to link and run as a complete binary, so
/// this is the seam a real deployment plugs a vendor SDK-backed
/// [`CloudClient`] into; until one is, every call fails loudly instead of
/// the binary refusing to start.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredCloudClient;

#[async_trait]
impl CloudClient for UnconfiguredCloudClient {
    async fn call(
        &self,
        method: &str,
        _params: serde_json::Value,
    ) -> Result<serde_json::Value, CloudError> {
        Err(CloudError::CallFailed {
            method: method.to_string(),
            message: "no cloud API client configured".to_string(),
        })
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! Scripted [`CloudClient`] test double (ground:
    //! `oj-adapters::notify::FakeNotifyAdapter`).
    #![cfg_attr(coverage_nightly, coverage(off))]

    use super::{CloudClient, CloudError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    pub struct CloudCall {
        pub method: String,
        pub params: serde_json::Value,
    }

    struct FakeState {
        calls: Vec<CloudCall>,
        responses: VecDeque<Result<serde_json::Value, CloudError>>,
        default_response: serde_json::Value,
    }

    /// A `CloudClient` that records every call and replays scripted
    /// responses in order, falling back to `default_response` once the
    /// script is exhausted.
    #[derive(Clone)]
    pub struct FakeCloudClient {
        inner: Arc<Mutex<FakeState>>,
    }

    impl Default for FakeCloudClient {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeState {
                    calls: Vec::new(),
                    responses: VecDeque::new(),
                    default_response: serde_json::Value::Null,
                })),
            }
        }
    }

    impl FakeCloudClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_response(&self, response: Result<serde_json::Value, CloudError>) {
            self.inner.lock().responses.push_back(response);
        }

        pub fn set_default_response(&self, response: serde_json::Value) {
            self.inner.lock().default_response = response;
        }

        pub fn calls(&self) -> Vec<CloudCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl CloudClient for FakeCloudClient {
        async fn call(
            &self,
            method: &str,
            params: serde_json::Value,
        ) -> Result<serde_json::Value, CloudError> {
            let mut state = self.inner.lock();
            state.calls.push(CloudCall {
                method: method.to_string(),
                params,
            });
            match state.responses.pop_front() {
                Some(scripted) => scripted,
                None => Ok(state.default_response.clone()),
            }
        }
    }

    #[cfg(test)]
    #[path = "cloud_fake_tests.rs"]
    mod tests;
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{CloudCall, FakeCloudClient};

#[cfg(test)]
#[path = "cloud_tests.rs"]
mod tests;
