// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`NotifyBackend`] — publish to a topic (`sns`) or queue (`sqs`) (spec.md
//! §2 item 12, §4.9). Ground: `oj-adapters::notify`'s trait-plus-fake split.

mod sns;
mod sqs;

pub use sns::SnsBackend;
pub use sqs::SqsBackend;

use crate::cloud::CloudClient;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("unknown notify backend kind: {0}")]
    UnknownKind(String),
    #[error("notify publish failed: {0}")]
    PublishFailed(String),
}

/// Publish a notification built from a domain's [`fleetd_core::MacroSet`]
/// (spec.md §4.9).
#[async_trait]
pub trait NotifyBackend: Send + Sync {
    async fn post(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Construct a [`NotifyBackend`] from a user-data `backend` string and its
/// options object.
///
/// Accepts both `"aws-sqs"` and the original's `"ans-sqs"` typo (spec.md §9
/// open question 3), logging a deprecation warning on the latter.
pub fn mk_notify_backend(
    kind: &str,
    options: serde_json::Value,
    client: Arc<dyn CloudClient>,
) -> Result<Box<dyn NotifyBackend>, NotifyError> {
    match kind {
        "aws-sns" => Ok(Box::new(sns::SnsBackend::new(client, options))),
        "aws-sqs" => Ok(Box::new(sqs::SqsBackend::new(client, options))),
        "ans-sqs" => {
            tracing::warn!("notify backend kind \"ans-sqs\" is deprecated, use \"aws-sqs\"");
            Ok(Box::new(sqs::SqsBackend::new(client, options)))
        }
        other => Err(NotifyError::UnknownKind(other.to_string())),
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! Recording [`NotifyBackend`] test double.
    #![cfg_attr(coverage_nightly, coverage(off))]

    use super::{NotifyBackend, NotifyError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    pub struct NotifyCall {
        pub subject: String,
        pub body: String,
    }

    #[derive(Clone, Default)]
    pub struct FakeNotifyBackend {
        calls: Arc<Mutex<Vec<NotifyCall>>>,
    }

    impl FakeNotifyBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<NotifyCall> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl NotifyBackend for FakeNotifyBackend {
        async fn post(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
            self.calls.lock().push(NotifyCall {
                subject: subject.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }
    }

    #[cfg(test)]
    #[path = "notify_fake_tests.rs"]
    mod tests;
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyBackend, NotifyCall};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
