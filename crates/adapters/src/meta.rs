// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`MetaManager`] — instance-metadata lookups, user-data retrieval, and
//! spot-interruption polling (spec.md §2 item 11, §6). Out of scope per
//! spec.md §1 ("the instance-metadata HTTP fetcher"); this module is the
//! abstract interface plus a thin production client over the IMDS HTTP
//! surface (ground: `ra0x3-systemg`'s `reqwest::blocking` usage, the only
//! HTTP client in the retrieval pack).

use async_trait::async_trait;
use fleetd_core::MacroSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetaError {
    #[error("metadata path {path} unreachable: {message}")]
    Unreachable { path: String, message: String },
    #[error("metadata field {path} missing or malformed")]
    Malformed { path: String },
    #[error("user-data unreadable: {0}")]
    UserdataUnreadable(String),
}

/// A pending spot-style interruption notice (spec.md §6: `{time, action}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptNotice {
    pub time: String,
    pub action: String,
}

/// The metadata-service capability boundary (spec.md §9 "Abstract
/// backends").
#[async_trait]
pub trait MetaManager: Send + Sync {
    /// Populate identity and placement fields on `macro_set` (spec.md §6:
    /// instance-id, instance-type, ami-launch-index, placement/region,
    /// placement/availability-zone, system, public-ipv4, ipv6, per-MAC
    /// public-ipv4s/ipv6s).
    async fn fetch_meta(&self, macro_set: &mut MacroSet) -> Result<(), MetaError>;

    /// Open the user-data document as a stream/string.
    async fn open_userdata(&self) -> Result<String, MetaError>;

    /// Poll for a pending interruption notice; `None` when there isn't one.
    async fn poll_interrupt_schedule(&self) -> Result<Option<InterruptNotice>, MetaError>;
}

/// Production [`MetaManager`] over an IMDS-style HTTP endpoint.
pub struct ImdsMetaManager {
    base_url: String,
    client: reqwest::Client,
}

impl ImdsMetaManager {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> Result<String, MetaError> {
        let url = format!("{}/{path}", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MetaError::Unreachable {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        response
            .text()
            .await
            .map_err(|e| MetaError::Unreachable {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    async fn get_optional(&self, path: &str) -> Option<String> {
        self.get(path).await.ok().filter(|s| !s.is_empty())
    }
}

#[async_trait]
impl MetaManager for ImdsMetaManager {
    async fn fetch_meta(&self, macro_set: &mut MacroSet) -> Result<(), MetaError> {
        macro_set.instance_id = self.get("meta-data/instance-id").await?;
        macro_set.instance_type = self.get("meta-data/instance-type").await?;
        macro_set.instance_index = self
            .get_optional("meta-data/ami-launch-index")
            .await
            .and_then(|s| s.parse().ok());
        macro_set.placement_region = self.get_optional("meta-data/placement/region").await;
        macro_set.placement_zone = self
            .get_optional("meta-data/placement/availability-zone")
            .await;
        macro_set.hypervisor = self
            .get_optional("meta-data/system")
            .await
            .map(|s| s.to_lowercase());
        macro_set.primary_public_ipv4 = self.get_optional("meta-data/public-ipv4").await;
        macro_set.primary_public_ipv6 = self.get_optional("meta-data/ipv6").await;
        Ok(())
    }

    async fn open_userdata(&self) -> Result<String, MetaError> {
        self.get("user-data")
            .await
            .map_err(|e| MetaError::UserdataUnreadable(e.to_string()))
    }

    async fn poll_interrupt_schedule(&self) -> Result<Option<InterruptNotice>, MetaError> {
        match self.get_optional("meta-data/spot/instance-action").await {
            None => Ok(None),
            Some(body) => {
                let value: serde_json::Value = serde_json::from_str(&body).map_err(|_| {
                    MetaError::Malformed {
                        path: "meta-data/spot/instance-action".to_string(),
                    }
                })?;
                let time = value["time"]
                    .as_str()
                    .ok_or_else(|| MetaError::Malformed {
                        path: "meta-data/spot/instance-action.time".to_string(),
                    })?
                    .to_string();
                let action = value["action"]
                    .as_str()
                    .ok_or_else(|| MetaError::Malformed {
                        path: "meta-data/spot/instance-action.action".to_string(),
                    })?
                    .to_string();
                Ok(Some(InterruptNotice { time, action }))
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! Scripted [`MetaManager`] test double.
    #![cfg_attr(coverage_nightly, coverage(off))]

    use super::{InterruptNotice, MetaError, MetaManager};
    use async_trait::async_trait;
    use fleetd_core::MacroSet;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    pub struct FakeMetaManager {
        inner: std::sync::Arc<Mutex<FakeState>>,
    }

    #[derive(Default)]
    struct FakeState {
        fill: Option<fn(&mut MacroSet)>,
        userdata: String,
        interrupt: Option<InterruptNotice>,
    }

    impl FakeMetaManager {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_userdata(self, userdata: impl Into<String>) -> Self {
            self.inner.lock().userdata = userdata.into();
            self
        }

        pub fn with_fill(self, fill: fn(&mut MacroSet)) -> Self {
            self.inner.lock().fill = Some(fill);
            self
        }

        pub fn set_interrupt(&self, notice: Option<InterruptNotice>) {
            self.inner.lock().interrupt = notice;
        }
    }

    #[async_trait]
    impl MetaManager for FakeMetaManager {
        async fn fetch_meta(&self, macro_set: &mut MacroSet) -> Result<(), MetaError> {
            if let Some(fill) = self.inner.lock().fill {
                fill(macro_set);
            }
            Ok(())
        }

        async fn open_userdata(&self) -> Result<String, MetaError> {
            Ok(self.inner.lock().userdata.clone())
        }

        async fn poll_interrupt_schedule(&self) -> Result<Option<InterruptNotice>, MetaError> {
            Ok(self.inner.lock().interrupt.clone())
        }
    }

    #[cfg(test)]
    #[path = "meta_fake_tests.rs"]
    mod tests;
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeMetaManager;
