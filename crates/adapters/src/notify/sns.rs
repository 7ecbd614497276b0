// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `aws-sns` notify backend: `publish {TopicArn, Subject, Message}`.

use super::{NotifyBackend, NotifyError};
use crate::cloud::CloudClient;
use async_trait::async_trait;
use std::sync::Arc;

pub struct SnsBackend {
    client: Arc<dyn CloudClient>,
    options: serde_json::Value,
}

impl SnsBackend {
    pub fn new(client: Arc<dyn CloudClient>, options: serde_json::Value) -> Self {
        Self { client, options }
    }
}

#[async_trait]
impl NotifyBackend for SnsBackend {
    async fn post(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let topic_arn = self.options["TopicArn"].as_str().unwrap_or_default();
        self.client
            .call(
                "publish",
                serde_json::json!({
                    "TopicArn": topic_arn,
                    "Subject": subject,
                    "Message": body,
                }),
            )
            .await
            .map_err(|e| NotifyError::PublishFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "sns_tests.rs"]
mod tests;
