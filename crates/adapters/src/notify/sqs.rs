// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `aws-sqs` notify backend: `send_message {QueueUrl, MessageBody}`.

use super::{NotifyBackend, NotifyError};
use crate::cloud::CloudClient;
use async_trait::async_trait;
use std::sync::Arc;

pub struct SqsBackend {
    client: Arc<dyn CloudClient>,
    options: serde_json::Value,
}

impl SqsBackend {
    pub fn new(client: Arc<dyn CloudClient>, options: serde_json::Value) -> Self {
        Self { client, options }
    }
}

#[async_trait]
impl NotifyBackend for SqsBackend {
    async fn post(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let queue_url = self.options["QueueUrl"].as_str().unwrap_or_default();
        let message = format!("{subject}\n\n{body}");
        self.client
            .call(
                "send_message",
                serde_json::json!({
                    "QueueUrl": queue_url,
                    "MessageBody": message,
                }),
            )
            .await
            .map_err(|e| NotifyError::PublishFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "sqs_tests.rs"]
mod tests;
