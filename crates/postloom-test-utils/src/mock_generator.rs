// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation adapter for deterministic testing.
//!
//! `MockGenerator` implements `GenerationAdapter` with pre-configured
//! responses, enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use postloom_core::traits::{GenerationAdapter, PluginAdapter};
use postloom_core::types::{AdapterType, BatchRequest, GenerationRequest, HealthStatus};
use postloom_core::PostloomError;

/// A scripted outcome for one generation call.
type Scripted<T> = Result<T, PostloomError>;

/// A mock generation collaborator that returns pre-configured outcomes.
///
/// Single and batch responses pop from separate FIFO queues. When a queue
/// is empty the adapter synthesizes a default success: `"mock text"` for
/// single calls, and `count` numbered candidates for batch calls.
pub struct MockGenerator {
    single: Arc<Mutex<VecDeque<Scripted<String>>>>,
    batch: Arc<Mutex<VecDeque<Scripted<Vec<String>>>>>,
    calls: Arc<Mutex<u32>>,
}

impl MockGenerator {
    /// Create a new mock generator with empty queues.
    pub fn new() -> Self {
        Self {
            single: Arc::new(Mutex::new(VecDeque::new())),
            batch: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue an outcome for the next single generation call.
    pub async fn push_single(&self, outcome: Scripted<String>) {
        self.single.lock().await.push_back(outcome);
    }

    /// Queue an outcome for the next batch generation call.
    pub async fn push_batch(&self, outcome: Scripted<Vec<String>>) {
        self.batch.lock().await.push_back(outcome);
    }

    /// Total generate/generate_batch invocations so far.
    pub async fn call_count(&self) -> u32 {
        *self.calls.lock().await
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, PostloomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PostloomError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationAdapter for MockGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<String, PostloomError> {
        *self.calls.lock().await += 1;
        self.single
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock text".to_string()))
    }

    async fn generate_batch(&self, request: BatchRequest) -> Result<Vec<String>, PostloomError> {
        *self.calls.lock().await += 1;
        self.batch.lock().await.pop_front().unwrap_or_else(|| {
            Ok((1..=request.count.count())
                .map(|n| format!("mock candidate {n}"))
                .collect())
        })
    }
}
