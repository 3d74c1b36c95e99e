// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Destinations for authorization decision records.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use arbor_authz::DecisionRecord;

use crate::error::Result;

#[async_trait]
pub trait DecisionSink: Send + Sync {
	/// Unique name for this sink (used in logs).
	fn name(&self) -> &str;

	/// Publish one decision.
	async fn publish(&self, record: Arc<DecisionRecord>) -> Result<()>;
}

/// Writes each decision as a JSON line to the `arbor::audit` tracing target.
#[derive(Debug, Default)]
pub struct TracingDecisionSink;

#[async_trait]
impl DecisionSink for TracingDecisionSink {
	fn name(&self) -> &str {
		"tracing"
	}

	async fn publish(&self, record: Arc<DecisionRecord>) -> Result<()> {
		let line = serde_json::to_string(record.as_ref())?;
		info!(target: "arbor::audit", decision = %record.decision, "{line}");
		Ok(())
	}
}

/// Keeps decisions in memory.
#[derive(Debug, Default)]
pub struct MemoryDecisionSink {
	records: Mutex<Vec<Arc<DecisionRecord>>>,
}

impl MemoryDecisionSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn records(&self) -> Vec<Arc<DecisionRecord>> {
		self.records.lock().await.clone()
	}
}

#[async_trait]
impl DecisionSink for MemoryDecisionSink {
	fn name(&self) -> &str {
		"memory"
	}

	async fn publish(&self, record: Arc<DecisionRecord>) -> Result<()> {
		self.records.lock().await.push(record);
		Ok(())
	}
}
