// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory [`DataLayer`].

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::instrument;

use arbor_authz_core::{Predicate, Record, RecordId};

use crate::error::{DataError, Result};
use crate::store::DataLayer;

type Table = BTreeMap<RecordId, Record>;

/// Keeps every resource in a keyed table behind one lock.
#[derive(Debug, Default)]
pub struct MemoryDataLayer {
	tables: RwLock<HashMap<String, Table>>,
}

impl MemoryDataLayer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of records stored for `resource`.
	pub async fn count(&self, resource: &str) -> usize {
		self.tables.read().await.get(resource).map_or(0, |t| t.len())
	}
}

#[async_trait]
impl DataLayer for MemoryDataLayer {
	async fn get(&self, resource: &str, id: &RecordId) -> Result<Option<Record>> {
		let tables = self.tables.read().await;
		Ok(tables.get(resource).and_then(|t| t.get(id)).cloned())
	}

	#[instrument(level = "trace", skip(self, filter))]
	async fn query(&self, resource: &str, filter: Option<&Predicate>) -> Result<Vec<Record>> {
		let tables = self.tables.read().await;
		let Some(table) = tables.get(resource) else {
			return Ok(Vec::new());
		};
		Ok(table
			.values()
			.filter(|record| filter.map_or(true, |f| f.matches(record)))
			.cloned()
			.collect())
	}

	async fn insert(&self, resource: &str, record: Record) -> Result<Record> {
		let mut tables = self.tables.write().await;
		let table = tables.entry(resource.to_string()).or_default();
		if table.contains_key(&record.id) {
			return Err(DataError::Conflict {
				resource: resource.to_string(),
				id: record.id,
			});
		}
		table.insert(record.id, record.clone());
		Ok(record)
	}

	async fn update(&self, resource: &str, record: Record) -> Result<Record> {
		let mut tables = self.tables.write().await;
		let slot = tables
			.get_mut(resource)
			.and_then(|t| t.get_mut(&record.id))
			.ok_or_else(|| DataError::NotFound {
				resource: resource.to_string(),
				id: record.id,
			})?;
		*slot = record.clone();
		Ok(record)
	}

	async fn delete(&self, resource: &str, id: &RecordId) -> Result<bool> {
		let mut tables = self.tables.write().await;
		Ok(tables
			.get_mut(resource)
			.is_some_and(|t| t.remove(id).is_some()))
	}
}
