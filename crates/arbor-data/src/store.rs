// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use arbor_authz_core::{Predicate, Record, RecordId};

use crate::error::Result;

/// Storage for resource records, one table per resource name.
///
/// Implementations must apply `filter` exactly: a record is returned from
/// [`DataLayer::query`] only if [`Predicate::matches`] holds for it.
#[async_trait]
pub trait DataLayer: Send + Sync {
	/// Fetches zero or one record.
	async fn get(&self, resource: &str, id: &RecordId) -> Result<Option<Record>>;

	/// Returns matching records ordered by id. `None` returns every record.
	async fn query(&self, resource: &str, filter: Option<&Predicate>) -> Result<Vec<Record>>;

	/// Stores a new record. Fails if the id is taken.
	async fn insert(&self, resource: &str, record: Record) -> Result<Record>;

	/// Replaces an existing record. Fails if it does not exist.
	async fn update(&self, resource: &str, record: Record) -> Result<Record>;

	/// Removes a record, returning whether it existed.
	async fn delete(&self, resource: &str, id: &RecordId) -> Result<bool>;
}
