// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization requests.
//!
//! An [`AuthorizationRequest`] describes one attempted operation: the target
//! resource and action, the acting [`Principal`], the proposed [`ChangeSet`]
//! and, for operations on existing data, the pre-mutation [`Record`].
//!
//! Requests are assembled by the caller before evaluation starts and are
//! never mutated by the engine. Every record a check may need (the existing
//! record, related records for relationship writes) must already be loaded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{ActionKind, Attributes, Principal, Record, RecordId};

/// A write to one relationship of the record being changed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RelationshipWrite {
	/// The record being related to. `None` clears the relationship.
	pub target_id: Option<RecordId>,
	/// The related record's current state, when the caller loaded it.
	#[serde(default)]
	pub target_record: Option<Record>,
}

impl RelationshipWrite {
	/// Relates to the record with the given id.
	pub fn to(target_id: RecordId) -> Self {
		Self {
			target_id: Some(target_id),
			target_record: None,
		}
	}

	/// Removes the relationship.
	pub fn clear() -> Self {
		Self::default()
	}

	/// Builder: attach the loaded target record.
	pub fn with_record(mut self, record: Record) -> Self {
		self.target_id = Some(record.id);
		self.target_record = Some(record);
		self
	}
}

/// The attribute and relationship writes proposed by a request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeSet {
	#[serde(default)]
	pub attributes: Attributes,
	#[serde(default)]
	pub relationships: BTreeMap<String, RelationshipWrite>,
}

impl ChangeSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: propose a new attribute value.
	pub fn set(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	/// Builder: propose a relationship write.
	pub fn relate(mut self, name: impl Into<String>, write: RelationshipWrite) -> Self {
		self.relationships.insert(name.into(), write);
		self
	}

	/// Returns the proposed value for `name`, if the change sets it.
	pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
		self.attributes.get(name)
	}

	/// Returns the proposed write for relationship `name`, if any.
	pub fn relationship(&self, name: &str) -> Option<&RelationshipWrite> {
		self.relationships.get(name)
	}

	pub fn is_empty(&self) -> bool {
		self.attributes.is_empty() && self.relationships.is_empty()
	}
}

/// Names the action a request invokes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRef {
	pub name: String,
	pub kind: ActionKind,
}

impl ActionRef {
	pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
		Self {
			name: name.into(),
			kind,
		}
	}
}

/// One attempted operation, as seen by the authorization engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
	pub resource: String,
	pub action: ActionRef,
	pub principal: Principal,
	#[serde(default)]
	pub change: ChangeSet,
	#[serde(default)]
	pub existing: Option<Record>,
}

impl AuthorizationRequest {
	/// Creates a request with an empty change set and no existing record.
	pub fn new(resource: impl Into<String>, action: ActionRef, principal: Principal) -> Self {
		Self {
			resource: resource.into(),
			action,
			principal,
			change: ChangeSet::default(),
			existing: None,
		}
	}

	/// Builder: set the proposed change set.
	pub fn with_change(mut self, change: ChangeSet) -> Self {
		self.change = change;
		self
	}

	/// Builder: set the pre-mutation record.
	pub fn with_existing(mut self, record: Record) -> Self {
		self.existing = Some(record);
		self
	}

	/// Derives the request evaluated against the far side of a relationship
	/// write.
	///
	/// The derived request targets `destination`, keeps the principal and
	/// action, uses the related record as its existing record and proposes a
	/// write to `reverse` pointing back at this request's record.
	pub fn scoped_to_related(
		&self,
		destination: &str,
		reverse: &str,
		write: &RelationshipWrite,
	) -> AuthorizationRequest {
		let back = RelationshipWrite {
			target_id: self.existing.as_ref().map(|r| r.id),
			target_record: self.existing.clone(),
		};

		AuthorizationRequest {
			resource: destination.to_string(),
			action: self.action.clone(),
			principal: self.principal.clone(),
			change: ChangeSet::new().relate(reverse, back),
			existing: write.target_record.clone(),
		}
	}
}
