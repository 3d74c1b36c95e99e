// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Foundational types shared by the authorization engine and data layers.
//!
//! - **ID newtypes**: [`RecordId`] wraps a UUID so record and principal
//!   identifiers cannot be confused with arbitrary strings
//! - **Records**: [`Record`] holds the persisted attribute values of one
//!   resource instance
//! - **Principals**: [`Principal`] is the already-authenticated actor together
//!   with the attributes checks may inspect
//! - **Action kinds**: [`ActionKind`] classifies an action as create, read,
//!   update or destroy

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Attribute values keyed by attribute name.
pub type Attributes = BTreeMap<String, serde_json::Value>;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}

		impl From<$name> for serde_json::Value {
			fn from(id: $name) -> Self {
				serde_json::Value::String(id.0.to_string())
			}
		}
	};
}

define_id_type!(RecordId, "Unique identifier for a persisted record or principal.");

// =============================================================================
// Actions
// =============================================================================

/// The kind of operation an action performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
	Create,
	Read,
	Update,
	Destroy,
}

impl ActionKind {
	/// Returns all action kinds.
	pub fn all() -> &'static [ActionKind] {
		&[
			ActionKind::Create,
			ActionKind::Read,
			ActionKind::Update,
			ActionKind::Destroy,
		]
	}

	/// Returns true if the action changes persisted state.
	pub fn is_mutation(&self) -> bool {
		!matches!(self, ActionKind::Read)
	}
}

impl fmt::Display for ActionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			ActionKind::Create => "create",
			ActionKind::Read => "read",
			ActionKind::Update => "update",
			ActionKind::Destroy => "destroy",
		};
		write!(f, "{s}")
	}
}

// =============================================================================
// Records and Principals
// =============================================================================

/// A persisted resource instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
	pub id: RecordId,
	#[serde(default)]
	pub attributes: Attributes,
}

impl Record {
	/// Creates a record with no attribute values.
	pub fn new(id: RecordId) -> Self {
		Self {
			id,
			attributes: Attributes::new(),
		}
	}

	/// Builder: set an attribute value.
	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	/// Sets an attribute value, replacing any previous one.
	pub fn set(&mut self, name: impl Into<String>, value: serde_json::Value) {
		self.attributes.insert(name.into(), value);
	}

	/// Returns the value stored for `name`, if any.
	pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
		self.attributes.get(name)
	}

	/// Returns true if the record stores exactly `value` for `name`.
	///
	/// A missing attribute never equals anything, not even `null`.
	pub fn attribute_equals(&self, name: &str, value: &serde_json::Value) -> bool {
		self.get(name) == Some(value)
	}
}

/// The authenticated actor on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
	pub id: RecordId,
	#[serde(default)]
	pub attributes: Attributes,
}

impl Principal {
	/// Creates a principal with no attributes.
	pub fn new(id: RecordId) -> Self {
		Self {
			id,
			attributes: Attributes::new(),
		}
	}

	/// Builder: set an attribute.
	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	/// Returns the attribute value for `name`, if any.
	pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
		self.attributes.get(name)
	}
}
