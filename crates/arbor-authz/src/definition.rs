// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource definitions.
//!
//! Definitions are plain data assembled with builder calls at startup and
//! handed to [`crate::RegistryBuilder`], which validates them all before any
//! request is evaluated.
//!
//! ```
//! use arbor_authz::{ActionDefinition, AttributeDefinition, RelationshipDefinition, ResourceDefinition};
//! use arbor_authz_core::{Check, Step, StepList};
//!
//! let draft = ResourceDefinition::new("draft")
//!     .attribute(AttributeDefinition::new("title"))
//!     .relationship(
//!         RelationshipDefinition::belongs_to("author", "user")
//!             .with_authorization(StepList::declared([Step::authorize_if(Check::RelatingToActor)])),
//!     )
//!     .action(ActionDefinition::create("create"));
//!
//! assert!(draft.get_relationship("author").is_some());
//! ```

use arbor_authz_core::{ActionKind, StepList};
use serde::{Deserialize, Serialize};

/// How two resources are related.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
	/// This resource stores the destination's id.
	BelongsTo,
	/// The destination stores this resource's id; at most one destination.
	HasOne,
	/// The destination stores this resource's id; any number of destinations.
	HasMany,
}

impl RelationshipKind {
	/// Returns true if a write also needs the destination's consent.
	pub fn has_reverse_side(&self) -> bool {
		matches!(self, RelationshipKind::BelongsTo | RelationshipKind::HasOne)
	}

	/// Returns true if a relationship of kind `other` can be the reverse of
	/// one of this kind.
	pub fn pairs_with(&self, other: RelationshipKind) -> bool {
		match self {
			RelationshipKind::BelongsTo => {
				matches!(other, RelationshipKind::HasOne | RelationshipKind::HasMany)
			}
			RelationshipKind::HasOne | RelationshipKind::HasMany => {
				other == RelationshipKind::BelongsTo
			}
		}
	}
}

/// A stored attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
	pub name: String,
	#[serde(default)]
	pub authorization: StepList,
}

impl AttributeDefinition {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			authorization: StepList::Undeclared,
		}
	}

	/// Builder: steps that must authorize any change to this attribute.
	pub fn with_authorization(mut self, steps: StepList) -> Self {
		self.authorization = steps;
		self
	}
}

/// A relationship to another resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDefinition {
	pub name: String,
	pub kind: RelationshipKind,
	pub destination: String,
	/// Attribute on this resource holding the link.
	pub source_field: String,
	/// Attribute on the destination holding the link.
	pub destination_field: String,
	/// The destination's relationship pointing back here.
	#[serde(default)]
	pub reverse: Option<String>,
	#[serde(default)]
	pub authorization: StepList,
}

impl RelationshipDefinition {
	/// `name` stores the destination's id in `<name>_id`.
	pub fn belongs_to(name: impl Into<String>, destination: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			source_field: format!("{name}_id"),
			destination_field: "id".to_string(),
			name,
			kind: RelationshipKind::BelongsTo,
			destination: destination.into(),
			reverse: None,
			authorization: StepList::Undeclared,
		}
	}

	/// The destination stores this record's id in `destination_field`.
	pub fn has_one(
		name: impl Into<String>,
		destination: impl Into<String>,
		destination_field: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			kind: RelationshipKind::HasOne,
			destination: destination.into(),
			source_field: "id".to_string(),
			destination_field: destination_field.into(),
			reverse: None,
			authorization: StepList::Undeclared,
		}
	}

	/// Like [`Self::has_one`], for any number of destination records.
	pub fn has_many(
		name: impl Into<String>,
		destination: impl Into<String>,
		destination_field: impl Into<String>,
	) -> Self {
		Self {
			kind: RelationshipKind::HasMany,
			..Self::has_one(name, destination, destination_field)
		}
	}

	/// Builder: name the destination's relationship pointing back here.
	pub fn with_reverse(mut self, reverse: impl Into<String>) -> Self {
		self.reverse = Some(reverse.into());
		self
	}

	/// Builder: override the attribute holding the link on this resource.
	pub fn with_source_field(mut self, field: impl Into<String>) -> Self {
		self.source_field = field.into();
		self
	}

	/// Builder: steps that must authorize any write to this relationship.
	pub fn with_authorization(mut self, steps: StepList) -> Self {
		self.authorization = steps;
		self
	}
}

/// A named action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
	pub name: String,
	pub kind: ActionKind,
	#[serde(default)]
	pub primary: bool,
	#[serde(default)]
	pub authorization: StepList,
}

impl ActionDefinition {
	pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
		Self {
			name: name.into(),
			kind,
			primary: false,
			authorization: StepList::Undeclared,
		}
	}

	pub fn create(name: impl Into<String>) -> Self {
		Self::new(name, ActionKind::Create)
	}

	pub fn read(name: impl Into<String>) -> Self {
		Self::new(name, ActionKind::Read)
	}

	pub fn update(name: impl Into<String>) -> Self {
		Self::new(name, ActionKind::Update)
	}

	pub fn destroy(name: impl Into<String>) -> Self {
		Self::new(name, ActionKind::Destroy)
	}

	/// Builder: mark as the primary action of its kind.
	pub fn primary(mut self) -> Self {
		self.primary = true;
		self
	}

	/// Builder: steps that must authorize the action itself.
	pub fn with_authorization(mut self, steps: StepList) -> Self {
		self.authorization = steps;
		self
	}
}

/// A resource with its attributes, relationships and actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
	pub name: String,
	#[serde(default)]
	pub attributes: Vec<AttributeDefinition>,
	#[serde(default)]
	pub relationships: Vec<RelationshipDefinition>,
	#[serde(default)]
	pub actions: Vec<ActionDefinition>,
}

impl ResourceDefinition {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			attributes: Vec::new(),
			relationships: Vec::new(),
			actions: Vec::new(),
		}
	}

	/// Builder: add an attribute.
	pub fn attribute(mut self, attribute: AttributeDefinition) -> Self {
		self.attributes.push(attribute);
		self
	}

	/// Builder: add a relationship.
	pub fn relationship(mut self, relationship: RelationshipDefinition) -> Self {
		self.relationships.push(relationship);
		self
	}

	/// Builder: add an action.
	pub fn action(mut self, action: ActionDefinition) -> Self {
		self.actions.push(action);
		self
	}

	pub fn get_attribute(&self, name: &str) -> Option<&AttributeDefinition> {
		self.attributes.iter().find(|a| a.name == name)
	}

	pub fn get_relationship(&self, name: &str) -> Option<&RelationshipDefinition> {
		self.relationships.iter().find(|r| r.name == name)
	}

	pub fn get_action(&self, name: &str) -> Option<&ActionDefinition> {
		self.actions.iter().find(|a| a.name == name)
	}

	/// The action used when a caller asks for a kind rather than a name: the
	/// only action of that kind, or the one marked primary.
	pub fn primary_action(&self, kind: ActionKind) -> Option<&ActionDefinition> {
		let mut of_kind = self.actions.iter().filter(|a| a.kind == kind);
		let first = of_kind.next()?;
		match of_kind.next() {
			None => Some(first),
			Some(_) => self.actions.iter().find(|a| a.kind == kind && a.primary),
		}
	}

	/// Returns true if `name` is an attribute or a `belongs_to` link field.
	pub fn has_stored_field(&self, name: &str) -> bool {
		self.get_attribute(name).is_some()
			|| self
				.relationships
				.iter()
				.any(|r| r.kind == RelationshipKind::BelongsTo && r.source_field == name)
	}
}
