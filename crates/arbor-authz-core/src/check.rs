// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization checks.
//!
//! A [`Check`] is a pure predicate over a [`CheckContext`]. Checks never fetch
//! data and never fail: a reference to an attribute or relationship the
//! request does not carry evaluates to `false`. Unknown names are rejected
//! when resource definitions are registered, long before evaluation.

use serde::{Deserialize, Serialize};

use crate::predicate::Predicate;
use crate::request::AuthorizationRequest;
use crate::types::{Principal, RecordId};

/// What a check sees while it evaluates.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
	pub request: &'a AuthorizationRequest,
	/// Id of the record on the related-to end of the relationship write being
	/// authorized. `None` outside relationship scopes and for cleared writes.
	pub related_id: Option<&'a RecordId>,
}

impl<'a> CheckContext<'a> {
	/// Context for action and attribute scopes.
	pub fn new(request: &'a AuthorizationRequest) -> Self {
		Self {
			request,
			related_id: None,
		}
	}

	/// Context for a relationship scope.
	pub fn relationship(request: &'a AuthorizationRequest, related_id: Option<&'a RecordId>) -> Self {
		Self {
			request,
			related_id,
		}
	}
}

/// A single authorization predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Check {
	AlwaysTrue,
	AlwaysFalse,
	/// The principal carries `attribute` with exactly `value`.
	UserAttributeEquals {
		attribute: String,
		value: serde_json::Value,
	},
	/// The record being related to is the principal.
	RelatingToActor,
	/// The change sets `attribute` to exactly `value`.
	SettingAttributeTo {
		attribute: String,
		value: serde_json::Value,
	},
	/// The change writes `relationship`.
	SettingRelationship { relationship: String },
	/// The pre-mutation record holds exactly `value` for `attribute`.
	AttributeEquals {
		attribute: String,
		value: serde_json::Value,
	},
}

impl Check {
	pub fn user_attribute(attribute: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		Check::UserAttributeEquals {
			attribute: attribute.into(),
			value: value.into(),
		}
	}

	pub fn setting_attribute(attribute: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		Check::SettingAttributeTo {
			attribute: attribute.into(),
			value: value.into(),
		}
	}

	pub fn setting_relationship(relationship: impl Into<String>) -> Self {
		Check::SettingRelationship {
			relationship: relationship.into(),
		}
	}

	pub fn attribute(attribute: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		Check::AttributeEquals {
			attribute: attribute.into(),
			value: value.into(),
		}
	}

	/// Evaluates the check.
	pub fn evaluate(&self, ctx: &CheckContext<'_>) -> bool {
		let request = ctx.request;
		match self {
			Check::AlwaysTrue => true,
			Check::AlwaysFalse => false,
			Check::UserAttributeEquals { attribute, value } => {
				request.principal.attribute(attribute) == Some(value)
			}
			Check::RelatingToActor => ctx.related_id == Some(&request.principal.id),
			Check::SettingAttributeTo { attribute, value } => {
				request.change.attribute(attribute) == Some(value)
			}
			Check::SettingRelationship { relationship } => {
				request.change.relationship(relationship).is_some()
			}
			Check::AttributeEquals { attribute, value } => request
				.existing
				.as_ref()
				.is_some_and(|record| record.attribute_equals(attribute, value)),
		}
	}

	/// Returns true if the check can be translated into a record filter.
	pub fn is_strict(&self) -> bool {
		matches!(
			self,
			Check::AlwaysTrue
				| Check::AlwaysFalse
				| Check::UserAttributeEquals { .. }
				| Check::AttributeEquals { .. }
		)
	}

	/// Translates a strict check into a filter over stored records.
	///
	/// Principal-only checks become constants. Returns `None` for checks that
	/// depend on the proposed change or a relationship write.
	pub fn to_filter_predicate(&self, principal: &Principal) -> Option<Predicate> {
		match self {
			Check::AlwaysTrue => Some(Predicate::True),
			Check::AlwaysFalse => Some(Predicate::False),
			Check::UserAttributeEquals { attribute, value } => {
				Some(Predicate::constant(principal.attribute(attribute) == Some(value)))
			}
			Check::AttributeEquals { attribute, value } => {
				Some(Predicate::eq(attribute.clone(), value.clone()))
			}
			Check::RelatingToActor
			| Check::SettingAttributeTo { .. }
			| Check::SettingRelationship { .. } => None,
		}
	}

	/// Returns true if evaluation reads the pre-mutation record.
	pub fn requires_record(&self) -> bool {
		matches!(self, Check::AttributeEquals { .. })
	}

	/// The resource attribute this check refers to, if any.
	pub fn referenced_attribute(&self) -> Option<&str> {
		match self {
			Check::SettingAttributeTo { attribute, .. } | Check::AttributeEquals { attribute, .. } => {
				Some(attribute.as_str())
			}
			_ => None,
		}
	}

	/// The resource relationship this check refers to, if any.
	pub fn referenced_relationship(&self) -> Option<&str> {
		match self {
			Check::SettingRelationship { relationship } => Some(relationship.as_str()),
			_ => None,
		}
	}
}
