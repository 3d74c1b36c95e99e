// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization error types.
//!
//! - [`ConfigurationError`]: a resource definition is invalid. Raised while
//!   the registry is built; startup must abort.
//! - [`ForbiddenError`]: an operation was denied. Expected, per request.
//! - [`EvaluationError`]: a request could not be evaluated (unknown names,
//!   records the caller failed to load). Never converted into a verdict.

use arbor_authz_core::ActionKind;
use thiserror::Error;

use crate::scope::Scope;

/// Invalid resource definitions, detected when the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
	// =========================================================================
	// Naming
	// =========================================================================
	/// Two resources share a name.
	#[error("resource {0} is defined more than once")]
	DuplicateResource(String),

	/// Two actions of one resource share a name.
	#[error("action {action} is defined more than once on {resource}")]
	DuplicateAction { resource: String, action: String },

	/// An attribute or relationship name is used twice on one resource.
	#[error("field {field} is defined more than once on {resource}")]
	DuplicateField { resource: String, field: String },

	/// Several actions of one kind exist and none is marked primary.
	#[error("{resource} has several {kind} actions but none is primary")]
	MissingPrimaryAction { resource: String, kind: ActionKind },

	/// More than one action of one kind is marked primary.
	#[error("{resource} has more than one primary {kind} action")]
	MultiplePrimaryActions { resource: String, kind: ActionKind },

	// =========================================================================
	// Relationships
	// =========================================================================
	/// A relationship points at a resource that is not registered.
	#[error("relationship {relationship} on {resource} points at unknown resource {destination}")]
	UnknownDestination {
		resource: String,
		relationship: String,
		destination: String,
	},

	/// A relationship names a reverse relationship the destination lacks.
	#[error("relationship {relationship} on {resource} names unknown reverse relationship {reverse}")]
	UnknownReverseRelationship {
		resource: String,
		relationship: String,
		reverse: String,
	},

	/// A reverse relationship does not point back at the declaring resource,
	/// or its kind cannot pair with the declaring relationship.
	#[error("relationship {relationship} on {resource} names reverse relationship {reverse}, which does not pair with it")]
	MismatchedReverse {
		resource: String,
		relationship: String,
		reverse: String,
	},

	/// Reverse-side authorization only exists for `belongs_to` and `has_one`.
	#[error("relationship {relationship} on {resource} cannot declare a reverse relationship")]
	ReverseNotSupported { resource: String, relationship: String },

	// =========================================================================
	// Step lists
	// =========================================================================
	/// A check refers to an attribute the resource does not define.
	#[error("{scope} on {resource} references unknown attribute {attribute}")]
	UnknownAttribute {
		resource: String,
		scope: Scope,
		attribute: String,
	},

	/// A check refers to a relationship the resource does not define.
	#[error("{scope} on {resource} references unknown relationship {relationship}")]
	UnknownRelationship {
		resource: String,
		scope: Scope,
		relationship: String,
	},

	/// A step list was declared without steps.
	#[error("{scope} on {resource} declares an empty step list")]
	EmptyStepList { resource: String, scope: Scope },

	/// `relating_to_actor` is used where no relationship is being written.
	#[error("{scope} on {resource} uses relating_to_actor outside a relationship")]
	RelatingToActorOutsideRelationship { resource: String, scope: Scope },
}

/// An operation was denied.
///
/// `scope` is only populated when the authorizer is configured to disclose
/// the failing scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("forbidden: {resource}{}", .scope.as_ref().map(|s| format!(" ({s})")).unwrap_or_default())]
pub struct ForbiddenError {
	pub resource: String,
	pub scope: Option<Scope>,
}

/// A request could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
	#[error("unknown resource: {0}")]
	UnknownResource(String),

	#[error("unknown action {action} on {resource}")]
	UnknownAction { resource: String, action: String },

	#[error("{resource} has no primary {kind} action")]
	NoPrimaryAction { resource: String, kind: ActionKind },

	#[error("action {action} on {resource} is a {actual} action, not {requested}")]
	ActionKindMismatch {
		resource: String,
		action: String,
		actual: ActionKind,
		requested: ActionKind,
	},

	#[error("unknown attribute {attribute} on {resource}")]
	UnknownAttribute { resource: String, attribute: String },

	#[error("unknown relationship {relationship} on {resource}")]
	UnknownRelationship {
		resource: String,
		relationship: String,
	},

	/// A check needs the pre-mutation record and the caller did not load it.
	#[error("{scope} on {resource} needs the existing record, which was not supplied")]
	MissingRecord { resource: String, scope: Scope },

	/// A reverse-side check needs the related record and the caller did not
	/// load it.
	#[error("relationship {relationship} on {resource} needs the related record, which was not supplied")]
	MissingRelatedRecord {
		resource: String,
		relationship: String,
	},
}

/// Boundary error for callers that want `?` on an authorization outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
	#[error(transparent)]
	Forbidden(#[from] ForbiddenError),

	#[error(transparent)]
	Evaluation(#[from] EvaluationError),
}

pub type Result<T> = std::result::Result<T, AuthzError>;
