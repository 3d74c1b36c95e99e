// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit records for authorization decisions.
//!
//! A [`DecisionRecord`] captures one evaluated request in a serialisable form,
//! suitable for shipping to whatever audit sink the application uses. The
//! denying scope is only as detailed as the authorizer's disclosure policy:
//! opaque forbidden errors leave [`DecisionRecord::denied_by`] empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arbor_authz_core::{AuthorizationRequest, RecordId};

use crate::authorizer::Outcome;
use crate::scope::Scope;

/// What happened to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
	Granted,
	Denied,
	/// The request could not be evaluated.
	Failed,
}

impl std::fmt::Display for Decision {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Decision::Granted => "granted",
			Decision::Denied => "denied",
			Decision::Failed => "failed",
		};
		write!(f, "{s}")
	}
}

/// One authorization decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
	pub id: Uuid,
	pub timestamp: DateTime<Utc>,
	pub decision: Decision,
	pub principal_id: RecordId,
	pub resource: String,
	pub action: String,
	/// The record the action targets, when it already exists.
	pub record_id: Option<RecordId>,
	/// Resource and scope that denied the request.
	pub denied_by: Option<(String, Scope)>,
	/// Evaluation error message for failed requests.
	pub reason: Option<String>,
}

impl DecisionRecord {
	/// Records the outcome of evaluating `request`.
	///
	/// `denied_by` should be taken from a [`crate::Authorizer`] using
	/// detailed disclosure; an opaque forbidden error leaves it empty.
	pub fn new(request: &AuthorizationRequest, outcome: &Outcome) -> Self {
		let (decision, denied_by, reason) = match outcome {
			Outcome::Authorized => (Decision::Granted, None, None),
			Outcome::Forbidden(err) => (
				Decision::Denied,
				err.scope.clone().map(|scope| (err.resource.clone(), scope)),
				None,
			),
			Outcome::Error(err) => (Decision::Failed, None, Some(err.to_string())),
		};

		Self {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			decision,
			principal_id: request.principal.id,
			resource: request.resource.clone(),
			action: request.action.name.clone(),
			record_id: request.existing.as_ref().map(|r| r.id),
			denied_by,
			reason,
		}
	}
}
