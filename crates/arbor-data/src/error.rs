// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use arbor_authz::{AuthzError, EvaluationError, ForbiddenError};
use arbor_authz_core::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
	#[error("Not found: {resource} {id}")]
	NotFound { resource: String, id: RecordId },

	#[error("Conflict: {resource} {id} already exists")]
	Conflict { resource: String, id: RecordId },

	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DataError>;

/// Errors returned by [`crate::ActionRunner`].
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
	#[error(transparent)]
	Forbidden(#[from] ForbiddenError),

	#[error(transparent)]
	Evaluation(#[from] EvaluationError),

	#[error(transparent)]
	Data(#[from] DataError),

	/// A record the action refers to does not exist.
	#[error("{resource} {id} does not exist")]
	NotFound { resource: String, id: RecordId },
}

impl From<AuthzError> for ActionError {
	fn from(err: AuthzError) -> Self {
		match err {
			AuthzError::Forbidden(err) => ActionError::Forbidden(err),
			AuthzError::Evaluation(err) => ActionError::Evaluation(err),
		}
	}
}

impl ActionError {
	pub fn is_forbidden(&self) -> bool {
		matches!(self, ActionError::Forbidden(_))
	}
}
