// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The cross-resource authorizer.
//!
//! [`Authorizer::evaluate`] expands a request into its [`Closure`] and runs
//! every item's step list. The request is authorized only if every item is;
//! the first forbidden item ends evaluation.
//!
//! The authorizer never touches storage. Records a check depends on must be
//! loaded into the request beforehand.

use std::sync::Arc;

use arbor_authz_core::{
	ActionKind, ActionRef, AuthorizationRequest, CheckContext, Principal, Record, Verdict,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::closure::Closure;
use crate::definition::ActionDefinition;
use crate::error::{AuthzError, EvaluationError, ForbiddenError};
use crate::registry::Registry;
use crate::strict::{self, ReadPlan};

/// How much a [`ForbiddenError`] reveals about the policy that denied it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disclosure {
	/// Report the resource and scope that denied the request.
	#[default]
	Detailed,
	/// Report only the requested resource.
	Opaque,
}

impl std::str::FromStr for Disclosure {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"detailed" => Ok(Disclosure::Detailed),
			"opaque" => Ok(Disclosure::Opaque),
			other => Err(format!("unknown disclosure policy: {other}")),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerSettings {
	pub disclosure: Disclosure,
	/// Push strict read checks down to the data layer as filters.
	pub strict_filters: bool,
}

impl Default for AuthorizerSettings {
	fn default() -> Self {
		Self {
			disclosure: Disclosure::Detailed,
			strict_filters: true,
		}
	}
}

/// The result of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	Authorized,
	Forbidden(ForbiddenError),
	Error(EvaluationError),
}

impl Outcome {
	pub fn is_authorized(&self) -> bool {
		matches!(self, Outcome::Authorized)
	}

	pub fn is_forbidden(&self) -> bool {
		matches!(self, Outcome::Forbidden(_))
	}

	pub fn into_result(self) -> crate::error::Result<()> {
		match self {
			Outcome::Authorized => Ok(()),
			Outcome::Forbidden(err) => Err(AuthzError::Forbidden(err)),
			Outcome::Error(err) => Err(AuthzError::Evaluation(err)),
		}
	}
}

/// Evaluates requests against a shared [`Registry`].
#[derive(Debug, Clone)]
pub struct Authorizer {
	registry: Arc<Registry>,
	settings: AuthorizerSettings,
}

impl Authorizer {
	pub fn new(registry: Arc<Registry>) -> Self {
		Self::with_settings(registry, AuthorizerSettings::default())
	}

	pub fn with_settings(registry: Arc<Registry>, settings: AuthorizerSettings) -> Self {
		Self { registry, settings }
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn settings(&self) -> &AuthorizerSettings {
		&self.settings
	}

	/// Decides whether `request` may proceed.
	#[instrument(
		level = "debug",
		skip(self, request),
		fields(
			resource = %request.resource,
			action = %request.action.name,
			principal = %request.principal.id,
		)
	)]
	pub fn evaluate(&self, request: &AuthorizationRequest) -> Outcome {
		let closure = match Closure::build(&self.registry, request) {
			Ok(closure) => closure,
			Err(err) => {
				debug!(error = %err, "request could not be evaluated");
				return Outcome::Error(err);
			}
		};

		for item in closure.items() {
			let verdict = item.steps.decide(&closure.context(item));
			debug!(
				item_resource = item.resource,
				scope = %item.scope,
				verdict = ?verdict,
				"closure item evaluated"
			);

			if verdict != Verdict::Authorized {
				return Outcome::Forbidden(self.forbidden(request, item.resource, &item.scope));
			}
		}

		debug!(items = closure.len(), "request authorized");
		Outcome::Authorized
	}

	/// [`Self::evaluate`], as a `Result`.
	pub fn authorize(&self, request: &AuthorizationRequest) -> crate::error::Result<()> {
		self.evaluate(request).into_result()
	}

	/// Plans a read of `resource` through `action` for `principal`.
	pub fn read_plan(
		&self,
		resource: &str,
		action: &str,
		principal: &Principal,
	) -> Result<ReadPlan, EvaluationError> {
		let action = self.read_action(resource, action)?;
		if !self.settings.strict_filters {
			return Ok(ReadPlan::unfiltered());
		}
		Ok(strict::compile(&action.authorization, principal))
	}

	/// Keeps the records `principal` may read through `action`.
	///
	/// Each record is evaluated as the existing record of a read request.
	pub fn filter_readable(
		&self,
		resource: &str,
		action: &str,
		principal: &Principal,
		records: Vec<Record>,
	) -> Result<Vec<Record>, EvaluationError> {
		let definition = self.read_action(resource, action)?;
		let steps = &definition.authorization;
		if !steps.is_enforced() {
			return Ok(records);
		}

		let mut request = AuthorizationRequest::new(
			resource,
			ActionRef::new(definition.name.clone(), ActionKind::Read),
			principal.clone(),
		);
		let mut readable = Vec::with_capacity(records.len());
		for record in records {
			request.existing = Some(record);
			let verdict = steps.decide(&CheckContext::new(&request));
			if let (Verdict::Authorized, Some(record)) = (verdict, request.existing.take()) {
				readable.push(record);
			}
		}
		Ok(readable)
	}

	fn read_action(&self, resource: &str, action: &str) -> Result<&ActionDefinition, EvaluationError> {
		let definition = self
			.registry
			.resource(resource)
			.ok_or_else(|| EvaluationError::UnknownResource(resource.to_string()))?;
		let action_def =
			definition
				.get_action(action)
				.ok_or_else(|| EvaluationError::UnknownAction {
					resource: resource.to_string(),
					action: action.to_string(),
				})?;
		if action_def.kind != ActionKind::Read {
			return Err(EvaluationError::ActionKindMismatch {
				resource: resource.to_string(),
				action: action.to_string(),
				actual: action_def.kind,
				requested: ActionKind::Read,
			});
		}
		Ok(action_def)
	}

	fn forbidden(
		&self,
		request: &AuthorizationRequest,
		resource: &str,
		scope: &crate::scope::Scope,
	) -> ForbiddenError {
		match self.settings.disclosure {
			Disclosure::Detailed => ForbiddenError {
				resource: resource.to_string(),
				scope: Some(scope.clone()),
			},
			Disclosure::Opaque => ForbiddenError {
				resource: request.resource.clone(),
				scope: None,
			},
		}
	}
}
