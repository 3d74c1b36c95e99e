// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization closures.
//!
//! One request may touch several resources: writing a `belongs_to`
//! relationship also changes what the destination record is related to. The
//! closure lists every `(resource, scope)` pair whose step list must
//! authorize the request, in evaluation order:
//!
//! 1. the action,
//! 2. each attribute set by the change,
//! 3. each relationship written by the change, followed by the destination's
//!    reverse relationship when one is declared.
//!
//! Only enforced step lists produce items; undeclared and exempt lists always
//! authorize. Name lookups and record requirements are checked while the
//! closure is built, so evaluation itself cannot fail.

use arbor_authz_core::{ActionKind, AuthorizationRequest, CheckContext, RecordId, StepList};

use crate::definition::ResourceDefinition;
use crate::error::EvaluationError;
use crate::registry::Registry;
use crate::scope::Scope;

/// Which request an item is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
	/// The caller's request.
	Primary,
	/// A request derived for the far side of a relationship write.
	Derived(usize),
}

/// One step list that must authorize the request.
#[derive(Debug, Clone)]
pub struct ClosureItem<'a> {
	pub resource: &'a str,
	pub scope: Scope,
	pub steps: &'a StepList,
	pub subject: Subject,
	/// Target of the relationship write, for relationship scopes.
	pub related_id: Option<RecordId>,
}

#[derive(Debug)]
pub struct Closure<'a> {
	request: &'a AuthorizationRequest,
	derived: Vec<AuthorizationRequest>,
	items: Vec<ClosureItem<'a>>,
}

impl<'a> Closure<'a> {
	/// Expands `request` against the registry.
	pub fn build(
		registry: &'a Registry,
		request: &'a AuthorizationRequest,
	) -> Result<Self, EvaluationError> {
		let resource = registry
			.resource(&request.resource)
			.ok_or_else(|| EvaluationError::UnknownResource(request.resource.clone()))?;

		let mut closure = Closure {
			request,
			derived: Vec::new(),
			items: Vec::new(),
		};

		let action = resource.get_action(&request.action.name).ok_or_else(|| {
			EvaluationError::UnknownAction {
				resource: resource.name.clone(),
				action: request.action.name.clone(),
			}
		})?;
		if action.kind != request.action.kind {
			return Err(EvaluationError::ActionKindMismatch {
				resource: resource.name.clone(),
				action: action.name.clone(),
				actual: action.kind,
				requested: request.action.kind,
			});
		}
		closure.push_primary(
			resource,
			Scope::Action(action.name.clone()),
			&action.authorization,
			None,
		)?;

		for name in request.change.attributes.keys() {
			let attribute =
				resource
					.get_attribute(name)
					.ok_or_else(|| EvaluationError::UnknownAttribute {
						resource: resource.name.clone(),
						attribute: name.clone(),
					})?;
			closure.push_primary(
				resource,
				Scope::Attribute(attribute.name.clone()),
				&attribute.authorization,
				None,
			)?;
		}

		for (name, write) in &request.change.relationships {
			let relationship = resource.get_relationship(name).ok_or_else(|| {
				EvaluationError::UnknownRelationship {
					resource: resource.name.clone(),
					relationship: name.clone(),
				}
			})?;
			closure.push_primary(
				resource,
				Scope::Relationship(relationship.name.clone()),
				&relationship.authorization,
				write.target_id,
			)?;

			let Some(reverse) = &relationship.reverse else {
				continue;
			};
			if !relationship.kind.has_reverse_side() || write.target_id.is_none() {
				continue;
			}

			let destination = registry
				.resource(&relationship.destination)
				.ok_or_else(|| EvaluationError::UnknownResource(relationship.destination.clone()))?;
			let reverse_def = destination.get_relationship(reverse).ok_or_else(|| {
				EvaluationError::UnknownRelationship {
					resource: destination.name.clone(),
					relationship: reverse.clone(),
				}
			})?;
			if !reverse_def.authorization.is_enforced() {
				continue;
			}
			if write.target_record.is_none() && needs_record(&reverse_def.authorization) {
				return Err(EvaluationError::MissingRelatedRecord {
					resource: resource.name.clone(),
					relationship: relationship.name.clone(),
				});
			}

			closure.derived.push(request.scoped_to_related(
				&destination.name,
				reverse,
				write,
			));
			closure.items.push(ClosureItem {
				resource: &destination.name,
				scope: Scope::Reverse(reverse_def.name.clone()),
				steps: &reverse_def.authorization,
				subject: Subject::Derived(closure.derived.len() - 1),
				related_id: write.target_id,
			});
		}

		Ok(closure)
	}

	fn push_primary(
		&mut self,
		resource: &'a ResourceDefinition,
		scope: Scope,
		steps: &'a StepList,
		related_id: Option<RecordId>,
	) -> Result<(), EvaluationError> {
		if !steps.is_enforced() {
			return Ok(());
		}
		if self.request.existing.is_none()
			&& self.request.action.kind != ActionKind::Create
			&& needs_record(steps)
		{
			return Err(EvaluationError::MissingRecord {
				resource: resource.name.clone(),
				scope,
			});
		}
		self.items.push(ClosureItem {
			resource: &resource.name,
			scope,
			steps,
			subject: Subject::Primary,
			related_id,
		});
		Ok(())
	}

	pub fn request(&self) -> &AuthorizationRequest {
		self.request
	}

	pub fn items(&self) -> &[ClosureItem<'a>] {
		&self.items
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// The check context an item is evaluated in.
	pub fn context<'s>(&'s self, item: &'s ClosureItem<'a>) -> CheckContext<'s> {
		let request = match item.subject {
			Subject::Primary => self.request,
			Subject::Derived(index) => &self.derived[index],
		};
		if item.scope.is_relationship() {
			CheckContext::relationship(request, item.related_id.as_ref())
		} else {
			CheckContext::new(request)
		}
	}
}

fn needs_record(steps: &StepList) -> bool {
	steps.steps().iter().any(|step| step.check.requires_record())
}
