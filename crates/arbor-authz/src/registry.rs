// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The validated resource registry.
//!
//! A [`Registry`] is built once at startup and is read-only afterwards. Every
//! definition is validated as a whole when [`RegistryBuilder::build`] runs, so
//! cross-resource references (relationship destinations, reverse
//! relationships) can be checked against the complete set of resources.

use std::collections::{HashMap, HashSet};

use arbor_authz_core::{ActionKind, Check, StepList};
use tracing::{debug, info};

use crate::definition::{RelationshipKind, ResourceDefinition};
use crate::error::ConfigurationError;
use crate::scope::Scope;

/// All registered resources, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
	resources: HashMap<String, ResourceDefinition>,
}

impl Registry {
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::default()
	}

	pub fn resource(&self, name: &str) -> Option<&ResourceDefinition> {
		self.resources.get(name)
	}

	pub fn resources(&self) -> impl Iterator<Item = &ResourceDefinition> {
		self.resources.values()
	}

	pub fn len(&self) -> usize {
		self.resources.len()
	}

	pub fn is_empty(&self) -> bool {
		self.resources.is_empty()
	}
}

/// Collects resource definitions and validates them together.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
	definitions: Vec<ResourceDefinition>,
}

impl RegistryBuilder {
	/// Builder: register a resource.
	pub fn resource(mut self, definition: ResourceDefinition) -> Self {
		self.definitions.push(definition);
		self
	}

	/// Validates every definition and freezes the registry.
	pub fn build(self) -> Result<Registry, ConfigurationError> {
		let mut resources = HashMap::with_capacity(self.definitions.len());
		for definition in self.definitions {
			if resources.contains_key(&definition.name) {
				return Err(ConfigurationError::DuplicateResource(definition.name));
			}
			resources.insert(definition.name.clone(), definition);
		}

		let registry = Registry { resources };
		for resource in registry.resources() {
			validate_resource(&registry, resource)?;
		}

		info!(resources = registry.len(), "resource registry built");
		Ok(registry)
	}
}

fn validate_resource(
	registry: &Registry,
	resource: &ResourceDefinition,
) -> Result<(), ConfigurationError> {
	debug!(resource = %resource.name, "validating resource definition");

	validate_names(resource)?;
	validate_primary_actions(resource)?;

	for relationship in &resource.relationships {
		let Some(destination) = registry.resource(&relationship.destination) else {
			return Err(ConfigurationError::UnknownDestination {
				resource: resource.name.clone(),
				relationship: relationship.name.clone(),
				destination: relationship.destination.clone(),
			});
		};

		if let Some(reverse) = &relationship.reverse {
			if relationship.kind == RelationshipKind::HasMany {
				return Err(ConfigurationError::ReverseNotSupported {
					resource: resource.name.clone(),
					relationship: relationship.name.clone(),
				});
			}
			let Some(reverse_def) = destination.get_relationship(reverse) else {
				return Err(ConfigurationError::UnknownReverseRelationship {
					resource: resource.name.clone(),
					relationship: relationship.name.clone(),
					reverse: reverse.clone(),
				});
			};
			if reverse_def.destination != resource.name
				|| !relationship.kind.pairs_with(reverse_def.kind)
			{
				return Err(ConfigurationError::MismatchedReverse {
					resource: resource.name.clone(),
					relationship: relationship.name.clone(),
					reverse: reverse.clone(),
				});
			}
		}

		validate_steps(
			resource,
			&Scope::Relationship(relationship.name.clone()),
			&relationship.authorization,
		)?;
	}

	for action in &resource.actions {
		validate_steps(resource, &Scope::Action(action.name.clone()), &action.authorization)?;
	}

	for attribute in &resource.attributes {
		validate_steps(
			resource,
			&Scope::Attribute(attribute.name.clone()),
			&attribute.authorization,
		)?;
	}

	Ok(())
}

/// Attributes and relationships share one namespace per resource.
fn validate_names(resource: &ResourceDefinition) -> Result<(), ConfigurationError> {
	let mut actions = HashSet::new();
	for action in &resource.actions {
		if !actions.insert(action.name.as_str()) {
			return Err(ConfigurationError::DuplicateAction {
				resource: resource.name.clone(),
				action: action.name.clone(),
			});
		}
	}

	let mut fields = HashSet::new();
	let names = resource
		.attributes
		.iter()
		.map(|a| a.name.as_str())
		.chain(resource.relationships.iter().map(|r| r.name.as_str()));
	for name in names {
		if !fields.insert(name) {
			return Err(ConfigurationError::DuplicateField {
				resource: resource.name.clone(),
				field: name.to_string(),
			});
		}
	}

	Ok(())
}

fn validate_primary_actions(resource: &ResourceDefinition) -> Result<(), ConfigurationError> {
	for &kind in ActionKind::all() {
		let of_kind: Vec<_> = resource.actions.iter().filter(|a| a.kind == kind).collect();
		let primaries = of_kind.iter().filter(|a| a.primary).count();

		if primaries > 1 {
			return Err(ConfigurationError::MultiplePrimaryActions {
				resource: resource.name.clone(),
				kind,
			});
		}
		if of_kind.len() > 1 && primaries == 0 {
			return Err(ConfigurationError::MissingPrimaryAction {
				resource: resource.name.clone(),
				kind,
			});
		}
	}
	Ok(())
}

fn validate_steps(
	resource: &ResourceDefinition,
	scope: &Scope,
	steps: &StepList,
) -> Result<(), ConfigurationError> {
	if matches!(steps, StepList::Declared(list) if list.is_empty()) {
		return Err(ConfigurationError::EmptyStepList {
			resource: resource.name.clone(),
			scope: scope.clone(),
		});
	}

	for step in steps.steps() {
		validate_check(resource, scope, &step.check)?;
	}
	Ok(())
}

fn validate_check(
	resource: &ResourceDefinition,
	scope: &Scope,
	check: &Check,
) -> Result<(), ConfigurationError> {
	if matches!(check, Check::RelatingToActor) && !scope.is_relationship() {
		return Err(ConfigurationError::RelatingToActorOutsideRelationship {
			resource: resource.name.clone(),
			scope: scope.clone(),
		});
	}

	if let Some(attribute) = check.referenced_attribute() {
		if !resource.has_stored_field(attribute) {
			return Err(ConfigurationError::UnknownAttribute {
				resource: resource.name.clone(),
				scope: scope.clone(),
				attribute: attribute.to_string(),
			});
		}
	}

	if let Some(relationship) = check.referenced_relationship() {
		if resource.get_relationship(relationship).is_none() {
			return Err(ConfigurationError::UnknownRelationship {
				resource: resource.name.clone(),
				scope: scope.clone(),
				relationship: relationship.to_string(),
			});
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::definition::{ActionDefinition, AttributeDefinition, RelationshipDefinition};
	use arbor_authz_core::Step;

	fn user() -> ResourceDefinition {
		ResourceDefinition::new("user")
			.attribute(AttributeDefinition::new("name"))
			.relationship(RelationshipDefinition::has_many("drafts", "draft", "author_id"))
			.action(ActionDefinition::read("read"))
	}

	fn draft() -> ResourceDefinition {
		ResourceDefinition::new("draft")
			.attribute(AttributeDefinition::new("title"))
			.relationship(RelationshipDefinition::belongs_to("author", "user").with_reverse("drafts"))
			.action(ActionDefinition::create("create"))
	}

	mod valid {
		use super::*;

		#[test]
		fn builds_and_looks_up() {
			let registry = Registry::builder().resource(user()).resource(draft()).build().unwrap();
			assert_eq!(registry.len(), 2);
			assert!(registry.resource("draft").is_some());
			assert!(registry.resource("ghost").is_none());
		}

		#[test]
		fn empty_registry_is_valid() {
			assert!(Registry::builder().build().unwrap().is_empty());
		}

		#[test]
		fn checks_may_reference_link_fields() {
			let draft = draft().action(
				ActionDefinition::read("read").with_authorization(StepList::declared([
					Step::authorize_if(Check::attribute("author_id", "x")),
				])),
			);
			assert!(Registry::builder().resource(user()).resource(draft).build().is_ok());
		}
	}

	mod names {
		use super::*;

		#[test]
		fn duplicate_resource() {
			let err = Registry::builder().resource(user()).resource(user()).build().unwrap_err();
			assert_eq!(err, ConfigurationError::DuplicateResource("user".into()));
		}

		#[test]
		fn duplicate_action() {
			let draft = draft().action(ActionDefinition::create("create"));
			let err = Registry::builder().resource(user()).resource(draft).build().unwrap_err();
			assert!(matches!(err, ConfigurationError::DuplicateAction { .. }));
		}

		#[test]
		fn attribute_relationship_collision() {
			let draft = draft().attribute(AttributeDefinition::new("author"));
			let err = Registry::builder().resource(user()).resource(draft).build().unwrap_err();
			assert_eq!(
				err,
				ConfigurationError::DuplicateField {
					resource: "draft".into(),
					field: "author".into(),
				}
			);
		}

		#[test]
		fn several_actions_of_a_kind_need_one_primary() {
			let none = draft().action(ActionDefinition::create("import"));
			let err = Registry::builder().resource(user()).resource(none).build().unwrap_err();
			assert!(matches!(
				err,
				ConfigurationError::MissingPrimaryAction { kind: ActionKind::Create, .. }
			));

			let one = ResourceDefinition::new("draft")
				.action(ActionDefinition::create("create").primary())
				.action(ActionDefinition::create("import"));
			assert!(Registry::builder().resource(one).build().is_ok());

			let two = ResourceDefinition::new("draft")
				.action(ActionDefinition::create("create").primary())
				.action(ActionDefinition::create("import").primary());
			let err = Registry::builder().resource(two).build().unwrap_err();
			assert!(matches!(err, ConfigurationError::MultiplePrimaryActions { .. }));
		}
	}

	mod relationships {
		use super::*;

		#[test]
		fn unknown_destination() {
			let err = Registry::builder().resource(draft()).build().unwrap_err();
			assert_eq!(
				err,
				ConfigurationError::UnknownDestination {
					resource: "draft".into(),
					relationship: "author".into(),
					destination: "user".into(),
				}
			);
		}

		#[test]
		fn unknown_reverse() {
			let draft = ResourceDefinition::new("draft")
				.relationship(RelationshipDefinition::belongs_to("author", "user").with_reverse("posts"));
			let err = Registry::builder().resource(user()).resource(draft).build().unwrap_err();
			assert!(matches!(err, ConfigurationError::UnknownReverseRelationship { .. }));
		}

		#[test]
		fn reverse_must_point_back() {
			let user = user().relationship(RelationshipDefinition::has_one("avatar", "image", "owner_id"));
			let image = ResourceDefinition::new("image");
			let draft = ResourceDefinition::new("draft")
				.relationship(RelationshipDefinition::belongs_to("author", "user").with_reverse("avatar"));
			let err = Registry::builder()
				.resource(user)
				.resource(image)
				.resource(draft)
				.build()
				.unwrap_err();
			assert_eq!(
				err,
				ConfigurationError::MismatchedReverse {
					resource: "draft".into(),
					relationship: "author".into(),
					reverse: "avatar".into(),
				}
			);
		}

		#[test]
		fn reverse_kinds_must_pair() {
			let user = ResourceDefinition::new("user").relationship(
				RelationshipDefinition::has_one("profile", "profile", "user_id").with_reverse("users"),
			);
			let profile = ResourceDefinition::new("profile")
				.relationship(RelationshipDefinition::has_many("users", "user", "profile_id"));
			let err = Registry::builder().resource(user).resource(profile).build().unwrap_err();
			assert!(matches!(
				err,
				ConfigurationError::MismatchedReverse { ref relationship, .. } if relationship == "profile"
			));
		}

		#[test]
		fn has_one_pairs_with_belongs_to() {
			let user = user().relationship(
				RelationshipDefinition::has_one("avatar", "image", "owner_id").with_reverse("owner"),
			);
			let image = ResourceDefinition::new("image")
				.relationship(RelationshipDefinition::belongs_to("owner", "user").with_reverse("avatar"));
			assert!(Registry::builder()
				.resource(user)
				.resource(draft())
				.resource(image)
				.build()
				.is_ok());
		}

		#[test]
		fn has_many_cannot_name_a_reverse() {
			let user = ResourceDefinition::new("user").relationship(
				RelationshipDefinition::has_many("drafts", "draft", "author_id").with_reverse("author"),
			);
			let err = Registry::builder().resource(user).resource(draft()).build().unwrap_err();
			assert!(matches!(err, ConfigurationError::ReverseNotSupported { .. }));
		}
	}

	mod step_lists {
		use super::*;

		#[test]
		fn empty_declared_list() {
			let draft = draft().attribute(
				AttributeDefinition::new("state").with_authorization(StepList::Declared(vec![])),
			);
			let err = Registry::builder().resource(user()).resource(draft).build().unwrap_err();
			assert_eq!(
				err,
				ConfigurationError::EmptyStepList {
					resource: "draft".into(),
					scope: Scope::Attribute("state".into()),
				}
			);
		}

		#[test]
		fn relating_to_actor_needs_a_relationship_scope() {
			let draft = draft().action(
				ActionDefinition::destroy("destroy")
					.with_authorization(StepList::declared([Step::authorize_if(Check::RelatingToActor)])),
			);
			let err = Registry::builder().resource(user()).resource(draft).build().unwrap_err();
			assert_eq!(
				err,
				ConfigurationError::RelatingToActorOutsideRelationship {
					resource: "draft".into(),
					scope: Scope::Action("destroy".into()),
				}
			);
		}

		#[test]
		fn unknown_attribute_reference() {
			let draft = draft().action(ActionDefinition::update("update").with_authorization(
				StepList::declared([Step::forbid_if(Check::setting_attribute("colour", "red"))]),
			));
			let err = Registry::builder().resource(user()).resource(draft).build().unwrap_err();
			assert!(matches!(
				err,
				ConfigurationError::UnknownAttribute { ref attribute, .. } if attribute == "colour"
			));
		}

		#[test]
		fn unknown_relationship_reference() {
			let draft = draft().action(ActionDefinition::update("update").with_authorization(
				StepList::declared([Step::forbid_if(Check::setting_relationship("editor"))]),
			));
			let err = Registry::builder().resource(user()).resource(draft).build().unwrap_err();
			assert!(matches!(
				err,
				ConfigurationError::UnknownRelationship { ref relationship, .. } if relationship == "editor"
			));
		}
	}
}
