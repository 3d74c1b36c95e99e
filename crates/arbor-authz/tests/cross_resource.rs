// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization across relationship writes.

use std::sync::Arc;

use arbor_authz::{
	ActionDefinition, AttributeDefinition, Authorizer, AuthorizerSettings, Closure, Disclosure,
	EvaluationError, ForbiddenError, Outcome, Registry, RelationshipDefinition, ResourceDefinition,
	Scope,
};
use arbor_authz_core::{
	ActionKind, ActionRef, AuthorizationRequest, ChangeSet, Check, Principal, Record, RecordId,
	RelationshipWrite, Step, StepList,
};
use proptest::prelude::*;

/// `draft.author` belongs to a user; the user side (`user.drafts`) only
/// accepts drafts while `accepting_drafts` is set. A user's avatar is an
/// image whose owner side refuses while the image is locked.
fn registry() -> Arc<Registry> {
	let user = ResourceDefinition::new("user")
		.attribute(AttributeDefinition::new("accepting_drafts"))
		.relationship(
			RelationshipDefinition::has_many("drafts", "draft", "author_id").with_authorization(
				StepList::declared([Step::authorize_if(Check::attribute("accepting_drafts", true))]),
			),
		)
		.relationship(RelationshipDefinition::has_one("profile", "profile", "user_id"))
		.relationship(
			RelationshipDefinition::has_one("avatar", "image", "owner_id").with_reverse("owner"),
		)
		.action(ActionDefinition::read("read"))
		.action(ActionDefinition::update("update"));

	let image = ResourceDefinition::new("image")
		.attribute(AttributeDefinition::new("locked"))
		.relationship(RelationshipDefinition::belongs_to("owner", "user").with_authorization(
			StepList::declared([Step::authorize_if(Check::attribute("locked", false))]),
		));

	let draft = ResourceDefinition::new("draft")
		.attribute(AttributeDefinition::new("title"))
		.relationship(
			RelationshipDefinition::belongs_to("author", "user")
				.with_reverse("drafts")
				.with_authorization(StepList::declared([Step::authorize_if(Check::RelatingToActor)])),
		)
		.action(ActionDefinition::create("create").with_authorization(StepList::declared([
			Step::authorize_if(Check::user_attribute("writer", true)),
		])))
		.action(ActionDefinition::update("update"));

	let profile = ResourceDefinition::new("profile")
		.relationship(
			RelationshipDefinition::belongs_to("user", "user")
				.with_reverse("profile")
				.with_authorization(StepList::NotRequired),
		)
		.action(ActionDefinition::create("create"));

	Arc::new(
		Registry::builder()
			.resource(user)
			.resource(draft)
			.resource(profile)
			.resource(image)
			.build()
			.unwrap(),
	)
}

fn writer() -> Principal {
	Principal::new(RecordId::generate()).with_attribute("writer", true)
}

fn user_record(id: RecordId, accepting: bool) -> Record {
	Record::new(id).with_attribute("accepting_drafts", accepting)
}

fn create_draft(principal: Principal, author: RelationshipWrite) -> AuthorizationRequest {
	AuthorizationRequest::new("draft", ActionRef::new("create", ActionKind::Create), principal)
		.with_change(ChangeSet::new().set("title", "hello").relate("author", author))
}

mod belongs_to {
	use super::*;

	#[test]
	fn authorized_when_both_sides_agree() {
		let authorizer = Authorizer::new(registry());
		let me = writer();
		let write = RelationshipWrite::to(me.id).with_record(user_record(me.id, true));
		assert_eq!(authorizer.evaluate(&create_draft(me, write)), Outcome::Authorized);
	}

	#[test]
	fn relating_to_someone_else_is_forbidden() {
		let authorizer = Authorizer::new(registry());
		let other = RecordId::generate();
		let write = RelationshipWrite::to(other).with_record(user_record(other, true));
		assert_eq!(
			authorizer.evaluate(&create_draft(writer(), write)),
			Outcome::Forbidden(ForbiddenError {
				resource: "draft".into(),
				scope: Some(Scope::Relationship("author".into())),
			})
		);
	}

	#[test]
	fn destination_side_can_refuse() {
		let authorizer = Authorizer::new(registry());
		let me = writer();
		let write = RelationshipWrite::to(me.id).with_record(user_record(me.id, false));
		assert_eq!(
			authorizer.evaluate(&create_draft(me, write)),
			Outcome::Forbidden(ForbiddenError {
				resource: "user".into(),
				scope: Some(Scope::Reverse("drafts".into())),
			})
		);
	}

	#[test]
	fn destination_record_must_be_loaded() {
		let authorizer = Authorizer::new(registry());
		let me = writer();
		let write = RelationshipWrite::to(me.id);
		assert_eq!(
			authorizer.evaluate(&create_draft(me, write)),
			Outcome::Error(EvaluationError::MissingRelatedRecord {
				resource: "draft".into(),
				relationship: "author".into(),
			})
		);
	}

	#[test]
	fn clearing_skips_the_destination_side() {
		let authorizer = Authorizer::new(registry());
		let request = AuthorizationRequest::new(
			"draft",
			ActionRef::new("update", ActionKind::Update),
			writer(),
		)
		.with_existing(Record::new(RecordId::generate()))
		.with_change(ChangeSet::new().relate("author", RelationshipWrite::clear()));

		let registry = registry();
		let closure = Closure::build(&registry, &request).unwrap();
		assert_eq!(closure.len(), 1);
		assert_eq!(closure.items()[0].scope, Scope::Relationship("author".into()));

		// Clearing relates to nobody, so relating_to_actor cannot match.
		assert!(authorizer.evaluate(&request).is_forbidden());
	}

	#[test]
	fn undeclared_reverse_side_adds_nothing() {
		let registry = registry();
		let request = AuthorizationRequest::new(
			"profile",
			ActionRef::new("create", ActionKind::Create),
			writer(),
		)
		.with_change(ChangeSet::new().relate("user", RelationshipWrite::to(RecordId::generate())));
		let closure = Closure::build(&registry, &request).unwrap();
		assert!(closure.is_empty());
		assert!(Authorizer::new(registry.clone()).evaluate(&request).is_authorized());
	}
}

mod has_one {
	use super::*;

	fn image_record(id: RecordId, locked: bool) -> Record {
		Record::new(id).with_attribute("locked", locked)
	}

	fn set_avatar(user_id: RecordId, avatar: RelationshipWrite) -> AuthorizationRequest {
		AuthorizationRequest::new("user", ActionRef::new("update", ActionKind::Update), writer())
			.with_existing(Record::new(user_id))
			.with_change(ChangeSet::new().relate("avatar", avatar))
	}

	#[test]
	fn destination_side_is_evaluated_from_the_image() {
		let registry = registry();
		let user_id = RecordId::generate();
		let image_id = RecordId::generate();
		let request =
			set_avatar(user_id, RelationshipWrite::to(image_id).with_record(image_record(image_id, false)));

		let closure = Closure::build(&registry, &request).unwrap();
		assert_eq!(closure.len(), 1);
		let item = &closure.items()[0];
		assert_eq!(item.resource, "image");
		assert_eq!(item.scope, Scope::Reverse("owner".into()));

		let ctx = closure.context(item);
		assert_eq!(ctx.request.resource, "image");
		assert_eq!(ctx.request.existing.as_ref().map(|r| r.id), Some(image_id));
		assert_eq!(
			ctx.request.change.relationship("owner").and_then(|w| w.target_id),
			Some(user_id)
		);

		assert!(Authorizer::new(registry.clone()).evaluate(&request).is_authorized());
	}

	#[test]
	fn locked_image_refuses_the_write() {
		let authorizer = Authorizer::new(registry());
		let image_id = RecordId::generate();
		let request = set_avatar(
			RecordId::generate(),
			RelationshipWrite::to(image_id).with_record(image_record(image_id, true)),
		);
		assert_eq!(
			authorizer.evaluate(&request),
			Outcome::Forbidden(ForbiddenError {
				resource: "image".into(),
				scope: Some(Scope::Reverse("owner".into())),
			})
		);
	}

	#[test]
	fn image_record_must_be_loaded() {
		let authorizer = Authorizer::new(registry());
		let request = set_avatar(RecordId::generate(), RelationshipWrite::to(RecordId::generate()));
		assert_eq!(
			authorizer.evaluate(&request),
			Outcome::Error(EvaluationError::MissingRelatedRecord {
				resource: "user".into(),
				relationship: "avatar".into(),
			})
		);
	}

	#[test]
	fn clearing_the_avatar_skips_the_image() {
		let authorizer = Authorizer::new(registry());
		let request = set_avatar(RecordId::generate(), RelationshipWrite::clear());
		assert!(authorizer.evaluate(&request).is_authorized());
	}
}

mod aggregation {
	use super::*;

	#[test]
	fn closure_order_is_action_attributes_relationships() {
		let registry = registry();
		let me = writer();
		let write = RelationshipWrite::to(me.id).with_record(user_record(me.id, true));
		let request = create_draft(me, write);
		let closure = Closure::build(&registry, &request).unwrap();

		let scopes: Vec<_> = closure.items().iter().map(|i| i.scope.clone()).collect();
		assert_eq!(
			scopes,
			vec![
				Scope::Action("create".into()),
				Scope::Relationship("author".into()),
				Scope::Reverse("drafts".into()),
			]
		);
	}

	#[test]
	fn first_forbidden_item_is_reported() {
		let authorizer = Authorizer::new(registry());
		let stranger = Principal::new(RecordId::generate());
		let other = RecordId::generate();
		let write = RelationshipWrite::to(other).with_record(user_record(other, false));

		// Action, relationship and reverse side all deny; only the first is reported.
		assert_eq!(
			authorizer.evaluate(&create_draft(stranger, write)),
			Outcome::Forbidden(ForbiddenError {
				resource: "draft".into(),
				scope: Some(Scope::Action("create".into())),
			})
		);
	}

	#[test]
	fn opaque_disclosure_reports_requested_resource() {
		let settings = AuthorizerSettings {
			disclosure: Disclosure::Opaque,
			..Default::default()
		};
		let authorizer = Authorizer::with_settings(registry(), settings);
		let me = writer();
		let write = RelationshipWrite::to(me.id).with_record(user_record(me.id, false));
		assert_eq!(
			authorizer.evaluate(&create_draft(me, write)),
			Outcome::Forbidden(ForbiddenError {
				resource: "draft".into(),
				scope: None,
			})
		);
	}

	#[test]
	fn unknown_relationship_is_an_error() {
		let authorizer = Authorizer::new(registry());
		let request = AuthorizationRequest::new(
			"draft",
			ActionRef::new("create", ActionKind::Create),
			writer(),
		)
		.with_change(ChangeSet::new().relate("editor", RelationshipWrite::to(RecordId::generate())));
		assert!(matches!(
			authorizer.evaluate(&request),
			Outcome::Error(EvaluationError::UnknownRelationship { .. })
		));
	}
}

proptest! {
	#[test]
	fn evaluation_is_idempotent(
		is_writer in any::<bool>(),
		relate_to_self in any::<bool>(),
		accepting in any::<bool>(),
	) {
		let authorizer = Authorizer::new(registry());
		let principal = Principal::new(RecordId::generate()).with_attribute("writer", is_writer);
		let target = if relate_to_self { principal.id } else { RecordId::generate() };
		let write = RelationshipWrite::to(target).with_record(user_record(target, accepting));
		let request = create_draft(principal, write);

		let first = authorizer.evaluate(&request);
		prop_assert_eq!(&first, &authorizer.evaluate(&request));
		prop_assert_eq!(first.is_authorized(), is_writer && relate_to_self && accepting);
	}
}
