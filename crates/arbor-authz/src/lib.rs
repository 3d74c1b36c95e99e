// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource registry and cross-resource authorization for Arbor.
//!
//! Resources declare actions, attributes and relationships, each with an
//! optional step list. The [`Authorizer`] evaluates one request against every
//! step list the request touches, including the destination side of
//! relationship writes, and yields a single [`Outcome`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arbor_authz::{
//!     ActionDefinition, Authorizer, Outcome, Registry, RelationshipDefinition, ResourceDefinition,
//! };
//! use arbor_authz_core::{
//!     ActionKind, ActionRef, AuthorizationRequest, ChangeSet, Check, Principal, RecordId,
//!     RelationshipWrite, Step, StepList,
//! };
//!
//! let registry = Registry::builder()
//!     .resource(ResourceDefinition::new("user"))
//!     .resource(
//!         ResourceDefinition::new("draft")
//!             .relationship(
//!                 RelationshipDefinition::belongs_to("author", "user").with_authorization(
//!                     StepList::declared([Step::authorize_if(Check::RelatingToActor)]),
//!                 ),
//!             )
//!             .action(ActionDefinition::create("create")),
//!     )
//!     .build()
//!     .unwrap();
//! let authorizer = Authorizer::new(Arc::new(registry));
//!
//! let me = Principal::new(RecordId::generate());
//! let request = AuthorizationRequest::new("draft", ActionRef::new("create", ActionKind::Create), me.clone())
//!     .with_change(ChangeSet::new().relate("author", RelationshipWrite::to(me.id)));
//!
//! assert_eq!(authorizer.evaluate(&request), Outcome::Authorized);
//! ```

pub mod audit;
pub mod authorizer;
pub mod closure;
pub mod definition;
pub mod error;
pub mod registry;
pub mod scope;
pub mod strict;

pub use audit::{Decision, DecisionRecord};
pub use authorizer::{Authorizer, AuthorizerSettings, Disclosure, Outcome};
pub use closure::{Closure, ClosureItem, Subject};
pub use definition::{
	ActionDefinition, AttributeDefinition, RelationshipDefinition, RelationshipKind,
	ResourceDefinition,
};
pub use error::{AuthzError, ConfigurationError, EvaluationError, ForbiddenError, Result};
pub use registry::{Registry, RegistryBuilder};
pub use scope::Scope;
pub use strict::{is_strict, to_filter_predicate, ReadPlan};
