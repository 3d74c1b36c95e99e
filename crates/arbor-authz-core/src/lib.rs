// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Arbor resource authorization.
//!
//! This crate holds the pure, storage-free half of the engine:
//! - [`Check`]: the closed set of authorization predicates
//! - [`Step`] / [`StepList`]: ordered `authorize_if` / `forbid_if` /
//!   `forbid_unless` / `authorize_unless` rules
//! - [`AuthorizationRequest`]: one attempted operation
//! - [`evaluate_steps`]: first-decisive-step evaluation
//! - [`Predicate`]: record filters produced from strict checks
//!
//! The cross-resource authorizer and the resource registry live in
//! `arbor-authz`.
//!
//! # Example
//!
//! ```
//! use arbor_authz_core::{
//!     ActionKind, ActionRef, AuthorizationRequest, Check, CheckContext, Principal, RecordId,
//!     Step, StepList, Verdict,
//! };
//!
//! let steps = StepList::declared([
//!     Step::authorize_if(Check::user_attribute("admin", true)),
//!     Step::authorize_if(Check::user_attribute("manager", true)),
//! ]);
//!
//! let principal = Principal::new(RecordId::generate()).with_attribute("manager", true);
//! let request = AuthorizationRequest::new(
//!     "post",
//!     ActionRef::new("create", ActionKind::Create),
//!     principal,
//! );
//!
//! assert_eq!(steps.decide(&CheckContext::new(&request)), Verdict::Authorized);
//! ```

pub mod check;
pub mod evaluator;
pub mod predicate;
pub mod request;
pub mod step;
pub mod types;

pub use check::{Check, CheckContext};
pub use evaluator::evaluate_steps;
pub use predicate::Predicate;
pub use request::{ActionRef, AuthorizationRequest, ChangeSet, RelationshipWrite};
pub use step::{Step, StepKind, StepList, Verdict};
pub use types::{ActionKind, Attributes, Principal, Record, RecordId};
