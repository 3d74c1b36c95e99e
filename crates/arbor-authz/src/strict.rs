// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Compiling read authorization into record filters.
//!
//! A read action's step list is folded from the back into one [`Predicate`].
//! Strict steps translate exactly:
//!
//! ```text
//! authorize_if p      ->  p  OR  rest
//! forbid_if p         ->  !p AND rest
//! forbid_unless p     ->  p  AND rest
//! authorize_unless p  ->  !p OR  rest
//! ```
//!
//! where the innermost `rest` is what an exhausted list resolves to. A step
//! whose check cannot be translated widens the filter instead, and the plan is
//! marked inexact: every fetched record must then be evaluated individually.
//! Either way the set of records returned to the caller is the same.

use arbor_authz_core::{Check, Predicate, Principal, StepKind, StepList, Verdict};
use serde::{Deserialize, Serialize};

/// How to fetch the records a principal may read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadPlan {
	/// Filter for the data layer. Never excludes a readable record.
	pub filter: Predicate,
	/// True if `filter` matches exactly the readable records.
	pub exact: bool,
}

impl ReadPlan {
	/// Fetch everything and evaluate each record.
	pub fn unfiltered() -> Self {
		Self {
			filter: Predicate::True,
			exact: false,
		}
	}

	pub fn needs_post_filter(&self) -> bool {
		!self.exact
	}

	/// Returns true if no record can be readable.
	pub fn is_empty(&self) -> bool {
		self.exact && self.filter == Predicate::False
	}
}

pub fn is_strict(check: &Check) -> bool {
	check.is_strict()
}

pub fn to_filter_predicate(check: &Check, principal: &Principal) -> Option<Predicate> {
	check.to_filter_predicate(principal)
}

/// Compiles a step list into a read plan for `principal`.
pub fn compile(steps: &StepList, principal: &Principal) -> ReadPlan {
	let tail = match steps.exhausted() {
		Verdict::Authorized => Predicate::True,
		_ => Predicate::False,
	};

	let mut exact = true;
	let filter = steps.steps().iter().rev().fold(tail, |rest, step| {
		match step.check.to_filter_predicate(principal) {
			Some(p) => match step.kind {
				StepKind::Authorize => p.or(rest),
				StepKind::Forbid => (!p).and(rest),
				StepKind::ForbidUnless => p.and(rest),
				StepKind::AuthorizeUnless => (!p).or(rest),
			},
			None => {
				exact = false;
				match step.kind {
					StepKind::Authorize | StepKind::AuthorizeUnless => Predicate::True,
					StepKind::Forbid | StepKind::ForbidUnless => rest,
				}
			}
		}
	});

	ReadPlan { filter, exact }
}

#[cfg(test)]
mod tests {
	use super::*;
	use arbor_authz_core::{
		ActionKind, ActionRef, AuthorizationRequest, CheckContext, Record, RecordId, Step,
	};
	use proptest::prelude::*;

	fn principal(admin: bool) -> Principal {
		Principal::new(RecordId::generate()).with_attribute("admin", admin)
	}

	mod compilation {
		use super::*;

		#[test]
		fn open_lists_read_everything() {
			let plan = compile(&StepList::Undeclared, &principal(false));
			assert_eq!(plan, ReadPlan { filter: Predicate::True, exact: true });
			assert!(!plan.needs_post_filter());
		}

		#[test]
		fn denied_lists_read_nothing() {
			let plan = compile(&StepList::Denied, &principal(true));
			assert!(plan.is_empty());
		}

		#[test]
		fn principal_checks_fold_to_constants() {
			let steps = StepList::declared([
				Step::authorize_if(Check::user_attribute("admin", true)),
				Step::authorize_if(Check::attribute("state", "published")),
			]);
			assert_eq!(compile(&steps, &principal(true)).filter, Predicate::True);
			assert_eq!(
				compile(&steps, &principal(false)).filter,
				Predicate::eq("state", "published")
			);
		}

		#[test]
		fn forbid_steps_negate() {
			let steps = StepList::declared([
				Step::forbid_if(Check::attribute("hidden", true)),
				Step::authorize_if(Check::AlwaysTrue),
			]);
			let plan = compile(&steps, &principal(false));
			assert_eq!(plan.filter, !Predicate::eq("hidden", true));
			assert!(plan.exact);
		}

		#[test]
		fn non_strict_authorize_widens_to_everything() {
			let steps = StepList::declared([
				Step::authorize_if(Check::setting_attribute("state", "x")),
				Step::authorize_if(Check::attribute("state", "published")),
			]);
			let plan = compile(&steps, &principal(false));
			assert_eq!(plan.filter, Predicate::True);
			assert!(plan.needs_post_filter());
		}

		#[test]
		fn non_strict_forbid_keeps_the_rest() {
			let steps = StepList::declared([
				Step::forbid_if(Check::setting_relationship("author")),
				Step::authorize_if(Check::attribute("state", "published")),
			]);
			let plan = compile(&steps, &principal(false));
			assert_eq!(plan.filter, Predicate::eq("state", "published"));
			assert!(!plan.exact);
		}

		#[test]
		fn strictness_helpers_delegate() {
			assert!(is_strict(&Check::AlwaysFalse));
			assert!(!is_strict(&Check::RelatingToActor));
			assert_eq!(
				to_filter_predicate(&Check::user_attribute("admin", true), &principal(true)),
				Some(Predicate::True)
			);
		}
	}

	fn arb_strict_check() -> impl Strategy<Value = Check> {
		prop_oneof![
			Just(Check::AlwaysTrue),
			Just(Check::AlwaysFalse),
			any::<bool>().prop_map(|v| Check::user_attribute("admin", v)),
			(0u8..3).prop_map(|v| Check::attribute("state", v)),
			any::<bool>().prop_map(|v| Check::attribute("hidden", v)),
		]
	}

	fn arb_step() -> impl Strategy<Value = Step> {
		(0u8..4, arb_strict_check()).prop_map(|(kind, check)| match kind {
			0 => Step::authorize_if(check),
			1 => Step::forbid_if(check),
			2 => Step::forbid_unless(check),
			_ => Step::authorize_unless(check),
		})
	}

	fn arb_step_list() -> impl Strategy<Value = StepList> {
		prop_oneof![
			Just(StepList::Undeclared),
			Just(StepList::NotRequired),
			Just(StepList::Denied),
			prop::collection::vec(arb_step(), 1..6).prop_map(StepList::Declared),
		]
	}

	fn arb_record() -> impl Strategy<Value = Record> {
		(prop::option::of(0u8..3), prop::option::of(any::<bool>())).prop_map(|(state, hidden)| {
			let mut record = Record::new(RecordId::generate());
			if let Some(state) = state {
				record.set("state", state.into());
			}
			if let Some(hidden) = hidden {
				record.set("hidden", hidden.into());
			}
			record
		})
	}

	proptest! {
		#[test]
		fn strict_filter_agrees_with_evaluation(
			steps in arb_step_list(),
			admin in any::<bool>(),
			record in arb_record(),
		) {
			let principal = principal(admin);
			let plan = compile(&steps, &principal);
			prop_assert!(plan.exact);

			let request = AuthorizationRequest::new(
				"draft",
				ActionRef::new("read", ActionKind::Read),
				principal,
			)
			.with_existing(record.clone());
			let verdict = steps.decide(&CheckContext::new(&request));

			prop_assert_eq!(plan.filter.matches(&record), verdict.is_authorized());
		}
	}
}
