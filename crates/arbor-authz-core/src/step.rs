// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization steps and step lists.
//!
//! A [`Step`] pairs a [`Check`] with a [`StepKind`] that decides what a match
//! (or a miss) means. A [`StepList`] is attached to an action, attribute or
//! relationship when the resource is defined and is read-only afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::check::Check;

/// How a check's result maps to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
	/// Authorized when the check matches.
	#[serde(rename = "authorize_if")]
	Authorize,
	/// Forbidden when the check matches.
	#[serde(rename = "forbid_if")]
	Forbid,
	/// Forbidden when the check does not match.
	#[serde(rename = "forbid_unless")]
	ForbidUnless,
	/// Authorized when the check does not match.
	#[serde(rename = "authorize_unless")]
	AuthorizeUnless,
}

impl fmt::Display for StepKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			StepKind::Authorize => "authorize_if",
			StepKind::Forbid => "forbid_if",
			StepKind::ForbidUnless => "forbid_unless",
			StepKind::AuthorizeUnless => "authorize_unless",
		};
		write!(f, "{s}")
	}
}

/// The outcome of evaluating steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
	Authorized,
	Forbidden,
	/// No step was decisive.
	Undecided,
}

impl Verdict {
	pub fn is_authorized(&self) -> bool {
		matches!(self, Verdict::Authorized)
	}

	pub fn is_forbidden(&self) -> bool {
		matches!(self, Verdict::Forbidden)
	}
}

/// One entry of a step list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
	pub kind: StepKind,
	pub check: Check,
}

impl Step {
	pub fn new(kind: StepKind, check: Check) -> Self {
		Self { kind, check }
	}

	pub fn authorize_if(check: Check) -> Self {
		Self::new(StepKind::Authorize, check)
	}

	pub fn forbid_if(check: Check) -> Self {
		Self::new(StepKind::Forbid, check)
	}

	pub fn forbid_unless(check: Check) -> Self {
		Self::new(StepKind::ForbidUnless, check)
	}

	pub fn authorize_unless(check: Check) -> Self {
		Self::new(StepKind::AuthorizeUnless, check)
	}

	/// The verdict this step produces for a check result, or `None` when
	/// evaluation continues with the next step.
	pub fn decide(&self, matched: bool) -> Option<Verdict> {
		match (self.kind, matched) {
			(StepKind::Authorize, true) => Some(Verdict::Authorized),
			(StepKind::Forbid, true) => Some(Verdict::Forbidden),
			(StepKind::ForbidUnless, false) => Some(Verdict::Forbidden),
			(StepKind::AuthorizeUnless, false) => Some(Verdict::Authorized),
			_ => None,
		}
	}
}

/// The authorization declared for one action, attribute or relationship.
///
/// Distinguishes "nothing declared" (open) from "explicitly exempt" and
/// "explicitly no access".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "steps", rename_all = "snake_case")]
pub enum StepList {
	/// No steps declared.
	#[default]
	Undeclared,
	/// Marked as needing no authorization.
	NotRequired,
	/// Declared as `false`: nothing is authorized.
	Denied,
	/// An ordered, non-empty list of steps.
	Declared(Vec<Step>),
}

impl StepList {
	pub fn declared(steps: impl IntoIterator<Item = Step>) -> Self {
		StepList::Declared(steps.into_iter().collect())
	}

	/// The declared steps, in evaluation order.
	pub fn steps(&self) -> &[Step] {
		match self {
			StepList::Declared(steps) => steps,
			_ => &[],
		}
	}

	/// Returns true if the list can ever produce `Forbidden`.
	///
	/// Undeclared and exempt lists always authorize, so callers may skip them.
	pub fn is_enforced(&self) -> bool {
		matches!(self, StepList::Denied | StepList::Declared(_))
	}

	/// What an exhausted evaluation resolves to.
	pub fn exhausted(&self) -> Verdict {
		match self {
			StepList::Undeclared | StepList::NotRequired => Verdict::Authorized,
			StepList::Denied | StepList::Declared(_) => Verdict::Forbidden,
		}
	}

	/// Maps an `Undecided` evaluation result to this list's default.
	pub fn resolve(&self, verdict: Verdict) -> Verdict {
		match verdict {
			Verdict::Undecided => self.exhausted(),
			decided => decided,
		}
	}
}
