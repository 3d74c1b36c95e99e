// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Step evaluation.
//!
//! Steps run in declaration order and the first decisive step wins, so the
//! order in which steps are declared is part of a policy's meaning:
//!
//! ```text
//! [forbid_if: always, authorize_if: always]  -> Forbidden
//! [authorize_if: always, forbid_if: always]  -> Authorized
//! ```

use crate::check::CheckContext;
use crate::step::{Step, StepList, Verdict};

/// Evaluates steps in order, stopping at the first decisive one.
///
/// Returns [`Verdict::Undecided`] when no step decides.
pub fn evaluate_steps(steps: &[Step], ctx: &CheckContext<'_>) -> Verdict {
	for step in steps {
		let matched = step.check.evaluate(ctx);
		if let Some(verdict) = step.decide(matched) {
			return verdict;
		}
	}
	Verdict::Undecided
}

impl StepList {
	/// Evaluates the declared steps. May return [`Verdict::Undecided`].
	pub fn evaluate(&self, ctx: &CheckContext<'_>) -> Verdict {
		evaluate_steps(self.steps(), ctx)
	}

	/// Evaluates and resolves to either `Authorized` or `Forbidden`.
	pub fn decide(&self, ctx: &CheckContext<'_>) -> Verdict {
		self.resolve(self.evaluate(ctx))
	}
}
