// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Record filter predicates handed to data layers.

use serde::{Deserialize, Serialize};
use std::ops::Not;

use crate::types::Record;

/// A boolean filter over stored records.
///
/// The combinators fold constants as they build, so a predicate composed from
/// principal-only checks collapses to [`Predicate::True`] or
/// [`Predicate::False`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
	True,
	False,
	Eq {
		attribute: String,
		value: serde_json::Value,
	},
	Not {
		predicate: Box<Predicate>,
	},
	And {
		predicates: Vec<Predicate>,
	},
	Or {
		predicates: Vec<Predicate>,
	},
}

impl Predicate {
	/// Matches records storing exactly `value` for `attribute`.
	pub fn eq(attribute: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		Predicate::Eq {
			attribute: attribute.into(),
			value: value.into(),
		}
	}

	pub fn constant(value: bool) -> Self {
		if value {
			Predicate::True
		} else {
			Predicate::False
		}
	}

	/// Returns the constant truth value, if this predicate is one.
	pub fn as_constant(&self) -> Option<bool> {
		match self {
			Predicate::True => Some(true),
			Predicate::False => Some(false),
			_ => None,
		}
	}

	/// Conjunction, flattening nested `And`s.
	pub fn and(self, other: Predicate) -> Predicate {
		match (self, other) {
			(Predicate::False, _) | (_, Predicate::False) => Predicate::False,
			(Predicate::True, p) | (p, Predicate::True) => p,
			(Predicate::And { mut predicates }, Predicate::And { predicates: rest }) => {
				predicates.extend(rest);
				Predicate::And { predicates }
			}
			(Predicate::And { mut predicates }, p) => {
				predicates.push(p);
				Predicate::And { predicates }
			}
			(p, Predicate::And { mut predicates }) => {
				predicates.insert(0, p);
				Predicate::And { predicates }
			}
			(a, b) => Predicate::And {
				predicates: vec![a, b],
			},
		}
	}

	/// Disjunction, flattening nested `Or`s.
	pub fn or(self, other: Predicate) -> Predicate {
		match (self, other) {
			(Predicate::True, _) | (_, Predicate::True) => Predicate::True,
			(Predicate::False, p) | (p, Predicate::False) => p,
			(Predicate::Or { mut predicates }, Predicate::Or { predicates: rest }) => {
				predicates.extend(rest);
				Predicate::Or { predicates }
			}
			(Predicate::Or { mut predicates }, p) => {
				predicates.push(p);
				Predicate::Or { predicates }
			}
			(p, Predicate::Or { mut predicates }) => {
				predicates.insert(0, p);
				Predicate::Or { predicates }
			}
			(a, b) => Predicate::Or {
				predicates: vec![a, b],
			},
		}
	}

	/// Evaluates the predicate against a stored record.
	pub fn matches(&self, record: &Record) -> bool {
		match self {
			Predicate::True => true,
			Predicate::False => false,
			Predicate::Eq { attribute, value } => record.attribute_equals(attribute, value),
			Predicate::Not { predicate } => !predicate.matches(record),
			Predicate::And { predicates } => predicates.iter().all(|p| p.matches(record)),
			Predicate::Or { predicates } => predicates.iter().any(|p| p.matches(record)),
		}
	}
}

impl Not for Predicate {
	type Output = Predicate;

	fn not(self) -> Predicate {
		match self {
			Predicate::True => Predicate::False,
			Predicate::False => Predicate::True,
			Predicate::Not { predicate } => *predicate,
			p => Predicate::Not {
				predicate: Box::new(p),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::RecordId;
	use serde_json::json;

	fn draft(state: &str) -> Record {
		Record::new(RecordId::generate()).with_attribute("state", state)
	}

	#[test]
	fn constants_fold() {
		let eq = Predicate::eq("state", "draft");
		assert_eq!(Predicate::True.and(eq.clone()), eq);
		assert_eq!(eq.clone().and(Predicate::False), Predicate::False);
		assert_eq!(Predicate::False.or(eq.clone()), eq);
		assert_eq!(eq.clone().or(Predicate::True), Predicate::True);
		assert_eq!(!Predicate::True, Predicate::False);
		assert_eq!(!!eq.clone(), eq);
	}

	#[test]
	fn nested_conjunctions_flatten() {
		let a = Predicate::eq("a", 1);
		let b = Predicate::eq("b", 2);
		let c = Predicate::eq("c", 3);
		let combined = a.clone().and(b.clone()).and(c.clone());
		assert_eq!(
			combined,
			Predicate::And {
				predicates: vec![a, b, c]
			}
		);
	}

	#[test]
	fn matches_records() {
		let published = Predicate::eq("state", "published");
		assert!(published.matches(&draft("published")));
		assert!(!published.matches(&draft("draft")));
		assert!((!published.clone()).matches(&draft("draft")));

		let either = published.or(Predicate::eq("state", "archived"));
		assert!(either.matches(&draft("archived")));
		assert!(!either.matches(&draft("draft")));
	}

	#[test]
	fn eq_on_missing_attribute_does_not_match_null() {
		let record = Record::new(RecordId::generate());
		assert!(!Predicate::eq("state", serde_json::Value::Null).matches(&record));
	}

	#[test]
	fn serde_shape() {
		let predicate = !Predicate::eq("state", "draft");
		let encoded = serde_json::to_value(&predicate).unwrap();
		assert_eq!(
			encoded,
			json!({
				"op": "not",
				"predicate": { "op": "eq", "attribute": "state", "value": "draft" }
			})
		);
		let decoded: Predicate = serde_json::from_value(encoded).unwrap();
		assert_eq!(decoded, predicate);
	}
}
