// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use std::fmt;

/// The part of a resource a step list is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Scope {
	Action(String),
	Attribute(String),
	Relationship(String),
	/// The destination-side relationship of a write made from another resource.
	Reverse(String),
}

impl Scope {
	pub fn name(&self) -> &str {
		match self {
			Scope::Action(name)
			| Scope::Attribute(name)
			| Scope::Relationship(name)
			| Scope::Reverse(name) => name,
		}
	}

	/// Returns true for scopes evaluated against a relationship write.
	pub fn is_relationship(&self) -> bool {
		matches!(self, Scope::Relationship(_) | Scope::Reverse(_))
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Scope::Action(name) => write!(f, "action:{name}"),
			Scope::Attribute(name) => write!(f, "attribute:{name}"),
			Scope::Relationship(name) => write!(f, "relationship:{name}"),
			Scope::Reverse(name) => write!(f, "reverse_relationship:{name}"),
		}
	}
}
