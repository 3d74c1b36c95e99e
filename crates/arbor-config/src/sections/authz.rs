// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization configuration section.

use arbor_authz::{AuthorizerSettings, Disclosure};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthzConfigLayer {
	pub disclosure: Option<Disclosure>,
	pub strict_filters: Option<bool>,
}

impl AuthzConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.disclosure.is_some() {
			self.disclosure = other.disclosure;
		}
		if other.strict_filters.is_some() {
			self.strict_filters = other.strict_filters;
		}
	}

	pub fn finalize(self) -> AuthzConfig {
		AuthzConfig {
			disclosure: self.disclosure.unwrap_or_default(),
			strict_filters: self.strict_filters.unwrap_or(true),
		}
	}
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AuthzConfig {
	pub disclosure: Disclosure,
	pub strict_filters: bool,
}

impl Default for AuthzConfig {
	fn default() -> Self {
		AuthzConfigLayer::default().finalize()
	}
}

impl From<AuthzConfig> for AuthorizerSettings {
	fn from(config: AuthzConfig) -> Self {
		AuthorizerSettings {
			disclosure: config.disclosure,
			strict_filters: config.strict_filters,
		}
	}
}
