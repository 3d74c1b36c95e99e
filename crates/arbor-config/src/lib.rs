// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for Arbor.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`ARBOR_*`)
//! - Tracing subscriber setup from the `logging` section
//!
//! # Usage
//!
//! ```ignore
//! use arbor_config::{init_tracing, load_config};
//!
//! let config = load_config()?;
//! init_tracing(&config.logging)?;
//! let authorizer = Authorizer::with_settings(registry, config.authorizer_settings());
//! ```

pub mod error;
pub mod layer;
pub mod logging;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ArborConfigLayer;
pub use logging::init_tracing;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use arbor_authz::AuthorizerSettings;
use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArborConfig {
	pub authz: AuthzConfig,
	pub logging: LoggingConfig,
}

impl ArborConfig {
	pub fn authorizer_settings(&self) -> AuthorizerSettings {
		self.authz.into()
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ARBOR_*`)
/// 2. Config file (`/etc/arbor/arbor.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ArborConfig, ConfigError> {
	load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource::new()),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ArborConfig, ConfigError> {
	load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::new()),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_config_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ArborConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ArborConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ArborConfigLayer) -> Result<ArborConfig, ConfigError> {
	let authz = layer.authz.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	logging::validate_level(&logging.level)?;

	info!(
		disclosure = ?authz.disclosure,
		strict_filters = authz.strict_filters,
		log_level = %logging.level,
		"Arbor configuration loaded"
	);

	Ok(ArborConfig { authz, logging })
}
