// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ConfigError;
use crate::sections::{LogFormat, LoggingConfig};

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(&config.level))
		.map_err(|e| ConfigError::InvalidValue {
			key: "logging.level".to_string(),
			message: e.to_string(),
		})?;

	let (json, pretty) = match config.format {
		LogFormat::Json => (Some(fmt::layer().json()), None),
		LogFormat::Pretty => (None, Some(fmt::layer())),
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(json)
		.with(pretty)
		.try_init()
		.map_err(|e| ConfigError::Subscriber(e.to_string()))
}

/// Returns an error if `level` is not a valid filter directive.
pub fn validate_level(level: &str) -> Result<(), ConfigError> {
	EnvFilter::try_new(level)
		.map(|_| ())
		.map_err(|e| ConfigError::Validation(format!("invalid logging.level '{level}': {e}")))
}
