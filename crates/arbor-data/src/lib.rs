// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Data layer for Arbor resources.
//!
//! - [`DataLayer`]: async storage trait, one table per resource
//! - [`MemoryDataLayer`]: in-memory implementation
//! - [`ActionRunner`]: loads records, authorizes and persists actions
//! - [`DecisionSink`]: destinations for authorization decision records

pub mod error;
pub mod memory;
pub mod runner;
pub mod sink;
pub mod store;

pub use error::{ActionError, DataError, Result};
pub use memory::MemoryDataLayer;
pub use runner::ActionRunner;
pub use sink::{DecisionSink, MemoryDecisionSink, TracingDecisionSink};
pub use store::DataLayer;
