// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Running actions against a data layer.
//!
//! Every mutation follows the same sequence:
//!
//! 1. resolve the action (by name, or the primary action of the kind),
//! 2. load the existing record and every related record the change writes,
//! 3. authorize the complete request,
//! 4. persist.
//!
//! Nothing is written unless step 3 authorizes. If pointing a destination
//! back at the record fails, the record itself is restored; destinations
//! already rewritten at that point are not.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use arbor_authz::{
	Authorizer, DecisionRecord, EvaluationError, Outcome, RelationshipKind, ResourceDefinition,
};
use arbor_authz_core::{
	ActionKind, ActionRef, AuthorizationRequest, ChangeSet, Predicate, Principal, Record, RecordId,
};

use crate::error::ActionError;
use crate::sink::DecisionSink;
use crate::store::DataLayer;

/// Runs authorized actions.
pub struct ActionRunner {
	authorizer: Authorizer,
	data: Arc<dyn DataLayer>,
	sinks: Vec<Arc<dyn DecisionSink>>,
}

impl ActionRunner {
	pub fn new(authorizer: Authorizer, data: Arc<dyn DataLayer>) -> Self {
		Self {
			authorizer,
			data,
			sinks: Vec::new(),
		}
	}

	/// Builder: publish every authorization decision to `sink`.
	pub fn with_sink(mut self, sink: Arc<dyn DecisionSink>) -> Self {
		self.sinks.push(sink);
		self
	}

	pub fn authorizer(&self) -> &Authorizer {
		&self.authorizer
	}

	/// Creates a record from `change`.
	#[instrument(skip(self, principal, change), fields(principal = %principal.id))]
	pub async fn create(
		&self,
		resource: &str,
		action: Option<&str>,
		principal: &Principal,
		change: ChangeSet,
	) -> Result<Record, ActionError> {
		let definition = self.definition(resource)?;
		let action = resolve_action(definition, action, ActionKind::Create)?;
		let change = self.load_related(definition, change).await?;
		let request =
			AuthorizationRequest::new(resource, action, principal.clone()).with_change(change);
		self.authorize(&request).await?;

		let mut record = Record::new(RecordId::generate());
		apply_change(definition, &mut record, &request.change);
		let record = self.data.insert(resource, record).await?;
		if let Err(err) = self.link_destinations(definition, &record, &request.change).await {
			warn!(id = %record.id, error = %err, "linking destinations failed, removing record");
			self.data.delete(resource, &record.id).await?;
			return Err(err);
		}

		debug!(id = %record.id, "record created");
		Ok(record)
	}

	/// Applies `change` to the record `id`.
	#[instrument(skip(self, principal, change), fields(principal = %principal.id))]
	pub async fn update(
		&self,
		resource: &str,
		action: Option<&str>,
		principal: &Principal,
		id: RecordId,
		change: ChangeSet,
	) -> Result<Record, ActionError> {
		let definition = self.definition(resource)?;
		let action = resolve_action(definition, action, ActionKind::Update)?;
		let existing = self.fetch(resource, id).await?;
		let change = self.load_related(definition, change).await?;
		let request = AuthorizationRequest::new(resource, action, principal.clone())
			.with_change(change)
			.with_existing(existing.clone());
		self.authorize(&request).await?;

		let mut record = existing.clone();
		apply_change(definition, &mut record, &request.change);
		let record = self.data.update(resource, record).await?;
		if let Err(err) = self.link_destinations(definition, &record, &request.change).await {
			warn!(id = %record.id, error = %err, "linking destinations failed, restoring record");
			self.data.update(resource, existing).await?;
			return Err(err);
		}

		debug!(id = %record.id, "record updated");
		Ok(record)
	}

	/// Removes the record `id`.
	#[instrument(skip(self, principal), fields(principal = %principal.id))]
	pub async fn destroy(
		&self,
		resource: &str,
		action: Option<&str>,
		principal: &Principal,
		id: RecordId,
	) -> Result<(), ActionError> {
		let definition = self.definition(resource)?;
		let action = resolve_action(definition, action, ActionKind::Destroy)?;
		let existing = self.fetch(resource, id).await?;
		let request =
			AuthorizationRequest::new(resource, action, principal.clone()).with_existing(existing);
		self.authorize(&request).await?;

		self.data.delete(resource, &id).await?;
		debug!(%id, "record destroyed");
		Ok(())
	}

	/// Returns the records `principal` may read.
	///
	/// Reads are granted and filtered rather than denied, so every read
	/// publishes a granted decision without a record id.
	#[instrument(skip(self, principal), fields(principal = %principal.id))]
	pub async fn read(
		&self,
		resource: &str,
		action: Option<&str>,
		principal: &Principal,
	) -> Result<Vec<Record>, ActionError> {
		let definition = self.definition(resource)?;
		let action = resolve_action(definition, action, ActionKind::Read)?;
		let plan = self.authorizer.read_plan(resource, &action.name, principal)?;
		let request = AuthorizationRequest::new(resource, action.clone(), principal.clone());
		self.publish(&request, &Outcome::Authorized).await;
		if plan.is_empty() {
			debug!("read plan excludes every record");
			return Ok(Vec::new());
		}

		let records = self.data.query(resource, Some(&plan.filter)).await?;
		if !plan.needs_post_filter() {
			return Ok(records);
		}

		let fetched = records.len();
		let readable =
			self.authorizer
				.filter_readable(resource, &action.name, principal, records)?;
		debug!(fetched, readable = readable.len(), "post-filtered read");
		Ok(readable)
	}

	fn definition(&self, resource: &str) -> Result<&ResourceDefinition, ActionError> {
		self.authorizer
			.registry()
			.resource(resource)
			.ok_or_else(|| EvaluationError::UnknownResource(resource.to_string()).into())
	}

	async fn fetch(&self, resource: &str, id: RecordId) -> Result<Record, ActionError> {
		self.data
			.get(resource, &id)
			.await?
			.ok_or_else(|| ActionError::NotFound {
				resource: resource.to_string(),
				id,
			})
	}

	/// Loads the target record of every relationship write that names one.
	async fn load_related(
		&self,
		definition: &ResourceDefinition,
		mut change: ChangeSet,
	) -> Result<ChangeSet, ActionError> {
		for (name, write) in change.relationships.iter_mut() {
			let (Some(target_id), None) = (write.target_id, &write.target_record) else {
				continue;
			};
			// Unknown names are reported by the authorizer.
			let Some(relationship) = definition.get_relationship(name) else {
				continue;
			};
			let target = self.fetch(&relationship.destination, target_id).await?;
			write.target_record = Some(target);
		}
		Ok(change)
	}

	/// Points `has_one`/`has_many` destinations at `record`.
	///
	/// A `has_one` write detaches the previous destination; clearing a
	/// `has_many` relationship detaches all of them.
	async fn link_destinations(
		&self,
		definition: &ResourceDefinition,
		record: &Record,
		change: &ChangeSet,
	) -> Result<(), ActionError> {
		for (name, write) in &change.relationships {
			let Some(relationship) = definition.get_relationship(name) else {
				continue;
			};
			if relationship.kind == RelationshipKind::BelongsTo {
				continue;
			}

			let field = &relationship.destination_field;
			if relationship.kind == RelationshipKind::HasOne || write.target_id.is_none() {
				let linked = Predicate::eq(field.clone(), record.id);
				for mut previous in self.data.query(&relationship.destination, Some(&linked)).await? {
					if Some(previous.id) == write.target_id {
						continue;
					}
					previous.set(field.clone(), serde_json::Value::Null);
					self.data.update(&relationship.destination, previous).await?;
				}
			}

			if let Some(target) = &write.target_record {
				let mut target = target.clone();
				target.set(field.clone(), record.id.into());
				self.data.update(&relationship.destination, target).await?;
			}
		}
		Ok(())
	}

	async fn authorize(&self, request: &AuthorizationRequest) -> Result<(), ActionError> {
		let outcome = self.authorizer.evaluate(request);
		self.publish(request, &outcome).await;

		match outcome {
			Outcome::Authorized => Ok(()),
			Outcome::Forbidden(err) => {
				warn!(
					resource = %request.resource,
					action = %request.action.name,
					principal = %request.principal.id,
					error = %err,
					"operation forbidden"
				);
				Err(err.into())
			}
			Outcome::Error(err) => Err(err.into()),
		}
	}

	async fn publish(&self, request: &AuthorizationRequest, outcome: &Outcome) {
		if self.sinks.is_empty() {
			return;
		}
		let record = Arc::new(DecisionRecord::new(request, outcome));
		for sink in &self.sinks {
			if let Err(err) = sink.publish(Arc::clone(&record)).await {
				warn!(sink = sink.name(), error = %err, "failed to publish decision record");
			}
		}
	}
}

fn resolve_action(
	definition: &ResourceDefinition,
	action: Option<&str>,
	kind: ActionKind,
) -> Result<ActionRef, ActionError> {
	if let Some(name) = action {
		return Ok(ActionRef::new(name, kind));
	}
	let primary = definition
		.primary_action(kind)
		.ok_or_else(|| EvaluationError::NoPrimaryAction {
			resource: definition.name.clone(),
			kind,
		})?;
	Ok(ActionRef::new(primary.name.clone(), kind))
}

/// Copies attribute values and `belongs_to` links onto `record`.
fn apply_change(definition: &ResourceDefinition, record: &mut Record, change: &ChangeSet) {
	for (name, value) in &change.attributes {
		record.set(name.clone(), value.clone());
	}
	for (name, write) in &change.relationships {
		let Some(relationship) = definition.get_relationship(name) else {
			continue;
		};
		if relationship.kind == RelationshipKind::BelongsTo {
			let value = write.target_id.map_or(serde_json::Value::Null, Into::into);
			record.set(relationship.source_field.clone(), value);
		}
	}
}
