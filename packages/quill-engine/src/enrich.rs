//! The enrichment loop: an approved deliverable's final content becomes a new
//! knowledge entry with its own vector, exactly once per deliverable.

use time::OffsetDateTime;
use uuid::Uuid;

use quill_domain::{Deliverable, DeliverableStatus, EntryType, KnowledgeEntry};

use crate::{EngineError, EngineResult, QuillEngine, storage_error};

impl QuillEngine {
	/// Approves a deliverable in review (a no-op when already approved) and
	/// derives a knowledge entry from its final content. Idempotent on the
	/// deliverable id: a repeat call returns the existing derived entry
	/// without re-embedding. The embedding call happens before the client's
	/// write lock is taken, so a slow provider never blocks other writers.
	pub async fn approve_and_enrich(&self, deliverable_id: Uuid) -> EngineResult<KnowledgeEntry> {
		let deliverable = self
			.store()
			.deliverable(deliverable_id)
			.await
			.map_err(storage_error)?
			.ok_or(EngineError::NotFound { what: "deliverable", id: deliverable_id })?;

		match deliverable.status {
			DeliverableStatus::Review | DeliverableStatus::Approved => {},
			DeliverableStatus::Draft => {
				return Err(EngineError::NotApprovable {
					message: "The deliverable is still a draft.".to_string(),
				});
			},
			DeliverableStatus::Final => {
				return Err(EngineError::NotApprovable {
					message: "The deliverable is already final.".to_string(),
				});
			},
		}

		let Some(final_content) = deliverable
			.final_content
			.as_deref()
			.map(str::trim)
			.filter(|content| !content.is_empty())
			.map(str::to_string)
		else {
			return Err(EngineError::NotApprovable {
				message: "The deliverable has no final content.".to_string(),
			});
		};

		if deliverable.status == DeliverableStatus::Review {
			self.store()
				.mark_approved(deliverable_id, OffsetDateTime::now_utc())
				.await
				.map_err(storage_error)?;
		}

		// Idempotency fast path, before paying for an embedding.
		if let Some(existing) =
			self.store().entry_for_deliverable(deliverable_id).await.map_err(storage_error)?
		{
			return Ok(existing);
		}

		// Approval stands even if embedding fails; the enrichment itself
		// reports as retryable.
		let vector = self.embed_one(&final_content).await.map_err(|err| match err {
			err @ EngineError::DimensionMismatch { .. } => err,
			err => EngineError::EnrichmentFailed { message: err.to_string() },
		})?;
		let entry = derived_entry(&deliverable, final_content);
		let lock = self.write_lock(deliverable.client_id);
		let _guard = lock.lock().await;

		// Re-check under the lock; a concurrent approval may have won.
		if let Some(existing) =
			self.store().entry_for_deliverable(deliverable_id).await.map_err(storage_error)?
		{
			return Ok(existing);
		}

		self.store()
			.insert_entry(entry.clone(), Some(vector.clone()))
			.await
			.map_err(|err| EngineError::EnrichmentFailed { message: err.to_string() })?;
		self.index().upsert(entry.client_id, entry.id, entry.created_at, vector)?;

		tracing::info!(
			deliverable_id = %deliverable_id,
			entry_id = %entry.id,
			client_id = %entry.client_id,
			"Enriched the knowledge corpus from an approved deliverable.",
		);

		Ok(entry)
	}
}

fn derived_entry(deliverable: &Deliverable, content: String) -> KnowledgeEntry {
	KnowledgeEntry {
		id: Uuid::new_v4(),
		client_id: deliverable.client_id,
		stakeholder_id: None,
		entry_type: EntryType::Document,
		title: format!("Approved {}: {}", deliverable.deliverable_type, deliverable.title),
		content,
		source_deliverable_id: Some(deliverable.id),
		created_at: OffsetDateTime::now_utc(),
	}
}
