//! Direct ingestion of new knowledge entries, embedded up front so they are
//! immediately retrievable.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use quill_domain::{EntryType, KnowledgeEntry};

use crate::{EngineError, EngineResult, QuillEngine, storage_error};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewEntry {
	pub client_id: Uuid,
	pub stakeholder_id: Option<Uuid>,
	pub entry_type: EntryType,
	pub title: String,
	pub content: String,
}

impl QuillEngine {
	/// Embeds the content, then persists entry and vector in one atomic store
	/// write under the client's write lock. An embedding failure leaves
	/// nothing behind.
	pub async fn ingest(&self, new: NewEntry) -> EngineResult<KnowledgeEntry> {
		if new.title.trim().is_empty() {
			return Err(EngineError::InvalidRequest {
				message: "Entry title must not be empty.".to_string(),
			});
		}
		if new.content.trim().is_empty() {
			return Err(EngineError::InvalidRequest {
				message: "Entry content must not be empty.".to_string(),
			});
		}

		self.require_client(new.client_id).await?;

		if let Some(stakeholder_id) = new.stakeholder_id {
			self.require_stakeholder(new.client_id, stakeholder_id).await?;
		}

		let vector = self.embed_one(&new.content).await?;
		let entry = KnowledgeEntry {
			id: Uuid::new_v4(),
			client_id: new.client_id,
			stakeholder_id: new.stakeholder_id,
			entry_type: new.entry_type,
			title: new.title,
			content: new.content,
			source_deliverable_id: None,
			created_at: OffsetDateTime::now_utc(),
		};
		let lock = self.write_lock(entry.client_id);
		let _guard = lock.lock().await;

		self.store()
			.insert_entry(entry.clone(), Some(vector.clone()))
			.await
			.map_err(storage_error)?;
		self.index().upsert(entry.client_id, entry.id, entry.created_at, vector)?;

		Ok(entry)
	}
}
