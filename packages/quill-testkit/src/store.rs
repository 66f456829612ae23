//! An in-memory [`KnowledgeStore`] whose clones share one state, so a test
//! can keep a handle for assertions after handing the store to the engine.

use std::{
	collections::HashMap,
	sync::{Arc, Mutex, MutexGuard},
};

use color_eyre::eyre;
use time::OffsetDateTime;
use uuid::Uuid;

use quill_domain::{ClientRecord, Deliverable, DeliverableStatus, KnowledgeEntry, StakeholderProfile};
use quill_engine::{BoxFuture, IndexSeed, KnowledgeStore};

#[derive(Debug, Default)]
struct State {
	clients: HashMap<Uuid, ClientRecord>,
	stakeholders: HashMap<Uuid, StakeholderProfile>,
	entries: HashMap<Uuid, KnowledgeEntry>,
	vectors: HashMap<Uuid, Vec<f32>>,
	deliverables: HashMap<Uuid, Deliverable>,
	fail_inserts: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	state: Arc<Mutex<State>>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn state(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}

	pub fn insert_client(&self, client: ClientRecord) {
		self.state().clients.insert(client.id, client);
	}

	pub fn insert_stakeholder(&self, stakeholder: StakeholderProfile) {
		self.state().stakeholders.insert(stakeholder.id, stakeholder);
	}

	pub fn insert_deliverable(&self, deliverable: Deliverable) {
		self.state().deliverables.insert(deliverable.id, deliverable);
	}

	/// Seeds an entry directly, optionally with a stored vector, bypassing
	/// the engine's write path.
	pub fn seed_entry(&self, entry: KnowledgeEntry, vector: Option<Vec<f32>>) {
		let mut state = self.state();

		if let Some(vector) = vector {
			state.vectors.insert(entry.id, vector);
		}

		state.entries.insert(entry.id, entry);
	}

	/// When set, `insert_entry` fails without persisting anything.
	pub fn set_fail_inserts(&self, fail: bool) {
		self.state().fail_inserts = fail;
	}

	pub fn entry_count(&self, client_id: Uuid) -> usize {
		self.state().entries.values().filter(|entry| entry.client_id == client_id).count()
	}

	pub fn vector_count(&self) -> usize {
		self.state().vectors.len()
	}

	pub fn stored_deliverable(&self, deliverable_id: Uuid) -> Option<Deliverable> {
		self.state().deliverables.get(&deliverable_id).cloned()
	}

	pub fn stored_entry_for(&self, deliverable_id: Uuid) -> Option<KnowledgeEntry> {
		self.state()
			.entries
			.values()
			.find(|entry| entry.source_deliverable_id == Some(deliverable_id))
			.cloned()
	}
}

fn sorted(mut entries: Vec<KnowledgeEntry>) -> Vec<KnowledgeEntry> {
	entries.sort_by(|l, r| l.created_at.cmp(&r.created_at).then_with(|| l.id.cmp(&r.id)));

	entries
}

impl KnowledgeStore for MemoryStore {
	fn client(&self, client_id: Uuid) -> BoxFuture<'_, color_eyre::Result<Option<ClientRecord>>> {
		let result = Ok(self.state().clients.get(&client_id).cloned());

		Box::pin(async move { result })
	}

	fn stakeholder(
		&self,
		stakeholder_id: Uuid,
	) -> BoxFuture<'_, color_eyre::Result<Option<StakeholderProfile>>> {
		let result = Ok(self.state().stakeholders.get(&stakeholder_id).cloned());

		Box::pin(async move { result })
	}

	fn entries_for_client(
		&self,
		client_id: Uuid,
	) -> BoxFuture<'_, color_eyre::Result<Vec<KnowledgeEntry>>> {
		let entries = self
			.state()
			.entries
			.values()
			.filter(|entry| entry.client_id == client_id)
			.cloned()
			.collect();
		let result = Ok(sorted(entries));

		Box::pin(async move { result })
	}

	fn entry_for_deliverable(
		&self,
		deliverable_id: Uuid,
	) -> BoxFuture<'_, color_eyre::Result<Option<KnowledgeEntry>>> {
		let result = Ok(self.stored_entry_for(deliverable_id));

		Box::pin(async move { result })
	}

	fn deliverable(
		&self,
		deliverable_id: Uuid,
	) -> BoxFuture<'_, color_eyre::Result<Option<Deliverable>>> {
		let result = Ok(self.state().deliverables.get(&deliverable_id).cloned());

		Box::pin(async move { result })
	}

	fn mark_approved(
		&self,
		deliverable_id: Uuid,
		approved_at: OffsetDateTime,
	) -> BoxFuture<'_, color_eyre::Result<()>> {
		let result = match self.state().deliverables.get_mut(&deliverable_id) {
			Some(deliverable) => {
				deliverable.status = DeliverableStatus::Approved;
				deliverable.approved_at = Some(approved_at);

				Ok(())
			},
			None => Err(eyre::eyre!("No deliverable {deliverable_id} to approve.")),
		};

		Box::pin(async move { result })
	}

	fn insert_entry(
		&self,
		entry: KnowledgeEntry,
		vector: Option<Vec<f32>>,
	) -> BoxFuture<'_, color_eyre::Result<()>> {
		let mut state = self.state();
		let result = if state.fail_inserts {
			Err(eyre::eyre!("The memory store rejected the insert."))
		} else {
			if let Some(vector) = vector {
				state.vectors.insert(entry.id, vector);
			}

			state.entries.insert(entry.id, entry);

			Ok(())
		};

		drop(state);

		Box::pin(async move { result })
	}

	fn index_seeds(&self) -> BoxFuture<'_, color_eyre::Result<Vec<IndexSeed>>> {
		let state = self.state();
		let seeds = sorted(state.entries.values().cloned().collect())
			.into_iter()
			.map(|entry| IndexSeed {
				client_id: entry.client_id,
				entry_id: entry.id,
				created_at: entry.created_at,
				vector: state.vectors.get(&entry.id).cloned(),
			})
			.collect();

		drop(state);

		Box::pin(async move { Ok(seeds) })
	}
}
