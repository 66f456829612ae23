//! In-process embedding index: per-client cosine-similarity lookup with
//! deterministic ordering. Vectors are referenced by entry id; the entries
//! themselves live at the storage boundary.

use std::{
	cmp::Ordering,
	collections::HashMap,
	sync::RwLock,
};

use time::OffsetDateTime;
use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Vector dimension mismatch: expected {expected}, got {actual}.")]
	DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
	pub entry_id: Uuid,
	pub similarity: f32,
}

#[derive(Debug, Clone)]
struct IndexedVector {
	entry_id: Uuid,
	created_at: OffsetDateTime,
	vector: Vec<f32>,
	norm: f32,
}

/// The write lock is scoped to the mutation itself; queries take the read
/// lock and may run in parallel with each other.
#[derive(Debug)]
pub struct EmbeddingIndex {
	dim: usize,
	clients: RwLock<HashMap<Uuid, Vec<IndexedVector>>>,
}
impl EmbeddingIndex {
	pub fn new(dim: usize) -> Self {
		Self { dim, clients: RwLock::new(HashMap::new()) }
	}

	pub fn dim(&self) -> usize {
		self.dim
	}

	/// Inserts or replaces the vector for an entry. A mismatched dimension
	/// fails and leaves the index untouched.
	pub fn upsert(
		&self,
		client_id: Uuid,
		entry_id: Uuid,
		created_at: OffsetDateTime,
		vector: Vec<f32>,
	) -> Result<()> {
		if vector.len() != self.dim {
			return Err(Error::DimensionMismatch { expected: self.dim, actual: vector.len() });
		}

		let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
		let indexed = IndexedVector { entry_id, created_at, vector, norm };
		let mut clients = self.clients.write().unwrap_or_else(|err| err.into_inner());
		let entries = clients.entry(client_id).or_default();

		match entries.iter_mut().find(|entry| entry.entry_id == entry_id) {
			Some(existing) => *existing = indexed,
			None => entries.push(indexed),
		}

		Ok(())
	}

	/// Returns whether an entry was actually removed.
	pub fn remove(&self, client_id: Uuid, entry_id: Uuid) -> bool {
		let mut clients = self.clients.write().unwrap_or_else(|err| err.into_inner());
		let Some(entries) = clients.get_mut(&client_id) else { return false };
		let before = entries.len();

		entries.retain(|entry| entry.entry_id != entry_id);

		if entries.is_empty() {
			clients.remove(&client_id);
		}

		before != entries_len(&clients, client_id)
	}

	pub fn clear(&self) {
		self.clients.write().unwrap_or_else(|err| err.into_inner()).clear();
	}

	pub fn len_for_client(&self, client_id: Uuid) -> usize {
		let clients = self.clients.read().unwrap_or_else(|err| err.into_inner());

		entries_len(&clients, client_id)
	}

	/// Nearest neighbors for one client, strictly descending by cosine
	/// similarity; ties break by most-recent `created_at`, then entry id
	/// ascending. Fewer than `k` indexed entries returns all of them.
	pub fn query(&self, client_id: Uuid, vector: &[f32], k: usize) -> Result<Vec<Hit>> {
		if vector.len() != self.dim {
			return Err(Error::DimensionMismatch { expected: self.dim, actual: vector.len() });
		}

		let query_norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
		let clients = self.clients.read().unwrap_or_else(|err| err.into_inner());
		let Some(entries) = clients.get(&client_id) else { return Ok(Vec::new()) };
		let mut scored: Vec<(&IndexedVector, f32)> = entries
			.iter()
			.map(|entry| (entry, cosine(vector, query_norm, &entry.vector, entry.norm)))
			.collect();

		scored.sort_by(|(left, left_sim), (right, right_sim)| {
			cmp_f32_desc(*left_sim, *right_sim)
				.then_with(|| right.created_at.cmp(&left.created_at))
				.then_with(|| left.entry_id.cmp(&right.entry_id))
		});

		Ok(scored
			.into_iter()
			.take(k)
			.map(|(entry, similarity)| Hit { entry_id: entry.entry_id, similarity })
			.collect())
	}
}

fn entries_len(clients: &HashMap<Uuid, Vec<IndexedVector>>, client_id: Uuid) -> usize {
	clients.get(&client_id).map(Vec::len).unwrap_or(0)
}

/// Zero-norm vectors have no direction and score 0.
fn cosine(query: &[f32], query_norm: f32, vector: &[f32], norm: f32) -> f32 {
	if query_norm == 0.0 || norm == 0.0 {
		return 0.0;
	}

	let dot: f32 = query.iter().zip(vector).map(|(a, b)| a * b).sum();

	dot / (query_norm * norm)
}

fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
