//! Retrieval-and-enrichment engine: semantic/priority/hybrid search over a
//! per-client knowledge corpus, bounded tone-aware prompt assembly, and the
//! closed loop that re-ingests approved deliverables as new knowledge.

pub mod admin;
pub mod draft;
pub mod enrich;
pub mod ingest;
pub mod prompt;
pub mod rank;
pub mod search;

use std::{
	collections::HashMap,
	future::Future,
	pin::Pin,
	sync::{Arc, Mutex},
};

use time::OffsetDateTime;
use uuid::Uuid;

pub use admin::RebuildReport;
pub use draft::{BuildPromptRequest, DraftResponse};
pub use ingest::NewEntry;
pub use prompt::AssembledPrompt;
pub use rank::{BlendWeights, RetrievalCandidate, SourceTag};
pub use search::{SearchItem, SearchMode, SearchRequest, SearchResponse};

use quill_config::{Config, EmbeddingProviderConfig, GenerationProviderConfig};
use quill_domain::{ClientRecord, Deliverable, KnowledgeEntry, StakeholderProfile};
use quill_index::EmbeddingIndex;
use quill_providers::{embedding, generation};

pub type EngineResult<T> = Result<T, EngineError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		system: &'a str,
		prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

/// Narrow storage contract the engine depends on. Referential integrity and
/// the entry/vector atomicity of `insert_entry` are the implementor's
/// responsibility; the engine never issues a second write to repair a first.
pub trait KnowledgeStore
where
	Self: Send + Sync,
{
	fn client(&self, client_id: Uuid) -> BoxFuture<'_, color_eyre::Result<Option<ClientRecord>>>;

	fn stakeholder(
		&self,
		stakeholder_id: Uuid,
	) -> BoxFuture<'_, color_eyre::Result<Option<StakeholderProfile>>>;

	fn entries_for_client(
		&self,
		client_id: Uuid,
	) -> BoxFuture<'_, color_eyre::Result<Vec<KnowledgeEntry>>>;

	/// The derived entry whose `source_deliverable_id` matches, if any.
	fn entry_for_deliverable(
		&self,
		deliverable_id: Uuid,
	) -> BoxFuture<'_, color_eyre::Result<Option<KnowledgeEntry>>>;

	fn deliverable(
		&self,
		deliverable_id: Uuid,
	) -> BoxFuture<'_, color_eyre::Result<Option<Deliverable>>>;

	fn mark_approved(
		&self,
		deliverable_id: Uuid,
		approved_at: OffsetDateTime,
	) -> BoxFuture<'_, color_eyre::Result<()>>;

	/// Persists the entry and, when present, its vector in one atomic write.
	fn insert_entry(
		&self,
		entry: KnowledgeEntry,
		vector: Option<Vec<f32>>,
	) -> BoxFuture<'_, color_eyre::Result<()>>;

	/// Projection of every entry's vector (or its absence) for index rebuilds.
	fn index_seeds(&self) -> BoxFuture<'_, color_eyre::Result<Vec<IndexSeed>>>;
}

#[derive(Debug, Clone)]
pub struct IndexSeed {
	pub client_id: Uuid,
	pub entry_id: Uuid,
	pub created_at: OffsetDateTime,
	pub vector: Option<Vec<f32>>,
}

#[derive(Debug)]
pub enum EngineError {
	InvalidRequest { message: String },
	NotFound { what: &'static str, id: Uuid },
	DimensionMismatch { expected: usize, actual: usize },
	UnknownTone { tone: String },
	NotApprovable { message: String },
	EmbeddingUnavailable { message: String },
	GenerationUnavailable { message: String },
	EnrichmentFailed { message: String },
	Storage { message: String },
}

impl std::fmt::Display for EngineError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::NotFound { what, id } => write!(f, "No {what} found for id {id}."),
			Self::DimensionMismatch { expected, actual } => {
				write!(f, "Vector dimension mismatch: expected {expected}, got {actual}.")
			},
			Self::UnknownTone { tone } => write!(f, "Unknown stakeholder tone: {tone:?}."),
			Self::NotApprovable { message } => write!(f, "Not approvable: {message}"),
			Self::EmbeddingUnavailable { message } => {
				write!(f, "Embedding provider unavailable: {message}")
			},
			Self::GenerationUnavailable { message } => {
				write!(f, "Generation provider unavailable: {message}")
			},
			Self::EnrichmentFailed { message } => {
				write!(f, "Enrichment failed and may be retried: {message}")
			},
			Self::Storage { message } => write!(f, "Storage error: {message}"),
		}
	}
}

impl std::error::Error for EngineError {}

impl From<quill_index::Error> for EngineError {
	fn from(err: quill_index::Error) -> Self {
		match err {
			quill_index::Error::DimensionMismatch { expected, actual } => {
				Self::DimensionMismatch { expected, actual }
			},
		}
	}
}

pub(crate) fn storage_error(err: color_eyre::Report) -> EngineError {
	EngineError::Storage { message: err.to_string() }
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generation: Arc<dyn GenerationProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, generation: Arc<dyn GenerationProvider>) -> Self {
		Self { embedding, generation }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), generation: provider }
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl GenerationProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		system: &'a str,
		prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(generation::generate(cfg, system, prompt))
	}
}

/// Write paths for one client are serialized on a single ordering key (the
/// client id); there is no nested lock acquisition across components.
#[derive(Default)]
struct ClientLocks {
	locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}
impl ClientLocks {
	fn for_client(&self, client_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
		let mut locks = self.locks.lock().unwrap_or_else(|err| err.into_inner());

		locks.entry(client_id).or_default().clone()
	}
}

pub struct QuillEngine {
	pub cfg: Config,
	store: Arc<dyn KnowledgeStore>,
	index: EmbeddingIndex,
	providers: Providers,
	write_locks: ClientLocks,
}
impl QuillEngine {
	pub fn new(cfg: Config, store: Arc<dyn KnowledgeStore>) -> Self {
		Self::with_providers(cfg, store, Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		store: Arc<dyn KnowledgeStore>,
		providers: Providers,
	) -> Self {
		let index = EmbeddingIndex::new(cfg.index.vector_dim as usize);

		Self { cfg, store, index, providers, write_locks: ClientLocks::default() }
	}

	pub fn index(&self) -> &EmbeddingIndex {
		&self.index
	}

	pub(crate) fn store(&self) -> &dyn KnowledgeStore {
		self.store.as_ref()
	}

	pub(crate) fn write_lock(&self, client_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
		self.write_locks.for_client(client_id)
	}

	pub(crate) fn blend_weights(&self) -> BlendWeights {
		BlendWeights {
			semantic: self.cfg.search.semantic_weight,
			priority: self.cfg.search.priority_weight,
		}
	}

	pub(crate) fn resolve_limit(&self, limit: Option<u32>) -> EngineResult<usize> {
		let limit = limit.unwrap_or(self.cfg.search.default_limit);

		if limit == 0 {
			return Err(EngineError::InvalidRequest {
				message: "limit must be greater than zero.".to_string(),
			});
		}

		Ok(limit as usize)
	}

	pub(crate) async fn require_client(&self, client_id: Uuid) -> EngineResult<ClientRecord> {
		self.store()
			.client(client_id)
			.await
			.map_err(storage_error)?
			.ok_or(EngineError::NotFound { what: "client", id: client_id })
	}

	pub(crate) async fn require_stakeholder(
		&self,
		client_id: Uuid,
		stakeholder_id: Uuid,
	) -> EngineResult<StakeholderProfile> {
		let stakeholder = self
			.store()
			.stakeholder(stakeholder_id)
			.await
			.map_err(storage_error)?
			.ok_or(EngineError::NotFound { what: "stakeholder", id: stakeholder_id })?;

		if stakeholder.client_id != client_id {
			return Err(EngineError::InvalidRequest {
				message: "Stakeholder does not belong to the requested client.".to_string(),
			});
		}

		Ok(stakeholder)
	}

	/// Embeds a single text through the collaborator. Never called while a
	/// write lock is held.
	pub(crate) async fn embed_one(&self, text: &str) -> EngineResult<Vec<f32>> {
		let texts = [text.to_string()];
		let vectors = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, &texts)
			.await
			.map_err(|err| EngineError::EmbeddingUnavailable { message: err.to_string() })?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(EngineError::EmbeddingUnavailable {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};
		let expected = self.cfg.index.vector_dim as usize;

		if vector.len() != expected {
			return Err(EngineError::DimensionMismatch { expected, actual: vector.len() });
		}

		Ok(vector)
	}
}
