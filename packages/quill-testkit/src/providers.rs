//! Scripted provider doubles. Embeddings map exact texts to fixed vectors;
//! unscripted texts fall back to the zero vector of the configured dimension.

use std::{
	collections::HashMap,
	sync::atomic::{AtomicUsize, Ordering},
};

use color_eyre::eyre;

use quill_config::{EmbeddingProviderConfig, GenerationProviderConfig};
use quill_engine::{BoxFuture, EmbeddingProvider, GenerationProvider};

pub struct ScriptedEmbedding {
	dim: usize,
	vectors: HashMap<String, Vec<f32>>,
	calls: AtomicUsize,
}
impl ScriptedEmbedding {
	pub fn new(dim: usize) -> Self {
		Self { dim, vectors: HashMap::new(), calls: AtomicUsize::new(0) }
	}

	pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
		self.vectors.insert(text.to_string(), vector);

		self
	}

	/// How many embed requests the engine has issued.
	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl EmbeddingProvider for ScriptedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let vectors = texts
			.iter()
			.map(|text| self.vectors.get(text).cloned().unwrap_or_else(|| vec![0.; self.dim]))
			.collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Yields to the scheduler before answering with zero vectors, so two
/// concurrent engine write paths interleave around their embed calls.
pub struct YieldingEmbedding {
	dim: usize,
	calls: AtomicUsize,
}
impl YieldingEmbedding {
	pub fn new(dim: usize) -> Self {
		Self { dim, calls: AtomicUsize::new(0) }
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl EmbeddingProvider for YieldingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			tokio::task::yield_now().await;

			self.calls.fetch_add(1, Ordering::SeqCst);

			Ok(texts.iter().map(|_| vec![0.; self.dim]).collect())
		})
	}
}

pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Err(eyre::eyre!("The embedding provider is offline.")) })
	}
}

pub struct CannedGeneration {
	content: String,
	calls: AtomicUsize,
}
impl CannedGeneration {
	pub fn new(content: &str) -> Self {
		Self { content: content.to_string(), calls: AtomicUsize::new(0) }
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl GenerationProvider for CannedGeneration {
	fn generate<'a>(
		&'a self,
		_cfg: &'a GenerationProviderConfig,
		_system: &'a str,
		_prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let content = self.content.clone();

		Box::pin(async move { Ok(content) })
	}
}

pub struct FailingGeneration;
impl GenerationProvider for FailingGeneration {
	fn generate<'a>(
		&'a self,
		_cfg: &'a GenerationProviderConfig,
		_system: &'a str,
		_prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move { Err(eyre::eyre!("The generation provider is offline.")) })
	}
}
