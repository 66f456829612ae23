use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub index: Index,
	pub providers: Providers,
	pub search: Search,
	pub prompt: Prompt,
}

#[derive(Debug, Deserialize)]
pub struct Index {
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub generation: GenerationProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// Result cap applied when a request does not carry its own limit.
	pub default_limit: u32,
	/// How many semantic candidates are pulled from the index before blending.
	pub candidate_k: u32,
	pub semantic_weight: f32,
	pub priority_weight: f32,
	/// Semantic hits below this similarity are discarded before ranking.
	pub min_similarity: f32,
}

#[derive(Debug, Deserialize)]
pub struct Prompt {
	pub token_budget: u32,
	/// Consulting firm named in the generation persona line.
	pub firm_name: Option<String>,
}
