//! Shared fixtures: a scripted engine over the in-memory store.

use std::sync::Arc;

use serde_json::Map;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use quill_config::{self as config, Config};
use quill_domain::{
	ClientRecord, Deliverable, DeliverableStatus, EntryType, KnowledgeEntry, StakeholderProfile,
};
use quill_engine::{EmbeddingProvider, GenerationProvider, Providers, QuillEngine};
use quill_testkit::MemoryStore;

pub const DIM: usize = 4;

pub fn test_config() -> Config {
	Config {
		index: config::Index { vector_dim: DIM as u32 },
		providers: config::Providers {
			embedding: config::EmbeddingProviderConfig {
				provider_id: "test-embedding".to_string(),
				api_base: "http://127.0.0.1:0".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embed".to_string(),
				dimensions: DIM as u32,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			generation: config::GenerationProviderConfig {
				provider_id: "test-generation".to_string(),
				api_base: "http://127.0.0.1:0".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test-chat".to_string(),
				temperature: 0.2,
				max_tokens: 1_024,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		search: config::Search {
			default_limit: 5,
			candidate_k: 20,
			semantic_weight: 0.5,
			priority_weight: 0.5,
			min_similarity: -1.,
		},
		prompt: config::Prompt {
			token_budget: 2_000,
			firm_name: Some("Jacob Meadow Associates".to_string()),
		},
	}
}

pub fn engine(
	store: MemoryStore,
	embedding: Arc<dyn EmbeddingProvider>,
	generation: Arc<dyn GenerationProvider>,
) -> QuillEngine {
	QuillEngine::with_providers(
		test_config(),
		Arc::new(store),
		Providers::new(embedding, generation),
	)
}

pub fn client() -> ClientRecord {
	ClientRecord {
		id: Uuid::new_v4(),
		name: "Northwind Logistics".to_string(),
		industry: "Logistics".to_string(),
		description: "Regional freight operator with a mixed-age fleet.".to_string(),
	}
}

pub fn stakeholder(client_id: Uuid, tone: &str, priorities: &[&str]) -> StakeholderProfile {
	StakeholderProfile {
		id: Uuid::new_v4(),
		client_id,
		name: "Dana Whitfield".to_string(),
		role: "COO".to_string(),
		tone: tone.to_string(),
		priorities: priorities.iter().map(|priority| priority.to_string()).collect(),
	}
}

pub fn entry(client_id: Uuid, title: &str, content: &str, minutes_ago: i64) -> KnowledgeEntry {
	KnowledgeEntry {
		id: Uuid::new_v4(),
		client_id,
		stakeholder_id: None,
		entry_type: EntryType::Note,
		title: title.to_string(),
		content: content.to_string(),
		source_deliverable_id: None,
		created_at: OffsetDateTime::now_utc() - Duration::minutes(minutes_ago),
	}
}

pub fn deliverable(
	client_id: Uuid,
	status: DeliverableStatus,
	final_content: Option<&str>,
) -> Deliverable {
	Deliverable {
		id: Uuid::new_v4(),
		client_id,
		title: "Q3 fleet assessment".to_string(),
		deliverable_type: "assessment".to_string(),
		status,
		ai_generated_content: Some("Draft text.".to_string()),
		final_content: final_content.map(str::to_string),
		approved_at: None,
		created_at: OffsetDateTime::now_utc() - Duration::hours(2),
	}
}

/// One-hot vector along the given axis.
pub fn axis(index: usize) -> Vec<f32> {
	let mut vector = vec![0.; DIM];

	vector[index] = 1.;

	vector
}
