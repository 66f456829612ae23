use std::sync::Arc;

use quill_domain::EntryType;
use quill_engine::{EngineError, NewEntry, SearchMode, SearchRequest};
use quill_testkit::{CannedGeneration, FailingEmbedding, MemoryStore, ScriptedEmbedding};

use super::suite::{self, DIM, axis};

fn new_entry(client_id: uuid::Uuid) -> NewEntry {
	NewEntry {
		client_id,
		stakeholder_id: None,
		entry_type: EntryType::MeetingTranscript,
		title: "Kickoff call".to_string(),
		content: "Discussed the telemetry rollout timeline.".to_string(),
	}
}

#[tokio::test]
async fn ingested_entries_are_immediately_retrievable() {
	let store = MemoryStore::new();
	let client = suite::client();

	store.insert_client(client.clone());

	let embedding = Arc::new(
		ScriptedEmbedding::new(DIM)
			.with_vector("Discussed the telemetry rollout timeline.", axis(3))
			.with_vector("telemetry timeline", axis(3)),
	);
	let engine = suite::engine(
		store.clone(),
		embedding,
		Arc::new(CannedGeneration::new("unused")),
	);
	let entry = engine.ingest(new_entry(client.id)).await.expect("ingest failed");

	assert_eq!(store.entry_count(client.id), 1);
	assert_eq!(store.vector_count(), 1);

	let response = engine
		.search(SearchRequest {
			client_id: client.id,
			mode: SearchMode::Semantic,
			query: Some("telemetry timeline".to_string()),
			stakeholder_id: None,
			limit: None,
		})
		.await
		.expect("search failed");

	assert_eq!(response.items.len(), 1);
	assert_eq!(response.items[0].entry_id, entry.id);
	assert!((response.items[0].combined_score - 1.).abs() < 1e-6);
}

#[tokio::test]
async fn an_embedding_outage_leaves_nothing_behind() {
	let store = MemoryStore::new();
	let client = suite::client();

	store.insert_client(client.clone());

	let engine = suite::engine(
		store.clone(),
		Arc::new(FailingEmbedding),
		Arc::new(CannedGeneration::new("unused")),
	);
	let err = engine.ingest(new_entry(client.id)).await.expect_err("must fail");

	assert!(matches!(err, EngineError::EmbeddingUnavailable { .. }));
	assert_eq!(store.entry_count(client.id), 0);
	assert_eq!(store.vector_count(), 0);
	assert_eq!(engine.index().len_for_client(client.id), 0);
}

#[tokio::test]
async fn blank_titles_and_unknown_clients_are_rejected() {
	let store = MemoryStore::new();
	let client = suite::client();

	store.insert_client(client.clone());

	let engine = suite::engine(
		store,
		Arc::new(ScriptedEmbedding::new(DIM)),
		Arc::new(CannedGeneration::new("unused")),
	);
	let mut blank = new_entry(client.id);

	blank.title = "  ".to_string();

	let err = engine.ingest(blank).await.expect_err("must fail");

	assert!(matches!(err, EngineError::InvalidRequest { .. }));

	let err =
		engine.ingest(new_entry(uuid::Uuid::new_v4())).await.expect_err("must fail");

	assert!(matches!(err, EngineError::NotFound { what: "client", .. }));
}
