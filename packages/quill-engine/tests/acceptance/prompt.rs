use std::sync::Arc;

use quill_engine::{BuildPromptRequest, EngineError};
use quill_testkit::{CannedGeneration, FailingGeneration, MemoryStore, ScriptedEmbedding};

use super::suite::{self, DIM, axis};

fn prompt_request(client_id: uuid::Uuid) -> BuildPromptRequest {
	BuildPromptRequest {
		client_id,
		stakeholder_id: None,
		query: None,
		deliverable_type: "assessment".to_string(),
		sections: vec!["summary".to_string(), "recommendations".to_string()],
		token_budget: None,
		limit: None,
	}
}

#[tokio::test]
async fn prompts_carry_stakeholder_tone_and_retrieved_knowledge() {
	let store = MemoryStore::new();
	let client = suite::client();
	let stakeholder = suite::stakeholder(client.id, "strategic", &["fleet uptime"]);
	let relevant = suite::entry(client.id, "Uptime report", "Fleet uptime fell in May.", 20);

	store.insert_client(client.clone());
	store.insert_stakeholder(stakeholder.clone());
	store.seed_entry(relevant.clone(), Some(axis(0)));

	let embedding =
		Arc::new(ScriptedEmbedding::new(DIM).with_vector("uptime trends", axis(0)));
	let engine =
		suite::engine(store, embedding, Arc::new(CannedGeneration::new("unused")));

	engine.rebuild_index().await.expect("rebuild failed");

	let mut request = prompt_request(client.id);

	request.stakeholder_id = Some(stakeholder.id);
	request.query = Some("uptime trends".to_string());

	let prompt = engine.build_prompt(request).await.expect("build failed");

	assert_eq!(prompt.system, "You are an expert consultant from Jacob Meadow Associates.");
	assert!(prompt.text.contains("Tone: strategic"));
	assert!(prompt.text.contains("Fleet uptime fell in May."));
	assert!(prompt.text.contains("Required sections: summary, recommendations."));
	assert_eq!(prompt.included_entries, vec![relevant.id]);
	assert!(prompt.token_estimate <= 2_000);
}

#[tokio::test]
async fn missing_stakeholder_falls_back_to_a_neutral_profile() {
	let store = MemoryStore::new();
	let client = suite::client();

	store.insert_client(client.clone());
	store.seed_entry(
		suite::entry(client.id, "Recent note", "Quality audits continue.", 10),
		None,
	);

	let engine = suite::engine(
		store,
		Arc::new(ScriptedEmbedding::new(DIM)),
		Arc::new(CannedGeneration::new("unused")),
	);
	let prompt = engine.build_prompt(prompt_request(client.id)).await.expect("build failed");

	assert!(prompt.text.contains("General Stakeholder"));
	assert!(prompt.text.contains("Tone: analytical"));
}

#[tokio::test]
async fn empty_retrieval_falls_back_to_recent_entries() {
	let store = MemoryStore::new();
	let client = suite::client();
	let newest = suite::entry(client.id, "Newest note", "Totally unrelated content.", 5);
	let oldest = suite::entry(client.id, "Oldest note", "Also unrelated content.", 500);

	store.insert_client(client.clone());
	store.seed_entry(newest.clone(), None);
	store.seed_entry(oldest.clone(), None);

	let engine = suite::engine(
		store,
		Arc::new(ScriptedEmbedding::new(DIM)),
		Arc::new(CannedGeneration::new("unused")),
	);
	// No stakeholder priorities overlap and nothing is vectorized, so the
	// blend comes back empty and recency wins.
	let mut request = prompt_request(client.id);

	request.limit = Some(1);

	let prompt = engine.build_prompt(request).await.expect("build failed");

	assert_eq!(prompt.included_entries, vec![newest.id]);
}

#[tokio::test]
async fn unknown_stakeholder_tone_fails_closed() {
	let store = MemoryStore::new();
	let client = suite::client();
	let stakeholder = suite::stakeholder(client.id, "professional", &["efficiency"]);

	store.insert_client(client.clone());
	store.insert_stakeholder(stakeholder.clone());

	let engine = suite::engine(
		store,
		Arc::new(ScriptedEmbedding::new(DIM)),
		Arc::new(CannedGeneration::new("unused")),
	);
	let mut request = prompt_request(client.id);

	request.stakeholder_id = Some(stakeholder.id);

	let err = engine.build_prompt(request).await.expect_err("must fail closed");

	assert!(matches!(err, EngineError::UnknownTone { tone } if tone == "professional"));
}

#[tokio::test]
async fn generate_draft_returns_the_completion_and_the_prompt_behind_it() {
	let store = MemoryStore::new();
	let client = suite::client();

	store.insert_client(client.clone());
	store.seed_entry(suite::entry(client.id, "Note", "Context.", 10), None);

	let generation = Arc::new(CannedGeneration::new(r#"{"summary": "All good."}"#));
	let engine =
		suite::engine(store, Arc::new(ScriptedEmbedding::new(DIM)), generation.clone());
	let draft = engine.generate_draft(prompt_request(client.id)).await.expect("draft failed");

	assert_eq!(draft.content, r#"{"summary": "All good."}"#);
	assert_eq!(generation.call_count(), 1);
	assert!(draft.prompt.text.contains("OUTPUT FORMAT:"));
}

#[tokio::test]
async fn generation_outages_surface_as_their_own_error() {
	let store = MemoryStore::new();
	let client = suite::client();

	store.insert_client(client.clone());

	let engine = suite::engine(
		store,
		Arc::new(ScriptedEmbedding::new(DIM)),
		Arc::new(FailingGeneration),
	);
	let err = engine
		.generate_draft(prompt_request(client.id))
		.await
		.expect_err("must fail");

	assert!(matches!(err, EngineError::GenerationUnavailable { .. }));
}

#[tokio::test]
async fn zero_token_budget_is_rejected() {
	let store = MemoryStore::new();
	let client = suite::client();

	store.insert_client(client.clone());

	let engine = suite::engine(
		store,
		Arc::new(ScriptedEmbedding::new(DIM)),
		Arc::new(CannedGeneration::new("unused")),
	);
	let mut request = prompt_request(client.id);

	request.token_budget = Some(0);

	let err = engine.build_prompt(request).await.expect_err("must fail");

	assert!(matches!(err, EngineError::InvalidRequest { .. }));
}
