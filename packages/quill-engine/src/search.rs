//! Search over one client's knowledge corpus in three modes: semantic
//! (vector similarity), priority (stakeholder term alignment), and hybrid.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_domain::{EntryType, KnowledgeEntry, PriorityMatcher, StakeholderProfile};

use crate::{
	EngineError, EngineResult, QuillEngine,
	rank::{self, BlendWeights, RetrievalCandidate, SourceTag},
	storage_error,
};

const SNIPPET_CHARS: usize = 500;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
	Semantic,
	Priority,
	Hybrid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchRequest {
	pub client_id: Uuid,
	pub mode: SearchMode,
	pub query: Option<String>,
	pub stakeholder_id: Option<Uuid>,
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchItem {
	pub entry_id: Uuid,
	pub title: String,
	pub entry_type: EntryType,
	pub snippet: String,
	pub semantic_score: Option<f32>,
	pub priority_score: Option<f32>,
	pub combined_score: f32,
	pub sources: Vec<SourceTag>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchResponse {
	pub items: Vec<SearchItem>,
}

impl QuillEngine {
	pub async fn search(&self, request: SearchRequest) -> EngineResult<SearchResponse> {
		let limit = self.resolve_limit(request.limit)?;

		self.require_client(request.client_id).await?;

		let stakeholder = match request.stakeholder_id {
			Some(id) => Some(self.require_stakeholder(request.client_id, id).await?),
			None => None,
		};
		let entries =
			self.store().entries_for_client(request.client_id).await.map_err(storage_error)?;
		let candidates = match request.mode {
			SearchMode::Semantic => {
				let query = required_query(&request)?;
				let semantic = self.semantic_candidates(request.client_id, query).await?;

				rank::rank(&semantic, &[], BlendWeights::semantic_only(), limit)
			},
			SearchMode::Priority => {
				let Some(stakeholder) = stakeholder.as_ref() else {
					return Err(EngineError::InvalidRequest {
						message: "Priority search requires a stakeholder_id.".to_string(),
					});
				};
				let priority = priority_candidates(&entries, stakeholder);

				rank::rank(&[], &priority, BlendWeights::priority_only(), limit)
			},
			SearchMode::Hybrid => {
				let query = required_query(&request)?;
				let priority = stakeholder
					.as_ref()
					.map(|stakeholder| priority_candidates(&entries, stakeholder))
					.unwrap_or_default();
				// An unavailable embedder degrades hybrid search to the
				// priority signal instead of failing the request.
				let semantic = match self.semantic_candidates(request.client_id, query).await {
					Ok(semantic) => semantic,
					Err(EngineError::EmbeddingUnavailable { message }) => {
						tracing::warn!(
							client_id = %request.client_id,
							error = %message,
							"Embedding unavailable; hybrid search degrades to priority-only.",
						);

						Vec::new()
					},
					Err(err) => return Err(err),
				};

				rank::rank(&semantic, &priority, self.blend_weights(), limit)
			},
		};

		Ok(SearchResponse { items: hydrate(candidates, &entries) })
	}

	/// Embeds the query and reads the client's index partition, dropping hits
	/// below the configured similarity floor.
	pub(crate) async fn semantic_candidates(
		&self,
		client_id: Uuid,
		query: &str,
	) -> EngineResult<Vec<(Uuid, f32)>> {
		let vector = self.embed_one(query).await?;
		let hits =
			self.index().query(client_id, &vector, self.cfg.search.candidate_k as usize)?;

		Ok(hits
			.into_iter()
			.filter(|hit| hit.similarity >= self.cfg.search.min_similarity)
			.map(|hit| (hit.entry_id, hit.similarity))
			.collect())
	}
}

pub(crate) fn priority_candidates(
	entries: &[KnowledgeEntry],
	stakeholder: &StakeholderProfile,
) -> Vec<(Uuid, f32)> {
	let matcher = PriorityMatcher::new();

	entries
		.iter()
		.filter_map(|entry| {
			let score = matcher.score(&entry.content, &stakeholder.priorities);

			(score > 0.).then_some((entry.id, score))
		})
		.collect()
}

fn required_query(request: &SearchRequest) -> EngineResult<&str> {
	request
		.query
		.as_deref()
		.map(str::trim)
		.filter(|query| !query.is_empty())
		.ok_or_else(|| EngineError::InvalidRequest {
			message: "This search mode requires a non-empty query.".to_string(),
		})
}

fn hydrate(candidates: Vec<RetrievalCandidate>, entries: &[KnowledgeEntry]) -> Vec<SearchItem> {
	let by_id = entries.iter().map(|entry| (entry.id, entry)).collect::<HashMap<_, _>>();

	candidates
		.into_iter()
		.filter_map(|candidate| {
			let Some(entry) = by_id.get(&candidate.entry_id) else {
				// Index hit for an entry storage no longer returns.
				tracing::warn!(entry_id = %candidate.entry_id, "Dropping stale index hit.");

				return None;
			};

			Some(SearchItem {
				entry_id: candidate.entry_id,
				title: entry.title.clone(),
				entry_type: entry.entry_type,
				snippet: snippet(&entry.content),
				semantic_score: candidate.semantic_score,
				priority_score: candidate.priority_score,
				combined_score: candidate.combined_score,
				sources: candidate.sources,
			})
		})
		.collect()
}

fn snippet(content: &str) -> String {
	if content.chars().count() <= SNIPPET_CHARS {
		return content.to_string();
	}

	let mut snippet = content.chars().take(SNIPPET_CHARS).collect::<String>();

	snippet.push_str("...");

	snippet
}
