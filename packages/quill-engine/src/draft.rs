//! Prompt building over live retrieval, and draft generation on top of it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_domain::{KnowledgeEntry, StakeholderProfile};

use crate::{
	EngineError, EngineResult, QuillEngine,
	prompt::{self, AssembledPrompt, DEFAULT_FIRM_NAME},
	rank,
	search::priority_candidates,
	storage_error,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BuildPromptRequest {
	pub client_id: Uuid,
	/// When absent, a neutral default profile shapes the prompt.
	pub stakeholder_id: Option<Uuid>,
	/// When absent, the stakeholder's priorities drive retrieval.
	pub query: Option<String>,
	pub deliverable_type: String,
	pub sections: Vec<String>,
	pub token_budget: Option<u32>,
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DraftResponse {
	pub content: String,
	pub prompt: AssembledPrompt,
}

impl QuillEngine {
	pub async fn build_prompt(&self, request: BuildPromptRequest) -> EngineResult<AssembledPrompt> {
		let client = self.require_client(request.client_id).await?;
		let stakeholder = match request.stakeholder_id {
			Some(id) => self.require_stakeholder(request.client_id, id).await?,
			None => default_stakeholder(request.client_id),
		};
		let limit = self.resolve_limit(request.limit)?;
		let token_budget = request.token_budget.unwrap_or(self.cfg.prompt.token_budget);

		if token_budget == 0 {
			return Err(EngineError::InvalidRequest {
				message: "token_budget must be greater than zero.".to_string(),
			});
		}

		let ranked = self
			.ranked_context(request.client_id, request.query.as_deref(), &stakeholder, limit)
			.await?;
		let firm_name = self.cfg.prompt.firm_name.as_deref().unwrap_or(DEFAULT_FIRM_NAME);

		prompt::assemble(
			&client,
			&stakeholder,
			&ranked,
			&request.deliverable_type,
			&request.sections,
			token_budget,
			firm_name,
		)
	}

	pub async fn generate_draft(&self, request: BuildPromptRequest) -> EngineResult<DraftResponse> {
		let prompt = self.build_prompt(request).await?;
		let content = self
			.providers
			.generation
			.generate(&self.cfg.providers.generation, &prompt.system, &prompt.text)
			.await
			.map_err(|err| EngineError::GenerationUnavailable { message: err.to_string() })?;

		Ok(DraftResponse { content, prompt })
	}

	/// Hybrid retrieval returning whole entries in rank order. Without an
	/// explicit query the stakeholder's joined priorities stand in for one;
	/// if retrieval still comes back empty the most recent entries are used
	/// so generation never runs on an empty context.
	async fn ranked_context(
		&self,
		client_id: Uuid,
		query: Option<&str>,
		stakeholder: &StakeholderProfile,
		limit: usize,
	) -> EngineResult<Vec<KnowledgeEntry>> {
		let entries = self.store().entries_for_client(client_id).await.map_err(storage_error)?;
		let query_text = query
			.map(str::trim)
			.filter(|query| !query.is_empty())
			.map(str::to_string)
			.or_else(|| {
				let joined = stakeholder.priorities.join(" ");

				(!joined.trim().is_empty()).then_some(joined)
			});
		let semantic = match query_text {
			Some(text) => match self.semantic_candidates(client_id, &text).await {
				Ok(semantic) => semantic,
				Err(EngineError::EmbeddingUnavailable { message }) => {
					tracing::warn!(
						client_id = %client_id,
						error = %message,
						"Embedding unavailable; prompt context degrades to priority-only.",
					);

					Vec::new()
				},
				Err(err) => return Err(err),
			},
			None => Vec::new(),
		};
		let priority = priority_candidates(&entries, stakeholder);
		let ranked = rank::rank(&semantic, &priority, self.blend_weights(), limit);

		if ranked.is_empty() {
			let mut recent = entries;

			recent.sort_by(|l, r| r.created_at.cmp(&l.created_at).then_with(|| l.id.cmp(&r.id)));
			recent.truncate(limit);

			return Ok(recent);
		}

		let mut by_id = entries
			.into_iter()
			.map(|entry| (entry.id, entry))
			.collect::<std::collections::HashMap<_, _>>();

		Ok(ranked.into_iter().filter_map(|candidate| by_id.remove(&candidate.entry_id)).collect())
	}
}

fn default_stakeholder(client_id: Uuid) -> StakeholderProfile {
	StakeholderProfile {
		id: Uuid::nil(),
		client_id,
		name: "General Stakeholder".to_string(),
		role: "Decision Maker".to_string(),
		tone: "analytical".to_string(),
		priorities: vec![
			"Efficiency".to_string(),
			"Cost Optimization".to_string(),
			"Quality".to_string(),
		],
	}
}
