//! Pure prompt assembly: fixed stages in a fixed order, knowledge entries
//! filling whatever token budget the fixed stages leave over.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use quill_domain::{ClientRecord, KnowledgeEntry, StakeholderProfile, Tone};

use crate::{EngineError, EngineResult};

pub const DEFAULT_FIRM_NAME: &str = "the consulting firm";

const GUARDRAILS: &str = "GUARDRAILS (MANDATORY):
- Be objective and fact-based.
- Do not invent information that is not present in the provided context.
- Avoid loaded, subjective, or stereotypical language.
- If the provided context is insufficient, say which additional data is needed.
- Keep a professional, consultative register throughout.";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AssembledPrompt {
	/// System persona handed to the generation provider separately.
	pub system: String,
	/// The user-message prompt, stages joined by blank lines.
	pub text: String,
	pub token_estimate: u32,
	/// Knowledge entries that made it into the budget, in rank order.
	pub included_entries: Vec<Uuid>,
}

/// Assembles the six stages (guardrails, client, stakeholder, knowledge,
/// task, output format). Entries are appended in the given rank order until
/// one would overflow the budget; that entry is dropped whole and appending
/// stops. An unparseable tone is a hard error, never a silent default.
pub fn assemble(
	client: &ClientRecord,
	stakeholder: &StakeholderProfile,
	ranked_entries: &[KnowledgeEntry],
	deliverable_type: &str,
	sections: &[String],
	token_budget: u32,
	firm_name: &str,
) -> EngineResult<AssembledPrompt> {
	let Some(tone) = Tone::parse(&stakeholder.tone) else {
		return Err(EngineError::UnknownTone { tone: stakeholder.tone.clone() });
	};

	let sections = sections
		.iter()
		.map(|section| section.trim())
		.filter(|section| !section.is_empty())
		.collect::<Vec<_>>();

	if sections.is_empty() {
		return Err(EngineError::InvalidRequest {
			message: "At least one output section is required.".to_string(),
		});
	}

	let client_stage = format!(
		"CLIENT CONTEXT:\nName: {}\nIndustry: {}\nDescription: {}",
		client.name, client.industry, client.description,
	);
	let stakeholder_stage = stakeholder_stage(stakeholder, tone);
	let knowledge_header = "KNOWLEDGE CONTEXT:";
	let task_stage = format!(
		"TASK:\nGenerate a {deliverable_type} deliverable for {}.\nRequired sections: {}.",
		client.name,
		sections.join(", "),
	);
	let format_stage = format!(
		"OUTPUT FORMAT:\nReturn a JSON object with exactly these keys: {}.\nEach value is the full text of that section. Do not add other keys.",
		sections
			.iter()
			.map(|section| format!("{section:?}"))
			.collect::<Vec<_>>()
			.join(", "),
	);
	let fixed_cost = [
		GUARDRAILS,
		&client_stage,
		&stakeholder_stage,
		knowledge_header,
		&task_stage,
		&format_stage,
	]
	.iter()
	.map(|stage| estimate_tokens(stage))
	.sum::<u32>();
	let mut remaining = token_budget.saturating_sub(fixed_cost);
	let mut knowledge_stage = knowledge_header.to_string();
	let mut included_entries = Vec::new();

	for entry in ranked_entries {
		let block = format!(
			"Source: {} ({})\nDate: {}\nContent: {}",
			entry.title,
			entry.entry_type.as_str(),
			entry.created_at.date(),
			entry.content,
		);
		let cost = estimate_tokens(&block);

		if cost > remaining {
			break;
		}

		remaining -= cost;

		knowledge_stage.push_str("\n\n");
		knowledge_stage.push_str(&block);
		included_entries.push(entry.id);
	}

	let text = [GUARDRAILS.to_string(), client_stage, stakeholder_stage, knowledge_stage, task_stage, format_stage]
		.join("\n\n");
	let token_estimate = estimate_tokens(&text);

	Ok(AssembledPrompt {
		system: format!("You are an expert consultant from {firm_name}."),
		text,
		token_estimate,
		included_entries,
	})
}

fn stakeholder_stage(stakeholder: &StakeholderProfile, tone: Tone) -> String {
	let priorities = if stakeholder.priorities.is_empty() {
		"Priorities: none declared.".to_string()
	} else {
		let lines = stakeholder
			.priorities
			.iter()
			.enumerate()
			.map(|(index, priority)| format!("{}. {priority}", index + 1))
			.collect::<Vec<_>>()
			.join("\n");

		format!("Priorities (most important first):\n{lines}")
	};

	format!(
		"STAKEHOLDER CONTEXT:\nName: {}\nRole: {}\nTone: {}\n{}\n{priorities}",
		stakeholder.name,
		stakeholder.role,
		tone.as_str(),
		tone.directive(),
	)
}

/// Word-count estimate at roughly four tokens per three words. Coarse on
/// purpose; budgets are advisory ceilings, not provider-exact counts.
pub fn estimate_tokens(text: &str) -> u32 {
	let words = text.unicode_words().count() as u32;

	words.saturating_mul(4).div_ceil(3)
}
