//! Blends semantic-similarity and priority-alignment signals into one ranked
//! candidate list with deterministic tie-breaking.

use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which signal produced (or contributed to) a candidate.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
	Semantic,
	Priority,
}

#[derive(Clone, Copy, Debug)]
pub struct BlendWeights {
	pub semantic: f32,
	pub priority: f32,
}
impl BlendWeights {
	pub fn semantic_only() -> Self {
		Self { semantic: 1., priority: 0. }
	}

	pub fn priority_only() -> Self {
		Self { semantic: 0., priority: 1. }
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RetrievalCandidate {
	pub entry_id: Uuid,
	/// `None` when the entry never surfaced from the semantic signal.
	pub semantic_score: Option<f32>,
	/// `None` when the entry never surfaced from the priority signal.
	pub priority_score: Option<f32>,
	pub combined_score: f32,
	pub sources: Vec<SourceTag>,
}

/// Unions both signal lists by entry, blends scores as a weighted average
/// normalized over the weight sum (a missing signal contributes zero), and
/// orders by combined score, then semantic score, then entry id.
pub fn rank(
	semantic: &[(Uuid, f32)],
	priority: &[(Uuid, f32)],
	weights: BlendWeights,
	limit: usize,
) -> Vec<RetrievalCandidate> {
	let denominator = weights.semantic + weights.priority;

	if limit == 0 || !(denominator > 0.) {
		return Vec::new();
	}

	let mut by_entry = HashMap::<Uuid, RetrievalCandidate>::new();

	for &(entry_id, score) in semantic {
		let candidate = by_entry.entry(entry_id).or_insert_with(|| blank(entry_id));

		candidate.semantic_score = Some(score);
		candidate.sources.push(SourceTag::Semantic);
	}
	for &(entry_id, score) in priority {
		let candidate = by_entry.entry(entry_id).or_insert_with(|| blank(entry_id));

		candidate.priority_score = Some(score);
		candidate.sources.push(SourceTag::Priority);
	}

	let mut candidates = by_entry
		.into_values()
		.map(|mut candidate| {
			let semantic = weights.semantic * candidate.semantic_score.unwrap_or(0.);
			let priority = weights.priority * candidate.priority_score.unwrap_or(0.);

			candidate.combined_score = (semantic + priority) / denominator;

			candidate
		})
		.collect::<Vec<_>>();

	candidates.sort_by(|l, r| {
		cmp_f32_desc(l.combined_score, r.combined_score)
			.then_with(|| {
				cmp_f32_desc(l.semantic_score.unwrap_or(0.), r.semantic_score.unwrap_or(0.))
			})
			.then_with(|| l.entry_id.cmp(&r.entry_id))
	});
	candidates.truncate(limit);

	candidates
}

fn blank(entry_id: Uuid) -> RetrievalCandidate {
	RetrievalCandidate {
		entry_id,
		semantic_score: None,
		priority_score: None,
		combined_score: 0.,
		sources: Vec::new(),
	}
}

// Descending, NaN sorts last.
pub(crate) fn cmp_f32_desc(l: f32, r: f32) -> Ordering {
	match (l.is_nan(), r.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => r.partial_cmp(&l).unwrap_or(Ordering::Equal),
	}
}
