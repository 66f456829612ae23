use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

use crate::stakeholder::MAX_PRIORITIES;

/// Strictly decreasing so the primary priority dominates the blend.
pub const PRIORITY_WEIGHTS: [f32; MAX_PRIORITIES] = [1.0, 0.6, 0.3];

/// Relevance of one priority term against entry content, in [0, 1].
pub trait TermSignal {
	fn relevance(&self, term: &str, content: &str) -> f32;
}

/// Default signal: a full case-insensitive phrase match scores 1.0, otherwise
/// the fraction of the term's words that occur as words in the content.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordOverlapSignal;
impl TermSignal for WordOverlapSignal {
	fn relevance(&self, term: &str, content: &str) -> f32 {
		let term = term.trim().to_lowercase();

		if term.is_empty() {
			return 0.0;
		}

		let content = content.to_lowercase();

		if content.contains(&term) {
			return 1.0;
		}

		let content_words: HashSet<&str> = content.unicode_words().collect();
		let term_words: Vec<&str> = term.unicode_words().collect();

		if term_words.is_empty() {
			return 0.0;
		}

		let matched = term_words.iter().filter(|word| content_words.contains(**word)).count();

		matched as f32 / term_words.len() as f32
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityMatcher<S = WordOverlapSignal> {
	signal: S,
}
impl PriorityMatcher {
	pub fn new() -> Self {
		Self { signal: WordOverlapSignal }
	}
}
impl<S> PriorityMatcher<S>
where
	S: TermSignal,
{
	pub fn with_signal(signal: S) -> Self {
		Self { signal }
	}

	/// Weighted term relevance, normalized over the priorities actually
	/// present so a stakeholder with one priority is not penalized. Returns 0
	/// for an empty priority list or no overlap; never fails.
	pub fn score(&self, content: &str, priorities: &[String]) -> f32 {
		let mut weighted = 0.0_f32;
		let mut weight_sum = 0.0_f32;

		for (term, weight) in priorities.iter().zip(PRIORITY_WEIGHTS) {
			if term.trim().is_empty() {
				continue;
			}

			weight_sum += weight;
			weighted += weight * self.signal.relevance(term, content);
		}

		if weight_sum <= 0.0 {
			return 0.0;
		}

		(weighted / weight_sum).clamp(0.0, 1.0)
	}
}
