use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_PRIORITIES: usize = 3;

/// Tone is stored as a raw string at the storage boundary and parsed where a
/// prompt is assembled. An unknown tone is a hard failure there, never a
/// silent default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeholderProfile {
	pub id: Uuid,
	pub client_id: Uuid,
	pub name: String,
	pub role: String,
	pub tone: String,
	/// Ordered by descending importance; at most [`MAX_PRIORITIES`] are scored.
	pub priorities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
	Direct,
	Collaborative,
	Analytical,
	Strategic,
}
impl Tone {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"direct" => Some(Self::Direct),
			"collaborative" => Some(Self::Collaborative),
			"analytical" => Some(Self::Analytical),
			"strategic" => Some(Self::Strategic),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Direct => "direct",
			Self::Collaborative => "collaborative",
			Self::Analytical => "analytical",
			Self::Strategic => "strategic",
		}
	}

	/// The generation directive matching this tone.
	pub fn directive(self) -> &'static str {
		match self {
			Self::Direct =>
				"Use direct language: short declarative sentences, concrete actions, no hedging.",
			Self::Collaborative =>
				"Use collaborative language: frame recommendations as joint work with the client.",
			Self::Analytical =>
				"Use analytical language: lead with evidence, quantify claims, separate findings from opinions.",
			Self::Strategic =>
				"Use strategic language: connect recommendations to long-term objectives and market position.",
		}
	}
}
