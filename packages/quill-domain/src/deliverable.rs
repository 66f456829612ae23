use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverableStatus {
	Draft,
	Review,
	Approved,
	Final,
}
impl DeliverableStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Draft => "draft",
			Self::Review => "review",
			Self::Approved => "approved",
			Self::Final => "final",
		}
	}
}

/// Moves draft -> review -> approved exactly once along the happy path; the
/// review -> approved transition is the sole enrichment trigger and stays
/// idempotent afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deliverable {
	pub id: Uuid,
	pub client_id: Uuid,
	pub title: String,
	pub deliverable_type: String,
	pub status: DeliverableStatus,
	pub ai_generated_content: Option<String>,
	pub final_content: Option<String>,
	#[serde(with = "crate::time_serde::option")]
	pub approved_at: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
