use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A client organization the knowledge corpus is scoped to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
	pub id: Uuid,
	pub name: String,
	pub industry: String,
	pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
	MeetingTranscript,
	Email,
	Document,
	Note,
}
impl EntryType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::MeetingTranscript => "meeting_transcript",
			Self::Email => "email",
			Self::Document => "document",
			Self::Note => "note",
		}
	}
}

/// Immutable once created. Entries derived from an approved deliverable carry
/// the deliverable id in `source_deliverable_id`; that back-reference is the
/// idempotency key of the enrichment loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
	pub id: Uuid,
	pub client_id: Uuid,
	pub stakeholder_id: Option<Uuid>,
	pub entry_type: EntryType,
	pub title: String,
	pub content: String,
	pub source_deliverable_id: Option<Uuid>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
