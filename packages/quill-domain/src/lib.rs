pub mod deliverable;
pub mod entry;
pub mod priority;
pub mod stakeholder;
pub mod time_serde;

pub use deliverable::{Deliverable, DeliverableStatus};
pub use entry::{ClientRecord, EntryType, KnowledgeEntry};
pub use priority::{PRIORITY_WEIGHTS, PriorityMatcher, TermSignal, WordOverlapSignal};
pub use stakeholder::{StakeholderProfile, Tone};
