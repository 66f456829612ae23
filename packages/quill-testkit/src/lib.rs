//! In-memory test doubles for the engine's storage and provider seams.

pub mod providers;
pub mod store;

pub use providers::{
	CannedGeneration, FailingEmbedding, FailingGeneration, ScriptedEmbedding, YieldingEmbedding,
};
pub use store::MemoryStore;
