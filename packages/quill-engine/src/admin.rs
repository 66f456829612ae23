//! Index administration.

use serde::{Deserialize, Serialize};

use crate::{EngineResult, QuillEngine, storage_error};

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct RebuildReport {
	pub indexed: u64,
	pub missing_vector: u64,
	pub dimension_mismatch: u64,
}

impl QuillEngine {
	/// Repopulates the in-process index from storage, typically at startup.
	/// Entries without a stored vector are counted and skipped; so are
	/// vectors whose dimension no longer matches the configured one.
	pub async fn rebuild_index(&self) -> EngineResult<RebuildReport> {
		let seeds = self.store().index_seeds().await.map_err(storage_error)?;

		self.index().clear();

		let mut report = RebuildReport::default();

		for seed in seeds {
			let Some(vector) = seed.vector else {
				report.missing_vector += 1;

				continue;
			};

			match self.index().upsert(seed.client_id, seed.entry_id, seed.created_at, vector) {
				Ok(()) => report.indexed += 1,
				Err(quill_index::Error::DimensionMismatch { expected, actual }) => {
					tracing::warn!(
						entry_id = %seed.entry_id,
						expected,
						actual,
						"Skipping an entry whose stored vector has the wrong dimension.",
					);

					report.dimension_mismatch += 1;
				},
			}
		}

		tracing::info!(
			indexed = report.indexed,
			missing_vector = report.missing_vector,
			dimension_mismatch = report.dimension_mismatch,
			"Rebuilt the embedding index.",
		);

		Ok(report)
	}
}
