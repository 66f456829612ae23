mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, GenerationProviderConfig, Index, Prompt, Providers, Search,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::Parse { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.index.vector_dim == 0 {
		return Err(Error::Index {
			message: "vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Providers {
			message: "embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.index.vector_dim {
		return Err(Error::Providers {
			message: "embedding.dimensions must match index.vector_dim.".to_string(),
		});
	}
	if cfg.providers.generation.max_tokens == 0 {
		return Err(Error::Providers {
			message: "generation.max_tokens must be greater than zero.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("generation", &cfg.providers.generation.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Providers {
				message: format!("{label}.api_key must be non-empty."),
			});
		}
	}

	if cfg.search.default_limit == 0 {
		return Err(Error::Search {
			message: "default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.candidate_k == 0 {
		return Err(Error::Search {
			message: "candidate_k must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in [
		("semantic_weight", cfg.search.semantic_weight),
		("priority_weight", cfg.search.priority_weight),
	] {
		if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
			return Err(Error::Search {
				message: format!("{label} must be a finite number in the range 0.0-1.0."),
			});
		}
	}

	if cfg.search.semantic_weight + cfg.search.priority_weight <= 0.0 {
		return Err(Error::Search {
			message: "semantic_weight and priority_weight must not both be zero.".to_string(),
		});
	}
	if !cfg.search.min_similarity.is_finite() || !(-1.0..=1.0).contains(&cfg.search.min_similarity)
	{
		return Err(Error::Search {
			message: "min_similarity must be in the range -1.0-1.0.".to_string(),
		});
	}
	if cfg.prompt.token_budget == 0 {
		return Err(Error::Prompt {
			message: "token_budget must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.prompt.firm_name.as_deref().map(|name| name.trim().is_empty()).unwrap_or(false) {
		cfg.prompt.firm_name = None;
	}
}
