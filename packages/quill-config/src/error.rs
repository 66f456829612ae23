pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Violations are grouped by config section, so an index sizing mistake
/// reads differently from a provider credential or blend-weight one.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read engine config at {path:?}.")]
	Read { path: std::path::PathBuf, source: std::io::Error },
	#[error("Engine config at {path:?} is not valid TOML.")]
	Parse { path: std::path::PathBuf, source: toml::de::Error },
	#[error("Invalid [index] settings: {message}")]
	Index { message: String },
	#[error("Invalid [providers] settings: {message}")]
	Providers { message: String },
	#[error("Invalid [search] settings: {message}")]
	Search { message: String },
	#[error("Invalid [prompt] settings: {message}")]
	Prompt { message: String },
}
