pub mod embedding;
pub mod generation;

use color_eyre::{Result, eyre};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

/// Bearer auth plus any extra headers the provider config carries. Header
/// values must be JSON strings; structured values have no HTTP rendering.
pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::with_capacity(default_headers.len() + 1);

	headers.insert(AUTHORIZATION, bearer(api_key)?);

	for (name, value) in default_headers {
		let Value::String(raw) = value else {
			return Err(eyre::eyre!("Default header {name:?} must be a string value."));
		};

		headers.insert(HeaderName::from_bytes(name.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

/// Marked sensitive so the key never shows up in debug output of the request.
fn bearer(api_key: &str) -> Result<HeaderValue> {
	let mut value: HeaderValue = format!("Bearer {}", api_key.trim()).parse()?;

	value.set_sensitive(true);

	Ok(value)
}
