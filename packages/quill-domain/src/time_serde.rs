//! RFC 3339 (de)serialization for entry and deliverable timestamps.

use serde::{Deserialize, Deserializer, Serializer, de, ser};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&format_rfc3339::<S>(value)?)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	parse_rfc3339::<D::Error>(&String::deserialize(deserializer)?)
}

fn format_rfc3339<S>(value: &OffsetDateTime) -> Result<String, S::Error>
where
	S: Serializer,
{
	value
		.format(&Rfc3339)
		.map_err(|err| ser::Error::custom(format!("Timestamp is not RFC 3339 formattable: {err}")))
}

fn parse_rfc3339<E>(raw: &str) -> Result<OffsetDateTime, E>
where
	E: de::Error,
{
	OffsetDateTime::parse(raw, &Rfc3339)
		.map_err(|err| E::custom(format!("Expected an RFC 3339 timestamp, got {raw:?}: {err}")))
}

/// For optional timestamps such as a deliverable's `approved_at`.
pub mod option {
	use super::*;

	pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match value {
			Some(value) => serializer.serialize_str(&format_rfc3339::<S>(value)?),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
	where
		D: Deserializer<'de>,
	{
		Option::<String>::deserialize(deserializer)?
			.map(|raw| parse_rfc3339::<D::Error>(&raw))
			.transpose()
	}
}
