//! Wire format for record timestamps: UTC, millisecond precision, trailing
//! `Z` with no numeric offset (`2024-06-01T08:30:15.123Z`).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{self, Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Renders an instant in the wire format.
#[must_use]
pub fn to_wire(instant: DateTime<Utc>) -> String {
    instant.format(FORMAT).to_string()
}

/// Serde helper for `#[serde(with = "...")]` on `DateTime<Utc>` fields.
pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_wire(*instant))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
