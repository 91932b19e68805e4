use serde::{Deserialize, Deserializer, Serialize};
use std::time::SystemTime;

/// Entrant as persisted under the `allNames` and `customNames` keys.
///
/// Field names follow the stored JSON produced by earlier versions of the tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntrantEntity {
    /// Display name.
    pub name: String,
    /// City, empty for custom entrants. Stored `null`s read as empty.
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub city: String,
    /// Source flag (`""` or `"custom"`).
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub flag: String,
    /// Remote feed identifier. Accepts both strings and numbers.
    #[serde(
        rename = "empId",
        default,
        deserialize_with = "deserialize_external_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub emp_id: Option<String>,
}

/// Winner history entry persisted under the `winners` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WinnerEntity {
    /// Winning entrant, flattened into the record.
    #[serde(flatten)]
    pub entrant: EntrantEntity,
    /// Completion time; absent on records written before timestamps were kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawn_at: Option<SystemTime>,
}

/// Read an optional text field, mapping `null` to an empty string.
pub fn deserialize_null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExternalId {
    Text(String),
    Number(i64),
}

/// Read an identifier that may have been stored as a string or as a number.
pub fn deserialize_external_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawExternalId>::deserialize(deserializer)?;
    Ok(raw.map(|id| match id {
        RawExternalId::Text(text) => text,
        RawExternalId::Number(number) => number.to_string(),
    }))
}
