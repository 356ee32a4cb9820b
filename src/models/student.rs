//! Student record recovered from a registration-form image.

use serde::{Deserialize, Deserializer, Serialize};

/// One row of structured data extracted from a registration form.
///
/// Fields are carried as the extraction provider returned them. Nothing here
/// checks email or phone formats; that happens when a record is persisted.
/// Scalar values of any JSON type are read as text, and `null` as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedStudentRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub school: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub grade: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub contact_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
}

/// Read a JSON scalar as a string: numbers and booleans keep their JSON text,
/// `null` becomes empty. Arrays and objects are kept as compact JSON.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}
