//! Scenario record schema.
//!
//! Every recognised field is listed in [`SCENARIO_FIELDS`] together with
//! whether it is required and which JSON shapes it accepts. Fields not in
//! the table are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// JSON shapes a scenario field may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A string, or an integer that is read as its decimal string.
    StringCoercible,
    String,
    Bool,
    /// A string or an explicit `null`.
    StringOrNull,
    /// A JSON object.
    Mapping,
}

impl FieldKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::StringCoercible => value.is_string() || value.is_i64() || value.is_u64(),
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::StringOrNull => value.is_string() || value.is_null(),
            Self::Mapping => value.is_object(),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::StringCoercible => "a string or integer",
            Self::String => "a string",
            Self::Bool => "a boolean",
            Self::StringOrNull => "a string or null",
            Self::Mapping => "an object",
        }
    }
}

/// One row of the scenario schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        required: true,
        kind,
    }
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        required: false,
        kind,
    }
}

/// Recognised scenario fields. Optional fields also accept `null`.
pub const SCENARIO_FIELDS: &[FieldSpec] = &[
    required("id", FieldKind::StringCoercible),
    required("text", FieldKind::String),
    optional("type", FieldKind::String),
    optional("category", FieldKind::String),
    optional("deterministic", FieldKind::Bool),
    optional("characteristic_form", FieldKind::StringOrNull),
    optional("expected_result", FieldKind::Mapping),
    optional("data", FieldKind::Mapping),
    optional("source", FieldKind::String),
    optional("uuid", FieldKind::String),
];

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check one scenario record against [`SCENARIO_FIELDS`].
///
/// Returns an empty list when the record is valid. Each missing required
/// field and each field of the wrong shape contributes one message naming
/// the field. Whitespace-only `text` is accepted.
pub fn validate_scenario(record: &Value) -> Vec<String> {
    let Some(fields) = record.as_object() else {
        return vec![format!(
            "scenario must be a JSON object, got {}",
            json_type_name(record)
        )];
    };

    let mut errors = Vec::new();
    for spec in SCENARIO_FIELDS {
        match fields.get(spec.name) {
            None if spec.required => {
                errors.push(format!("missing required field `{}`", spec.name));
            }
            None => {}
            Some(Value::Null) if !spec.required => {}
            Some(value) if spec.kind.accepts(value) => {}
            Some(value) => errors.push(format!(
                "field `{}` must be {}, got {}",
                spec.name,
                spec.kind.expected(),
                json_type_name(value)
            )),
        }
    }
    errors
}

/// A validated benchmark scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub deterministic: Option<bool>,
    #[serde(default)]
    pub characteristic_form: Option<String>,
    #[serde(default)]
    pub expected_result: Option<Map<String, Value>>,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
}

impl Scenario {
    /// Validate `record` and convert it into a [`Scenario`].
    pub fn from_value(record: Value) -> Result<Self, Vec<String>> {
        let errors = validate_scenario(&record);
        if !errors.is_empty() {
            return Err(errors);
        }
        serde_json::from_value(record).map_err(|e| vec![e.to_string()])
    }
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    })
}
