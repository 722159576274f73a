//! Edit instructions returned by the analysis step.
//!
//! Instructions arrive as JSON produced by an external process and are
//! untrusted: ranges may be inverted, out of bounds, or land in filler.
//! This module only guarantees the *shape* of each record. Range checks
//! happen during translation.
//!
//! Reference shape:
//!
//! ```json
//! [{"start": 10.5, "end": 35.0, "attributes": {"energy": "high"}}]
//! ```

use serde::{Deserialize, Serialize};

/// Opaque per-instruction hints (energy, transition, ...). Copied verbatim
/// onto every clip the instruction produces.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// A directive over a composite-time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditInstruction {
    #[serde(rename = "start", alias = "composite_start")]
    pub composite_start: f64,

    #[serde(rename = "end", alias = "composite_end")]
    pub composite_end: f64,

    #[serde(default)]
    pub attributes: Attributes,
}

impl EditInstruction {
    pub fn new(composite_start: f64, composite_end: f64) -> Self {
        Self {
            composite_start,
            composite_end,
            attributes: Attributes::new(),
        }
    }

    /// Attach an attribute (builder style).
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Requested span in composite seconds. Negative for inverted input.
    pub fn span(&self) -> f64 {
        self.composite_end - self.composite_start
    }
}

/// Errors raised while decoding an instruction payload.
#[derive(Debug, thiserror::Error)]
pub enum InstructionParseError {
    #[error("Instruction payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected an array of instructions, found {found}")]
    UnexpectedShape { found: &'static str },

    #[error("Instruction {index} is malformed: {source}")]
    MalformedRecord {
        index: usize,
        source: serde_json::Error,
    },
}

/// Decode an instruction payload.
///
/// Accepts a bare JSON array, or an object wrapping the array under
/// `"instructions"`. Surrounding markdown code fences are ignored. Each
/// record is decoded on its own so a failure names the record index.
pub fn parse_instructions(text: &str) -> Result<Vec<EditInstruction>, InstructionParseError> {
    let body = strip_code_fence(text);
    let value: serde_json::Value = serde_json::from_str(body)?;

    let records = match value {
        serde_json::Value::Array(records) => records,
        serde_json::Value::Object(mut object) => match object.remove("instructions") {
            Some(serde_json::Value::Array(records)) => records,
            Some(other) => {
                return Err(InstructionParseError::UnexpectedShape {
                    found: json_kind(&other),
                })
            }
            None => return Err(InstructionParseError::UnexpectedShape { found: "object" }),
        },
        other => {
            return Err(InstructionParseError::UnexpectedShape {
                found: json_kind(&other),
            })
        }
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value(record)
                .map_err(|source| InstructionParseError::MalformedRecord { index, source })
        })
        .collect()
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
