//! Record identity, field descriptors and name-keyed merging
//!
//! Records are plain serde structs. The persistence core never inspects
//! their schema beyond the static descriptor list each type declares;
//! everything else goes through a JSON object keyed by field name.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// The persisted domains, one file each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Player,
    Game,
    Settings,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Player, RecordKind::Game, RecordKind::Settings];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Player => "Player",
            RecordKind::Game => "Game",
            RecordKind::Settings => "Settings",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "player" => Ok(RecordKind::Player),
            "game" => Ok(RecordKind::Game),
            "settings" => Ok(RecordKind::Settings),
            other => Err(format!("unknown record kind '{other}'")),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("{kind} record has no field '{field}'")]
    UnknownField { kind: RecordKind, field: String },

    #[error("invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Scalar type of a persisted field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Int,
    Float,
    Bool,
    Text,
    /// Unit-variant enum stored by variant name
    Choice(&'static [&'static str]),
}

/// Inclusive numeric bounds for a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRange {
    pub min: f64,
    pub max: f64,
}

/// Static description of one record field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    /// Serialized field name
    pub name: &'static str,
    pub kind: FieldKind,
    /// Grouping label for editors
    pub category: &'static str,
    pub range: Option<NumberRange>,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: FieldKind, category: &'static str) -> Self {
        Self {
            name,
            kind,
            category,
            range: None,
        }
    }

    pub const fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some(NumberRange { min, max });
        self
    }

    /// Human-readable label, e.g. `master_volume` -> `Master Volume`
    pub fn display_name(&self) -> String {
        to_display_name(self.name)
    }

    /// Parse a raw string into the JSON value this field stores
    pub fn parse_value(&self, raw: &str) -> Result<Value, RecordError> {
        let invalid = |reason: String| RecordError::InvalidValue {
            field: self.name,
            value: raw.to_string(),
            reason,
        };
        let trimmed = raw.trim();

        let value = match self.kind {
            FieldKind::Int => {
                let n: i64 = trimmed
                    .parse()
                    .map_err(|_| invalid("expected an integer".to_string()))?;
                self.check_range(n as f64).map_err(invalid)?;
                Value::from(n)
            }
            FieldKind::Float => {
                let n: f64 = trimmed
                    .parse()
                    .map_err(|_| invalid("expected a number".to_string()))?;
                if !n.is_finite() {
                    return Err(invalid("expected a finite number".to_string()));
                }
                self.check_range(n).map_err(invalid)?;
                Value::from(n)
            }
            FieldKind::Bool => match trimmed.to_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Value::Bool(true),
                "false" | "off" | "no" | "0" => Value::Bool(false),
                _ => return Err(invalid("expected true or false".to_string())),
            },
            FieldKind::Text => Value::String(raw.to_string()),
            FieldKind::Choice(options) => {
                let found = options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| invalid(format!("expected one of {}", options.join(", "))))?;
                Value::String((*found).to_string())
            }
        };
        Ok(value)
    }

    fn check_range(&self, n: f64) -> Result<(), String> {
        match self.range {
            Some(r) if n < r.min || n > r.max => {
                Err(format!("out of range {}..={}", r.min, r.max))
            }
            _ => Ok(()),
        }
    }
}

/// A persisted data record
pub trait Record: Serialize + DeserializeOwned + Default + Clone + fmt::Debug {
    const KIND: RecordKind;

    /// Persisted fields in declaration order
    fn fields() -> &'static [FieldDescriptor];

    fn field(name: &str) -> Option<&'static FieldDescriptor> {
        Self::fields().iter().find(|f| f.name == name)
    }
}

/// Canonical text form of a record, as written to disk
pub fn to_text<R: Record>(record: &R) -> Result<String, RecordError> {
    Ok(serde_json::to_string(record)?)
}

/// Overwrite the fields of `target` named in the JSON object `text`
///
/// Names unknown to `target` are ignored; fields absent from `text` keep
/// their current value. On error `target` is untouched.
pub fn merge_text<R: Record>(target: &mut R, text: &str) -> Result<(), RecordError> {
    let incoming: Value = serde_json::from_str(text)?;
    merge_value(target, &incoming)
}

/// Same as [`merge_text`] for an already-parsed document
pub fn merge_value<R: Record>(target: &mut R, incoming: &Value) -> Result<(), RecordError> {
    let Value::Object(incoming) = incoming else {
        return Err(RecordError::NotAnObject(json_type_name(incoming)));
    };

    let mut current = serde_json::to_value(&*target)?;
    if let Value::Object(fields) = &mut current {
        overlay(fields, incoming);
    }

    *target = serde_json::from_value(current)?;
    Ok(())
}

/// Overwrite `target` with every field of the template `source`
pub fn apply_template<R: Record>(target: &mut R, source: &R) -> Result<(), RecordError> {
    merge_value(target, &serde_json::to_value(source)?)
}

/// Read one field by name
pub fn get_field<R: Record>(record: &R, name: &str) -> Option<Value> {
    R::field(name)?;
    match serde_json::to_value(record).ok()? {
        Value::Object(mut fields) => fields.remove(name),
        _ => None,
    }
}

/// Parse `raw` according to the field's descriptor and store it
pub fn set_field<R: Record>(record: &mut R, name: &str, raw: &str) -> Result<(), RecordError> {
    let descriptor = R::field(name).ok_or_else(|| RecordError::UnknownField {
        kind: R::KIND,
        field: name.to_string(),
    })?;
    let value = descriptor.parse_value(raw)?;

    let mut patch = Map::new();
    patch.insert(descriptor.name.to_string(), value);
    merge_value(record, &Value::Object(patch))
}

fn overlay(target: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (name, value) in incoming {
        let Some(slot) = target.get_mut(name) else {
            continue;
        };
        match (slot, value) {
            (Value::Object(inner), Value::Object(patch)) => overlay(inner, patch),
            (slot, value) => *slot = value.clone(),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turn a snake_case or camelCase identifier into a spaced title
pub fn to_display_name(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    let mut prev: Option<char> = None;
    let mut word_start = true;

    for c in identifier.chars() {
        if c == '_' {
            word_start = true;
            continue;
        }
        let camel_break = c.is_uppercase() && prev.is_some_and(|p| !p.is_uppercase());
        if (word_start || camel_break) && !out.is_empty() {
            out.push(' ');
        }
        if word_start || out.is_empty() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        word_start = false;
        prev = Some(c);
    }
    out
}
