//! Form state controller.
//!
//! A [`FormState`] is the editable snapshot behind one data-entry form: one
//! raw string per schema field (empty string = unset), the composite key of
//! the persisted record it represents, and whether submitting would create or
//! update. The controller keeps a hard invariant: the value map's keys are
//! always exactly the schema's field keys.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::schema::FormSchema;
use crate::types::{EngineError, Result};

/// A persisted record as the backend returns it.
pub type Record = serde_json::Map<String, Value>;

/// Composite identifier of the persisted record a form edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditKey {
    /// Per-unit daily record.
    Unit { unit: String, date: NaiveDate },
    /// Station-wide daily record.
    Station { date: NaiveDate },
    /// Generic module record (chemistry, coal, DM water).
    Module { module: String, date: NaiveDate },
}

impl EditKey {
    pub fn date(&self) -> NaiveDate {
        match self {
            EditKey::Unit { date, .. } => *date,
            EditKey::Station { date } => *date,
            EditKey::Module { date, .. } => *date,
        }
    }
}

/// Whether the next submit creates a record or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Create,
    Edit,
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub schema_id: String,
    field_values: BTreeMap<String, String>,
    pub edit_key: Option<EditKey>,
    pub mode: Mode,
}

impl FormState {
    /// Fresh state for a schema: every field `""`, create mode, no key.
    pub fn new(schema: &FormSchema) -> Self {
        Self {
            schema_id: schema.id.clone(),
            field_values: schema
                .fields
                .iter()
                .map(|f| (f.key.clone(), String::new()))
                .collect(),
            edit_key: None,
            mode: Mode::Create,
        }
    }

    /// Current raw value of a field. Missing keys cannot occur for fields of
    /// the active schema; `None` here means the caller asked for a stranger.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.field_values.get(key).map(|s| s.as_str())
    }

    /// Iterate (key, raw value) in field-key order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.field_values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace a single field, leaving the rest untouched.
    pub fn set_field(&mut self, schema: &FormSchema, key: &str, value: &str) -> Result<()> {
        if !schema.has_field(key) {
            return Err(EngineError::UnknownField {
                schema: schema.id.clone(),
                field: key.to_string(),
            });
        }
        self.field_values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Merge a loaded record: schema fields present on the record get its
    /// value (coerced to display form), fields absent from the record reset
    /// to `""`. Flips the form into edit mode.
    pub fn apply_loaded_record(&mut self, schema: &FormSchema, record: &Record) {
        for field in &schema.fields {
            let display = record.get(&field.key).map(display_value).unwrap_or_default();
            self.field_values.insert(field.key.clone(), display);
        }
        self.mode = Mode::Edit;
    }

    /// Back to the initial state. The edit key survives; it identifies the
    /// slot the form points at, not its contents.
    pub fn reset(&mut self, schema: &FormSchema) {
        let edit_key = self.edit_key.clone();
        *self = FormState::new(schema);
        self.edit_key = edit_key;
    }

    /// True when every field is unset.
    pub fn is_blank(&self) -> bool {
        self.field_values.values().all(|v| v.is_empty())
    }
}

/// Coerce a JSON value to the string a form input displays. Whole-number
/// floats drop the trailing `.0` so a round-tripped `500` reads as `500`,
/// not `500.0`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    return format!("{}", f as i64);
                }
            }
            n.to_string()
        }
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
