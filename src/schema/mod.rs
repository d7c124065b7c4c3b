//! Declarative form schemas.
//!
//! A [`FormSchema`] describes one data-entry module: its field list, the
//! display panels the fields are grouped into, and any categorical location
//! axes the module records against. Schemas are pure data, validated once at
//! registry load, and never mutated afterwards.

pub mod builtin;
pub mod registry;

pub use registry::SchemaRegistry;

use serde::{Deserialize, Serialize};

use crate::types::{EngineError, Result};

/// Field type discriminant. `Select` is the only variant carrying auxiliary
/// data (its option list); everything else renders as a bare input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Time,
    Select { options: Vec<String> },
    Textarea,
}

impl FieldType {
    /// Whether values of this type must parse as numbers at submit time.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number)
    }
}

/// One field of a data-entry form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Unique within the schema; doubles as the wire payload key.
    pub key: String,
    /// Human-readable label for rendering and validation messages.
    pub label: String,
    #[serde(flatten)]
    pub field_type: FieldType,
}

impl FieldSchema {
    pub fn new(key: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            field_type,
        }
    }
}

/// A labeled display panel covering a subset of the schema's fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldGroup {
    pub title: String,
    pub field_keys: Vec<String>,
}

/// Option set for a location axis: either a fixed list or free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationOptions {
    Fixed(Vec<String>),
    FreeText,
}

/// One categorical axis a module records against (plant, broad area, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDimension {
    pub key: String,
    pub label: String,
    pub options: LocationOptions,
}

/// Complete description of one data-entry module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSchema {
    /// Module identifier, unique across the registry.
    pub id: String,
    pub label: String,
    /// Ordered field list; keys unique within the schema.
    pub fields: Vec<FieldSchema>,
    /// Optional partition of `fields` into display panels. When present it
    /// must cover every field exactly once.
    pub groups: Vec<FieldGroup>,
    /// Ordered categorical axes, outermost first.
    pub locations: Vec<LocationDimension>,
    /// Updates to existing records require an edit credential.
    pub edit_gated: bool,
}

impl FormSchema {
    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Validate the definition. Called once when the registry is built;
    /// pages never see an invalid schema.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| EngineError::InvalidSchema {
            schema: self.id.clone(),
            reason,
        };

        if self.fields.is_empty() {
            return Err(invalid("schema has no fields".into()));
        }

        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.key.as_str()) {
                return Err(invalid(format!("duplicate field key '{}'", field.key)));
            }
            if let FieldType::Select { options } = &field.field_type {
                if options.is_empty() {
                    return Err(invalid(format!(
                        "select field '{}' has no options",
                        field.key
                    )));
                }
            }
        }

        if !self.groups.is_empty() {
            let mut grouped = std::collections::HashSet::new();
            for group in &self.groups {
                for key in &group.field_keys {
                    if !seen.contains(key.as_str()) {
                        return Err(invalid(format!(
                            "group '{}' references unknown field '{}'",
                            group.title, key
                        )));
                    }
                    if !grouped.insert(key.as_str()) {
                        return Err(invalid(format!(
                            "field '{}' appears in more than one group",
                            key
                        )));
                    }
                }
            }
            if grouped.len() != self.fields.len() {
                return Err(invalid("groups do not cover every field".into()));
            }
        }

        for dim in &self.locations {
            if let LocationOptions::Fixed(options) = &dim.options {
                if options.is_empty() {
                    return Err(invalid(format!(
                        "location axis '{}' has an empty option set",
                        dim.key
                    )));
                }
            }
        }

        Ok(())
    }
}
