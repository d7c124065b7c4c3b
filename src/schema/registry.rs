//! Schema registry.
//!
//! Built once at startup from the builtin definition set and immutable for
//! the process lifetime. Pages look their schema up by module id; a miss is
//! a configuration error, not a user error.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{EngineError, Result};

use super::{builtin, FormSchema};

pub struct SchemaRegistry {
    schemas: HashMap<String, FormSchema>,
    /// Registration order, for module selectors.
    order: Vec<String>,
}

impl SchemaRegistry {
    /// Build a registry from a definition set, validating every schema.
    pub fn from_schemas(schemas: Vec<FormSchema>) -> Result<Self> {
        let mut map = HashMap::with_capacity(schemas.len());
        let mut order = Vec::with_capacity(schemas.len());

        for schema in schemas {
            schema.validate()?;
            if map.contains_key(&schema.id) {
                return Err(EngineError::InvalidSchema {
                    schema: schema.id.clone(),
                    reason: "duplicate module id".into(),
                });
            }
            debug!(module = %schema.id, fields = schema.fields.len(), "schema registered");
            order.push(schema.id.clone());
            map.insert(schema.id.clone(), schema);
        }

        Ok(Self {
            schemas: map,
            order,
        })
    }

    /// Registry with the builtin plant modules.
    pub fn builtin() -> Result<Self> {
        Self::from_schemas(builtin::all())
    }

    /// Look up the schema driving a module.
    pub fn get(&self, module_id: &str) -> Result<&FormSchema> {
        self.schemas
            .get(module_id)
            .ok_or_else(|| EngineError::SchemaNotFound(module_id.to_string()))
    }

    /// Module ids in registration order.
    pub fn list_ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
