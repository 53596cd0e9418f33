//! TOML schema definitions.
//!
//! A schema file lists classes and their fields:
//!
//! ```toml
//! [[class]]
//! tag = 1
//! name = "Avatar"
//! fields = [ { index = 0, name = "setName" }, { index = 1, name = "setColor" } ]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SchemaResult;
use crate::memory::InMemorySchemaRegistry;
use crate::types::{ClassDescriptor, FieldDescriptor};

/// Parsed schema file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDefinition>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub tag: u16,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub index: u16,
    pub name: String,
}

impl SchemaDefinition {
    /// Parse a definition from TOML text.
    pub fn from_toml_str(text: &str) -> SchemaResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a definition file.
    pub fn load(path: &Path) -> SchemaResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let def = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), classes = def.classes.len(), "loaded schema definition");
        Ok(def)
    }

    /// Build a registry, rejecting duplicate class tags and field indices.
    pub fn into_registry(self) -> SchemaResult<InMemorySchemaRegistry> {
        let mut registry = InMemorySchemaRegistry::new();
        for class_def in self.classes {
            let mut class = ClassDescriptor::new(class_def.tag, class_def.name);
            for field in class_def.fields {
                class.add_field(FieldDescriptor::new(field.index, field.name))?;
            }
            registry.register(class)?;
        }
        Ok(registry)
    }
}
