//! Class and field descriptors.

use std::collections::BTreeMap;

use objdb_types::{ClassTag, FieldIndex};

use crate::error::{SchemaError, SchemaResult};

/// Metadata for one field of a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub index: FieldIndex,
    pub name: String,
}

impl FieldDescriptor {
    pub fn new(index: u16, name: impl Into<String>) -> Self {
        Self {
            index: FieldIndex(index),
            name: name.into(),
        }
    }
}

/// Metadata for one schema class and its fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub tag: ClassTag,
    pub name: String,
    fields: BTreeMap<FieldIndex, FieldDescriptor>,
}

impl ClassDescriptor {
    /// Create a class with no fields.
    pub fn new(tag: u16, name: impl Into<String>) -> Self {
        Self {
            tag: ClassTag(tag),
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field, rejecting a repeated index.
    pub fn add_field(&mut self, field: FieldDescriptor) -> SchemaResult<()> {
        if self.fields.contains_key(&field.index) {
            return Err(SchemaError::DuplicateField {
                class: self.tag,
                field: field.index,
            });
        }
        self.fields.insert(field.index, field);
        Ok(())
    }

    /// Builder-style variant of [`add_field`](Self::add_field).
    ///
    /// A repeated index replaces the earlier descriptor; use `add_field` when
    /// the input is untrusted.
    pub fn with_field(mut self, index: u16, name: impl Into<String>) -> Self {
        let field = FieldDescriptor::new(index, name);
        self.fields.insert(field.index, field);
        self
    }

    /// Resolve a field by index.
    pub fn resolve_field(&self, index: FieldIndex) -> Option<&FieldDescriptor> {
        self.fields.get(&index)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
