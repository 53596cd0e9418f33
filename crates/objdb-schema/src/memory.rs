//! In-memory schema registry for tests and embedding.

use std::collections::BTreeMap;

use objdb_types::ClassTag;

use crate::error::{SchemaError, SchemaResult};
use crate::traits::SchemaRegistry;
use crate::types::ClassDescriptor;

/// A [`SchemaRegistry`] backed by a `BTreeMap`.
///
/// The registry is immutable once built, so no locking is needed for
/// concurrent lookups.
#[derive(Clone, Debug, Default)]
pub struct InMemorySchemaRegistry {
    classes: BTreeMap<ClassTag, ClassDescriptor>,
}

impl InMemorySchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, rejecting a repeated tag.
    pub fn register(&mut self, class: ClassDescriptor) -> SchemaResult<()> {
        if self.classes.contains_key(&class.tag) {
            return Err(SchemaError::DuplicateClass(class.tag));
        }
        self.classes.insert(class.tag, class);
        Ok(())
    }

    /// Builder-style registration. A repeated tag replaces the earlier class.
    pub fn with_class(mut self, class: ClassDescriptor) -> Self {
        self.classes.insert(class.tag, class);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl SchemaRegistry for InMemorySchemaRegistry {
    fn resolve_class(&self, tag: ClassTag) -> Option<&ClassDescriptor> {
        self.classes.get(&tag)
    }

    fn class_tags(&self) -> Vec<ClassTag> {
        self.classes.keys().copied().collect()
    }
}
